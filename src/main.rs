#[tokio::main]
async fn main() -> anyhow::Result<()> {
    r2r_mcp::run().await
}
