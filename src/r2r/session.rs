//! Process-scoped R2R session: base address plus the current bearer token.

use std::sync::RwLock;

/// Connection state shared by every request a client issues.
///
/// The token is replaced wholesale on login and read everywhere else. The lock
/// is only held for the copy or the swap, never across an `.await`, so
/// concurrent logins resolve as last-writer-wins.
#[derive(Debug)]
pub struct Session {
    base_url: String,
    auth_token: RwLock<Option<String>>,
}

impl Session {
    /// Create a session. A trailing `/` on the base URL is dropped and an
    /// empty token is treated as absent.
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            auth_token: RwLock::new(auth_token.filter(|t| !t.is_empty())),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/v3/documents`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Snapshot of the current token.
    pub fn token(&self) -> Option<String> {
        match self.auth_token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the current token, returning the previous one.
    pub fn replace_token(&self, token: String) -> Option<String> {
        let mut guard = match self.auth_token.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.replace(token)
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let session = Session::new("http://r2r.local:7272/", None);
        assert_eq!(session.base_url(), "http://r2r.local:7272");
        assert_eq!(
            session.url("/v3/documents"),
            "http://r2r.local:7272/v3/documents"
        );
    }

    #[test]
    fn test_empty_token_is_absent() {
        let session = Session::new("http://localhost:7272", Some(String::new()));
        assert!(!session.has_token());
    }

    #[test]
    fn test_replace_token_overwrites() {
        let session = Session::new("http://localhost:7272", Some("old".into()));
        let previous = session.replace_token("new".into());
        assert_eq!(previous.as_deref(), Some("old"));
        assert_eq!(session.token().as_deref(), Some("new"));
    }

    #[test]
    fn test_sessions_are_independent() {
        let a = Session::new("http://localhost:7272", None);
        let b = Session::new("http://localhost:7272", None);
        a.replace_token("only-a".into());
        assert!(b.token().is_none());
    }
}
