//! Runtime configuration.
//!
//! Resolution order, later wins:
//! 1. built-in defaults (`http://localhost:7272`, no token)
//! 2. optional YAML file named by `R2R_MCP_CONFIG`, with `${VAR}` and
//!    `${VAR:-default}` interpolation
//! 3. `R2R_BASE_URL` / `R2R_AUTH_TOKEN` from the environment

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::r2r::Session;

pub const DEFAULT_BASE_URL: &str = "http://localhost:7272";

pub const CONFIG_PATH_VAR: &str = "R2R_MCP_CONFIG";
pub const BASE_URL_VAR: &str = "R2R_BASE_URL";
pub const AUTH_TOKEN_VAR: &str = "R2R_AUTH_TOKEN";

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    Read {
        path: String,
        reason: String,
    },

    #[error("failed to parse {path}: {reason}")]
    Parse {
        path: String,
        reason: String,
    },

    #[error("invalid R2R base URL '{url}': {reason}")]
    InvalidBaseUrl {
        url: String,
        reason: String,
    },
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Connection settings for one R2R deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub auth_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
        }
    }
}

/// Shape of the optional YAML file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    auth_token: Option<String>,
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    pub fn resolve<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let mut config = Config::default();

        if let Some(path) = lookup(CONFIG_PATH_VAR) {
            let path = PathBuf::from(expand_home(&path));
            config.apply_file(load_file(&path, &lookup)?);
        }

        if let Some(base_url) = lookup(BASE_URL_VAR) {
            config.base_url = base_url;
        }
        if let Some(token) = lookup(AUTH_TOKEN_VAR) {
            config.auth_token = Some(token);
        }

        config.normalize()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(base_url) = file.base_url.filter(|v| !v.is_empty()) {
            self.base_url = base_url;
        }
        if let Some(token) = file.auth_token.filter(|v| !v.is_empty()) {
            self.auth_token = Some(token);
        }
    }

    /// Trim a trailing `/` and check the base URL is an http(s) URL.
    fn normalize(&mut self) -> Result<(), ConfigError> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();

        let url = reqwest::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(())
    }

    /// Fresh session seeded with the configured token.
    pub fn session(&self) -> Session {
        Session::new(self.base_url.clone(), self.auth_token.clone())
    }
}

fn load_file<F>(path: &Path, lookup: &F) -> Result<FileConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let interpolated = interpolate_env_vars(&raw, lookup);
    if interpolated.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

// ─── Interpolation ───────────────────────────────────────────────────────────

/// Replace `${VAR}` and `${VAR:-default}` with values from `lookup`.
/// An unterminated `${` is kept as written.
fn interpolate_env_vars<F>(input: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find("${") {
        out.push_str(&rest[..open]);
        let body = &rest[open + 2..];
        let Some(close) = body.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        out.push_str(&substitute(&body[..close], lookup));
        rest = &body[close + 1..];
    }

    out.push_str(rest);
    out
}

fn substitute<F>(expr: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let (name, fallback) = match expr.split_once(":-") {
        Some((name, fallback)) => (name, Some(fallback)),
        None => (expr, None),
    };
    lookup(name.trim())
        .or_else(|| fallback.map(expand_home))
        .unwrap_or_default()
}

/// Expand `~` and `~/...` against the home directory. `~user` forms are
/// left alone.
fn expand_home(path: &str) -> String {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => &rest[1..],
        _ => return path.to_string(),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home.display().to_string(),
        Some(home) => home.join(rest).display().to_string(),
        None => path.to_string(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
