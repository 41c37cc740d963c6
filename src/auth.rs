use crate::config::TmdbConfig;
use crate::error::{MarqueeError, Result};

/// Try to run a CLI command and capture stdout as a token
fn try_cli_token(command: &str) -> Option<String> {
    let output = std::process::Command::new("sh")
        .args(["-c", command])
        .output()
        .ok()?;

    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }
    None
}

fn env_token(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Resolve the TMDB bearer token:
/// 1. Environment variable named by `tmdb.token_env`
/// 2. Output of `tmdb.token_command`
///
/// Requests are never sent unauthenticated, so a missing token is an error.
pub fn load_tmdb_token(config: &TmdbConfig) -> Result<String> {
    if let Some(token) = env_token(&config.token_env) {
        return Ok(token);
    }

    if let Some(cmd) = &config.token_command {
        if let Some(token) = try_cli_token(cmd) {
            return Ok(token);
        }
        tracing::warn!(command = %cmd, "token_command produced no token");
    }

    Err(MarqueeError::Auth(format!(
        "no TMDB API token found. Set {} or configure tmdb.token_command.",
        config.token_env
    )))
}

/// Optional Appwrite server key. Absent keys fall back to the project's
/// public permissions.
pub fn load_appwrite_key(var: Option<&str>) -> Option<String> {
    var.and_then(env_token)
}
