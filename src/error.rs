use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarqueeError {
    /// Network unreachable or a non-2xx status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for MarqueeError {
    fn from(err: serde_json::Error) -> Self {
        MarqueeError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MarqueeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_map_to_parse() {
        let err: MarqueeError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, MarqueeError::Parse(_)));
    }

    #[test]
    fn display_includes_kind() {
        let err = MarqueeError::Transport("TMDB 500".to_string());
        assert_eq!(err.to_string(), "Transport error: TMDB 500");
    }
}
