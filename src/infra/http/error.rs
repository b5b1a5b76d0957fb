use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("backend unreachable: {message}")]
    Unreachable { message: String },
    #[error("http error: {0}")]
    Transport(reqwest::Error),
    #[error("server rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl GatewayError {
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }

    /// Connection and timeout failures; the request never reached the server.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Unreachable { .. })
    }

    /// Short reason suitable for a toast or a batch report line.
    pub fn reason(&self) -> String {
        match self {
            GatewayError::Unreachable { .. } => "backend unreachable".to_string(),
            GatewayError::Transport(_) => "network error".to_string(),
            GatewayError::Rejected { status, body } => {
                let body = body.trim();
                if body.is_empty() {
                    format!("status {status}")
                } else {
                    let snippet: String = body.chars().take(120).collect();
                    format!("status {status}: {snippet}")
                }
            }
            GatewayError::Decode(_) => "unreadable response".to_string(),
            GatewayError::Url(_) => "invalid URL".to_string(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::unreachable(err.to_string())
        } else {
            Self::Transport(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unreachable_is_transient() {
        assert!(GatewayError::unreachable("refused").is_transient());
        assert!(!GatewayError::rejected(503, "").is_transient());
        assert!(!GatewayError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn rejection_reason_includes_status_and_body() {
        let err = GatewayError::rejected(422, " {\"message\":\"already approved\"} ");
        assert_eq!(
            err.reason(),
            "status 422: {\"message\":\"already approved\"}"
        );
        assert_eq!(GatewayError::rejected(403, "").reason(), "status 403");
    }
}
