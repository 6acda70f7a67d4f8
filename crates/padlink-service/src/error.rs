use thiserror::Error;

/// Error type for building service clients and push listeners.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("websocket error: {0}")]
    WebSocket(#[from] Box<tungstenite::Error>),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tungstenite::Error> for HttpError {
    fn from(err: tungstenite::Error) -> Self {
        HttpError::WebSocket(Box::new(err))
    }
}

/// Convenient result alias for service operations.
pub type HttpResult<T> = std::result::Result<T, HttpError>;
