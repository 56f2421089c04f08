use shared::{CategoryId, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriviaError {
    #[error("request to trivia backend failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid trivia backend url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("the backend does not have enough questions for that quiz")]
    NoResults,
    #[error("the backend rejected the request parameters")]
    InvalidParameter,
    #[error("session token not found")]
    TokenNotFound,
    #[error("session token has returned every question for this query")]
    TokenEmpty,
    #[error("too many requests; the backend is rate limiting")]
    RateLimit,
    #[error("unrecognised response code {0}")]
    UnknownResponseCode(i64),
    #[error("failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed backend data: {0}")]
    Malformed(String),
    #[error("no category with id {0}")]
    CategoryNotFound(CategoryId),
}

impl TriviaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Request(_) => ErrorKind::Transport,
            Self::NoResults
            | Self::InvalidParameter
            | Self::TokenNotFound
            | Self::TokenEmpty
            | Self::RateLimit => ErrorKind::BackendRejection,
            Self::UnknownResponseCode(_) | Self::Decode(_) | Self::Malformed(_) => {
                ErrorKind::DataCorruption
            }
            Self::InvalidUrl(_) | Self::CategoryNotFound(_) => ErrorKind::PreconditionViolation,
        }
    }

    /// True when the backend could not be reached at all.
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

/// The `response_code` values the question endpoint can send back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    Success,
    NoResults,
    InvalidParameter,
    TokenNotFound,
    TokenEmpty,
    RateLimit,
}

impl ResponseCode {
    pub const ALL: [ResponseCode; 6] = [
        ResponseCode::Success,
        ResponseCode::NoResults,
        ResponseCode::InvalidParameter,
        ResponseCode::TokenNotFound,
        ResponseCode::TokenEmpty,
        ResponseCode::RateLimit,
    ];

    pub fn code(self) -> i64 {
        match self {
            Self::Success => 0,
            Self::NoResults => 1,
            Self::InvalidParameter => 2,
            Self::TokenNotFound => 3,
            Self::TokenEmpty => 4,
            Self::RateLimit => 5,
        }
    }

    pub fn into_result(self) -> Result<(), TriviaError> {
        match self {
            Self::Success => Ok(()),
            Self::NoResults => Err(TriviaError::NoResults),
            Self::InvalidParameter => Err(TriviaError::InvalidParameter),
            Self::TokenNotFound => Err(TriviaError::TokenNotFound),
            Self::TokenEmpty => Err(TriviaError::TokenEmpty),
            Self::RateLimit => Err(TriviaError::RateLimit),
        }
    }
}

impl TryFrom<i64> for ResponseCode {
    type Error = TriviaError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|code| code.code() == value)
            .ok_or(TriviaError::UnknownResponseCode(value))
    }
}
