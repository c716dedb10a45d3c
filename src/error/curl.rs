use thiserror::Error;

/// Every variant maps to the single coarse "invalid template" category
/// exposed to callers; they are split out so the caller gets a precise
/// message without losing that coarse classification.
#[derive(Debug, Error)]
pub enum CurlError {
    #[error("empty cURL command")]
    EmptyCommand,
    #[error("failed to tokenize cURL command: {source}")]
    Tokenize {
        #[source]
        source: shell_words::ParseError,
    },
    #[error("expected the first token to be 'curl', found '{found}'")]
    NotCurl { found: String },
    #[error("missing URL")]
    MissingUrl,
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("URL '{url}' has no host")]
    UrlMissingHost { url: String },
    #[error("flag '{flag}' is missing its value")]
    MissingFlagValue { flag: String },
}

pub type CurlResult<T> = Result<T, CurlError>;
