/// Error types for slang interpretation
#[derive(Debug, thiserror::Error)]
pub enum InterpretError {
    /// Missing or invalid configuration (credential, limits, URLs)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure talking to a remote service
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A remote service answered with a non-success HTTP status
    #[error("{service} API error ({status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// The dictionary answered with an `error`/`errors` payload
    #[error("Dictionary rejected the request: {0}")]
    DictionaryRejected(String),

    /// A response body did not have the expected structure
    #[error("Malformed {service} response: {message}")]
    MalformedResponse {
        service: &'static str,
        message: String,
    },

    /// The language model reported a failure
    #[error("Language model error: {0}")]
    Model(String),

    /// A pipeline run failed; carries the text that was being interpreted
    #[error("Failed to interpret {input:?}: {source}")]
    Pipeline {
        input: String,
        #[source]
        source: Box<InterpretError>,
    },
}

impl InterpretError {
    pub(crate) fn malformed(service: &'static str, message: impl Into<String>) -> Self {
        InterpretError::MalformedResponse {
            service,
            message: message.into(),
        }
    }

    /// Attach the input text of a failed pipeline run
    pub fn for_input(self, input: &str) -> Self {
        match self {
            already @ InterpretError::Pipeline { .. } => already,
            other => InterpretError::Pipeline {
                input: input.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Result type for interpretation operations
pub type InterpretResult<T> = Result<T, InterpretError>;
