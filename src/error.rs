use thiserror::Error;

#[derive(Debug, Error)]
pub enum CardError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read WAV audio: {0}")]
    Wav(#[from] hound::Error),
    #[error("{service} service failed: {message}")]
    Service {
        service: &'static str,
        message: String,
    },
    #[error("language model returned an empty explanation")]
    EmptyExplanation,
    #[error("recognizer returned an empty transcript")]
    EmptyTranscript,
    #[error("no sentences found in input")]
    NoSentences,
}

impl CardError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn service(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Service {
            service,
            message: err.to_string(),
        }
    }
}
