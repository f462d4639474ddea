/// Convenience result type used across pixel-reveal.
pub type RevealResult<T> = Result<T, RevealError>;

/// Top-level error taxonomy used by the reveal pipeline.
#[derive(thiserror::Error, Debug)]
pub enum RevealError {
    /// A required input (encoder binary, source image) is absent. Raised before any work starts.
    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(String),

    /// Invalid configuration, geometry or job description.
    #[error("validation error: {0}")]
    Validation(String),

    /// The external encoder exited unsuccessfully.
    ///
    /// `stderr` is the process diagnostic output, verbatim.
    #[error("encoder failed to {task} (status {status})\narguments: {args}\n{stderr}")]
    Encoder {
        /// Human readable job description ("create the final video").
        task: String,
        /// Arguments passed to the encoder, space separated.
        args: String,
        /// Exit status as reported by the OS.
        status: String,
        /// Captured standard error of the encoder.
        stderr: String,
    },

    /// Session counter state could not be persisted.
    #[error("state error: {0}")]
    State(String),

    /// Errors when deserializing configuration files.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RevealError {
    /// Build a [`RevealError::MissingPrerequisite`] value.
    pub fn missing(msg: impl Into<String>) -> Self {
        Self::MissingPrerequisite(msg.into())
    }

    /// Build a [`RevealError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RevealError::State`] value.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Build a [`RevealError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`RevealError::Encoder`] value from a failed process run.
    pub fn encoder(
        task: impl Into<String>,
        args: &[String],
        status: impl ToString,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Encoder {
            task: task.into(),
            args: args.join(" "),
            status: status.to_string(),
            stderr: stderr.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
