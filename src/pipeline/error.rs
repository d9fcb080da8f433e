use thiserror::Error;

/// Failure taxonomy for the prediction pipeline. Every variant aborts the
/// current request; the HTTP layer maps each to a client-facing response.
/// No stage retries anything.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Unparsable date, undeserializable record, or a field value that
    /// cannot be turned into a valid calendar quantity.
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// A value or column set outside the schema the transformers and model
    /// were fitted on.
    #[error("schema mismatch: {0}")]
    Schema(String),
    /// Model invocation failed or returned an inconsistent row count.
    #[error("inference failed: {0}")]
    Inference(String),
}
