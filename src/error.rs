use thiserror::Error;

pub type CardResult<T> = Result<T, CardError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CardError {
    #[error("Host handshake timed out after {timeout_ms}ms")]
    HandshakeTimeout { timeout_ms: u64 },

    #[error("Host handshake rejected: {reason}")]
    HandshakeRejected { reason: String },

    #[error("Capture produced an empty artifact for a {width}x{height} region")]
    CaptureEmpty { width: u32, height: u32 },

    #[error("Capture failed: {reason}")]
    CaptureFailed { reason: String },

    #[error("Document submission rejected: {reason}")]
    SubmissionRejected { reason: String },

    #[error("Export rejected: host bridge is not ready")]
    ExportNotReady,

    #[error("Export rejected: no rendered region to capture")]
    ExportNoRegion,

    #[error("Export rejected: an attempt is already {phase}")]
    ExportBusy { phase: String },

    #[error("PNG encoding failed: {0}")]
    PngEncode(String),
}

impl From<image::ImageError> for CardError {
    fn from(err: image::ImageError) -> Self {
        CardError::PngEncode(err.to_string())
    }
}
