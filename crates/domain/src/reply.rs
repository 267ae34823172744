//! Device reply — how the shutter controller answers a move command.

/// Body sent when the move was accepted.
pub const SUCCESS_BODY: &str = "success";
/// Body sent while a previous move is still in progress.
pub const BUSY_BODY: &str = "try again later";

/// Classified plain-text reply from the shutter controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceReply {
    Success,
    /// The controller is still moving; the command should be retried.
    Busy,
    Unrecognized(String),
}

impl DeviceReply {
    /// Classify a response body. Only exact matches are recognized.
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        match body {
            SUCCESS_BODY => Self::Success,
            BUSY_BODY => Self::Busy,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}
