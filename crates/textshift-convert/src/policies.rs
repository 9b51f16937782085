//! Failure handling policies

/// What a batch does after a file fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure and move on to the next file
    #[default]
    Continue,

    /// Stop the batch after the first failed file
    StopOnFirstError,
}

impl FailurePolicy {
    pub fn from_stop_flag(stop_on_error: bool) -> Self {
        if stop_on_error {
            Self::StopOnFirstError
        } else {
            Self::Continue
        }
    }
}
