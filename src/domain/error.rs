// Domain errors

/// Errors raised by the domain layer.
///
/// None of these escape the alert decision functions; they describe inputs the
/// evaluators refuse to act on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MonitorError {
    /// The rolling window has not filled yet, so there is no average to report.
    #[error("insufficient data: {have} of {need} samples collected")]
    InsufficientData { have: usize, need: usize },

    /// A decoded event is missing a field the evaluators depend on.
    #[error("malformed {kind} event: {reason}")]
    MalformedEvent { kind: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, MonitorError>;
