use thiserror::Error;

/// The host refused to schedule a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("frame request rejected: {0}")]
pub struct ScheduleError(pub String);

/// Failures of the bind/rebind/unbind lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The surface slot was empty when binding was attempted.
    #[error("drawing surface is not attached")]
    SurfaceUnavailable,
    #[error("binder is already bound to a surface")]
    AlreadyBound,
    #[error("binder is not bound to a surface")]
    NotBound,
    /// The surface exists but could not hand out a 2D context.
    #[error("2d drawing context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("invalid display attributes: {0}")]
    Attributes(String),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

impl From<serde_json::Error> for BindError {
    fn from(err: serde_json::Error) -> Self {
        BindError::Attributes(err.to_string())
    }
}
