use dbquery_client::TransportError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// The remote call failed; the message is also recorded as `last_error`.
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("no database selected")]
    NoActiveConnection,

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl SessionError {
    /// True for failures raised locally, before any request was made.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, SessionError::Transport(_))
    }
}
