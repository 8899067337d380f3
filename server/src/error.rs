use thiserror::Error;

use crate::UserKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TetherServerError {
    /// The user was never added or has been removed
    #[error("{user} is not connected")]
    UserNotFound { user: UserKey },

    /// The server is not running a session
    #[error("Server is not running a session")]
    NotListening,
}
