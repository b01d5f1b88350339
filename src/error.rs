use thiserror::Error;

use crate::Username;

pub type Result<T> = std::result::Result<T, SocialError>;

/// Every way a core operation can refuse. None of them are fatal; the caller
/// reports the message and carries on with the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SocialError {
    #[error("user {0} is already registered")]
    DuplicateUser(Username),

    #[error("user {0} not found")]
    NotFound(Username),

    /// One side of a two-user operation could not be resolved.
    #[error("invalid user {0}")]
    InvalidUser(Username),

    #[error("{0:?} is not a valid username")]
    InvalidUsername(String),

    #[error("no pending request from {from} to {to}")]
    NoPendingRequest { from: Username, to: Username },

    #[error("{0} cannot send a friend request to themselves")]
    SelfRequest(Username),

    #[error("{0} and {1} are already friends")]
    AlreadyFriends(Username, Username),

    #[error("{viewer} is not allowed to like posts of {owner}")]
    CannotLike { viewer: Username, owner: Username },
}
