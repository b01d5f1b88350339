use serde::{Deserialize, Serialize};

use crate::{Post, Profile, Username};

/// A registered user as persisted by a [`UserStore`]. The password is carried
/// through untouched; nothing in this crate reads it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub username: Username,
    pub password: String,
}

impl UserRecord {
    pub fn new(username: Username, password: impl Into<String>) -> Self {
        Self {
            username,
            password: password.into(),
        }
    }
}

/// Persistence of username/password pairs, in registration order.
pub trait UserStore {
    type Error;

    fn load_all(&self) -> Result<Vec<UserRecord>, Self::Error>;

    fn save_all(&self, records: &[UserRecord]) -> Result<(), Self::Error>;
}

/// Owned copy of a profile, for rendering outside the directory lock.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileSnapshot {
    pub username: Username,
    pub friends: Vec<Username>,
    pub outgoing_requests: Vec<Username>,
    pub incoming_requests: Vec<Username>,
    pub posts: Vec<Post>,
}

impl From<&Profile> for ProfileSnapshot {
    fn from(profile: &Profile) -> Self {
        Self {
            username: profile.username().clone(),
            friends: profile.friends().to_vec(),
            outgoing_requests: profile.outgoing_requests().to_vec(),
            incoming_requests: profile.incoming_requests().to_vec(),
            posts: profile.posts().to_vec(),
        }
    }
}
