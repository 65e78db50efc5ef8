use serde::{Deserialize, Serialize};

/// An ordered (user, following) pair, unique per direction. Both sides are
/// usernames on the wire; `user` is always the requester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follow {
    pub user: String,
    pub following: String,
}
