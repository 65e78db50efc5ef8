use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A post as it appears on the wire. `author` carries the username, not the
/// internal id; `pub_date` is set by the store at creation and never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub image: Option<String>,
    pub group: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub pub_date: OffsetDateTime,
}
