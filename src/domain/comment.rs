use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// `author` and `post` are server-assigned; client-supplied values are
/// ignored on create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub author: String,
    pub post: i64,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}
