use anyhow::Result;
use sqlx::Row;

use crate::infra::db::Db;

/// The authenticated caller, resolved from a bearer token. Token issuance
/// happens out-of-band; this service only looks tokens up.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

#[derive(Clone)]
pub struct AuthService {
    db: Db,
}

impl AuthService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn authenticate_token(&self, token: &str) -> Result<Option<Identity>> {
        let row = sqlx::query(
            "SELECT u.id, u.username \
             FROM auth_tokens t \
             JOIN users u ON u.id = t.user_id \
             WHERE t.token = $1",
        )
        .bind(token)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|row| Identity {
            user_id: row.get("id"),
            username: row.get("username"),
        }))
    }
}
