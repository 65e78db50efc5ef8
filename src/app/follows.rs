use anyhow::Result;
use sqlx::Row;

use crate::domain::follow::Follow;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct FollowService {
    db: Db,
}

/// LIKE metacharacters in a search term match literally, not as wildcards.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl FollowService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Follows of one user, optionally filtered by a substring of the target
    /// username.
    pub async fn list(&self, user_id: i64, search: Option<&str>) -> Result<Vec<Follow>> {
        let rows = match search {
            Some(search) => {
                sqlx::query(
                    "SELECT fu.username AS follower, tu.username AS following \
                     FROM follows f \
                     JOIN users fu ON fu.id = f.user_id \
                     JOIN users tu ON tu.id = f.following_id \
                     WHERE f.user_id = $1 \
                       AND tu.username ILIKE '%' || $2 || '%' \
                     ORDER BY tu.username",
                )
                .bind(user_id)
                .bind(escape_like(search))
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT fu.username AS follower, tu.username AS following \
                     FROM follows f \
                     JOIN users fu ON fu.id = f.user_id \
                     JOIN users tu ON tu.id = f.following_id \
                     WHERE f.user_id = $1 \
                     ORDER BY tu.username",
                )
                .bind(user_id)
                .fetch_all(self.db.pool())
                .await?
            }
        };

        let follows = rows
            .into_iter()
            .map(|row| Follow {
                user: row.get("follower"),
                following: row.get("following"),
            })
            .collect();

        Ok(follows)
    }

    /// Advisory existence check; the unique index on (user_id, following_id)
    /// is the authoritative guard.
    pub async fn exists(&self, user_id: i64, following_id: i64) -> Result<bool> {
        let exists = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = $1 AND following_id = $2)",
        )
        .bind(user_id)
        .bind(following_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(exists)
    }

    /// Returns false when the pair already exists (lost race against another
    /// insert).
    pub async fn create(&self, user_id: i64, following_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO follows (user_id, following_id) \
             VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(following_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
