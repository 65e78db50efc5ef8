use anyhow::Result;
use sqlx::Row;

use crate::domain::group::Group;
use crate::infra::db::Db;

/// Groups are managed externally; the API exposes them read-only.
#[derive(Clone)]
pub struct GroupService {
    db: Db,
}

impl GroupService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Group>> {
        let rows = sqlx::query(
            "SELECT id, title, slug, description FROM post_groups ORDER BY id",
        )
        .fetch_all(self.db.pool())
        .await?;

        let groups = rows
            .into_iter()
            .map(|row| Group {
                id: row.get("id"),
                title: row.get("title"),
                slug: row.get("slug"),
                description: row.get("description"),
            })
            .collect();

        Ok(groups)
    }

    pub async fn get(&self, group_id: i64) -> Result<Option<Group>> {
        let row = sqlx::query(
            "SELECT id, title, slug, description FROM post_groups WHERE id = $1",
        )
        .bind(group_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|row| Group {
            id: row.get("id"),
            title: row.get("title"),
            slug: row.get("slug"),
            description: row.get("description"),
        }))
    }
}
