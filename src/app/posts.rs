use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::domain::post::Post;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct PostService {
    db: Db,
}

fn post_from_row(row: &PgRow) -> Post {
    Post {
        id: row.get("id"),
        text: row.get("text"),
        author: row.get("author"),
        image: row.get("image"),
        group: row.get("group_id"),
        pub_date: row.get("pub_date"),
    }
}

impl PostService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        author_id: i64,
        text: String,
        image: Option<String>,
        group_id: Option<i64>,
    ) -> Result<Post> {
        let row = sqlx::query(
            "WITH inserted_post AS ( \
                INSERT INTO posts (author_id, text, image, group_id) \
                VALUES ($1, $2, $3, $4) \
                RETURNING id, text, author_id, image, group_id, pub_date \
             ) \
             SELECT p.id, p.text, u.username AS author, p.image, p.group_id, p.pub_date \
             FROM inserted_post p \
             JOIN users u ON u.id = p.author_id",
        )
        .bind(author_id)
        .bind(text)
        .bind(image)
        .bind(group_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(post_from_row(&row))
    }

    pub async fn get(&self, post_id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(
            "SELECT p.id, p.text, u.username AS author, p.image, p.group_id, p.pub_date \
             FROM posts p \
             JOIN users u ON u.id = p.author_id \
             WHERE p.id = $1",
        )
        .bind(post_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|row| post_from_row(&row)))
    }

    /// Stored author of a post, or None if the post does not exist. Used by
    /// the handlers for the owner-only mutation check.
    pub async fn author_of(&self, post_id: i64) -> Result<Option<i64>> {
        let author_id = sqlx::query_scalar("SELECT author_id FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(author_id)
    }

    /// Partial update; omitted fields keep their stored values, while an
    /// explicit null (`Some(None)`) clears a nullable field. `author_id`
    /// and `pub_date` are not reachable from here.
    pub async fn update(
        &self,
        post_id: i64,
        text: Option<String>,
        image: Option<Option<String>>,
        group_id: Option<Option<i64>>,
    ) -> Result<Option<Post>> {
        let row = sqlx::query(
            "WITH updated_post AS ( \
                UPDATE posts \
                SET text = COALESCE($2, text), \
                    image = CASE WHEN $3 THEN $4 ELSE image END, \
                    group_id = CASE WHEN $5 THEN $6 ELSE group_id END \
                WHERE id = $1 \
                RETURNING id, text, author_id, image, group_id, pub_date \
             ) \
             SELECT p.id, p.text, u.username AS author, p.image, p.group_id, p.pub_date \
             FROM updated_post p \
             JOIN users u ON u.id = p.author_id",
        )
        .bind(post_id)
        .bind(text)
        .bind(image.is_some())
        .bind(image.flatten())
        .bind(group_id.is_some())
        .bind(group_id.flatten())
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|row| post_from_row(&row)))
    }

    pub async fn delete(&self, post_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query(
            "SELECT p.id, p.text, u.username AS author, p.image, p.group_id, p.pub_date \
             FROM posts p \
             JOIN users u ON u.id = p.author_id \
             ORDER BY p.id",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(post_from_row).collect())
    }
}
