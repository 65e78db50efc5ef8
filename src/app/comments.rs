use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::domain::comment::Comment;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct CommentService {
    db: Db,
}

fn comment_from_row(row: &PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        author: row.get("author"),
        post: row.get("post_id"),
        text: row.get("text"),
        created: row.get("created"),
    }
}

impl CommentService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(&self, author_id: i64, post_id: i64, text: String) -> Result<Comment> {
        let row = sqlx::query(
            "WITH inserted_comment AS ( \
                INSERT INTO comments (author_id, post_id, text) \
                VALUES ($1, $2, $3) \
                RETURNING id, author_id, post_id, text, created \
             ) \
             SELECT c.id, u.username AS author, c.post_id, c.text, c.created \
             FROM inserted_comment c \
             JOIN users u ON u.id = c.author_id",
        )
        .bind(author_id)
        .bind(post_id)
        .bind(text)
        .fetch_one(self.db.pool())
        .await?;

        Ok(comment_from_row(&row))
    }

    /// Comments of one post only; an unknown post id yields an empty list.
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT c.id, u.username AS author, c.post_id, c.text, c.created \
             FROM comments c \
             JOIN users u ON u.id = c.author_id \
             WHERE c.post_id = $1 \
             ORDER BY c.id",
        )
        .bind(post_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }

    pub async fn get(&self, post_id: i64, comment_id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(
            "SELECT c.id, u.username AS author, c.post_id, c.text, c.created \
             FROM comments c \
             JOIN users u ON u.id = c.author_id \
             WHERE c.id = $1 AND c.post_id = $2",
        )
        .bind(comment_id)
        .bind(post_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|row| comment_from_row(&row)))
    }

    /// Stored author of a comment under the given post, or None if no such
    /// comment exists there.
    pub async fn author_of(&self, post_id: i64, comment_id: i64) -> Result<Option<i64>> {
        let author_id = sqlx::query_scalar(
            "SELECT author_id FROM comments WHERE id = $1 AND post_id = $2",
        )
        .bind(comment_id)
        .bind(post_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(author_id)
    }

    pub async fn update(&self, comment_id: i64, text: Option<String>) -> Result<Option<Comment>> {
        let row = sqlx::query(
            "WITH updated_comment AS ( \
                UPDATE comments \
                SET text = COALESCE($2, text) \
                WHERE id = $1 \
                RETURNING id, author_id, post_id, text, created \
             ) \
             SELECT c.id, u.username AS author, c.post_id, c.text, c.created \
             FROM updated_comment c \
             JOIN users u ON u.id = c.author_id",
        )
        .bind(comment_id)
        .bind(text)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|row| comment_from_row(&row)))
    }

    pub async fn delete(&self, comment_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
