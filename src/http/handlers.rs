use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::comments::CommentService;
use crate::app::follows::FollowService;
use crate::app::groups::GroupService;
use crate::app::posts::PostService;
use crate::app::users::UserService;
use crate::domain::comment::Comment;
use crate::domain::follow::Follow;
use crate::domain::group::Group;
use crate::domain::post::Post;
use crate::http::{AppError, AuthUser};
use crate::AppState;

// Ownership violation message, kept verbatim for client compatibility.
const PERM_DENIED_MSG: &str = "Изменение чужого контента запрещено!";
const SELF_FOLLOW_MSG: &str = "Вы не можете подписаться на самого себя.";
const DUPLICATE_FOLLOW_MSG: &str = "Вы уже подписаны на этого пользователя.";

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse { status })
}

/// Postgres foreign-key violation (23503), e.g. a post created with an
/// unknown group id.
fn is_fk_violation(err: &anyhow::Error) -> bool {
    if let Some(sqlx_err) = err.downcast_ref::<sqlx::Error>() {
        if let Some(db_err) = sqlx_err.as_database_error() {
            return db_err.code().as_deref() == Some("23503");
        }
    }
    false
}

// ===========================================================================
// Groups (read-only)
// ===========================================================================

pub async fn list_groups(State(state): State<AppState>) -> Result<Json<Vec<Group>>, AppError> {
    let service = GroupService::new(state.db.clone());
    let groups = service.list().await.map_err(|err| {
        tracing::error!(error = ?err, "failed to list groups");
        AppError::internal("failed to list groups")
    })?;

    Ok(Json(groups))
}

pub async fn get_group(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Group>, AppError> {
    let service = GroupService::new(state.db.clone());
    let group = service.get(id).await.map_err(|err| {
        tracing::error!(error = ?err, group_id = id, "failed to fetch group");
        AppError::internal("failed to fetch group")
    })?;

    match group {
        Some(group) => Ok(Json(group)),
        None => Err(AppError::not_found("group not found")),
    }
}

// ===========================================================================
// Posts
// ===========================================================================

pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, AppError> {
    let service = PostService::new(state.db.clone());
    let posts = service.list().await.map_err(|err| {
        tracing::error!(error = ?err, "failed to list posts");
        AppError::internal("failed to list posts")
    })?;

    Ok(Json(posts))
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub text: Option<String>,
    pub image: Option<String>,
    pub group: Option<i64>,
}

pub async fn create_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let text = payload
        .text
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("text is required"))?;

    let service = PostService::new(state.db.clone());
    let post = service
        .create(auth.user_id, text, payload.image, payload.group)
        .await
        .map_err(|err| {
            if is_fk_violation(&err) {
                return AppError::bad_request("invalid group");
            }
            tracing::error!(error = ?err, author_id = auth.user_id, "failed to create post");
            AppError::internal("failed to create post")
        })?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Post>, AppError> {
    let service = PostService::new(state.db.clone());
    let post = service.get(id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = id, "failed to fetch post");
        AppError::internal("failed to fetch post")
    })?;

    match post {
        Some(post) => Ok(Json(post)),
        None => Err(AppError::not_found("post not found")),
    }
}

/// Deserializes a present field into `Some(...)` so that an explicit null
/// (`Some(None)`) stays distinguishable from an absent key (outer `None`,
/// via `#[serde(default)]`). Absent keeps the stored value; null clears it.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
pub struct UpdatePostRequest {
    pub text: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub group: Option<Option<i64>>,
}

pub async fn update_post(
    Path(id): Path<i64>,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, AppError> {
    if let Some(text) = &payload.text {
        if text.trim().is_empty() {
            return Err(AppError::bad_request("text cannot be empty"));
        }
    }

    let service = PostService::new(state.db.clone());
    let author_id = service.author_of(id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = id, "failed to fetch post");
        AppError::internal("failed to fetch post")
    })?;

    let Some(author_id) = author_id else {
        return Err(AppError::not_found("post not found"));
    };
    if author_id != auth.user_id {
        return Err(AppError::forbidden(PERM_DENIED_MSG));
    }

    let post = service
        .update(id, payload.text, payload.image, payload.group)
        .await
        .map_err(|err| {
            if is_fk_violation(&err) {
                return AppError::bad_request("invalid group");
            }
            tracing::error!(error = ?err, post_id = id, "failed to update post");
            AppError::internal("failed to update post")
        })?;

    match post {
        Some(post) => Ok(Json(post)),
        None => Err(AppError::not_found("post not found")),
    }
}

pub async fn delete_post(
    Path(id): Path<i64>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = PostService::new(state.db.clone());
    let author_id = service.author_of(id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = id, "failed to fetch post");
        AppError::internal("failed to fetch post")
    })?;

    let Some(author_id) = author_id else {
        return Err(AppError::not_found("post not found"));
    };
    if author_id != auth.user_id {
        return Err(AppError::forbidden(PERM_DENIED_MSG));
    }

    service.delete(id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = id, "failed to delete post");
        AppError::internal("failed to delete post")
    })?;

    Ok(StatusCode::NO_CONTENT)
}

// ===========================================================================
// Comments (nested under a post)
// ===========================================================================

pub async fn list_comments(
    Path(post_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let service = CommentService::new(state.db.clone());
    let comments = service.list_for_post(post_id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = post_id, "failed to list comments");
        AppError::internal("failed to list comments")
    })?;

    Ok(Json(comments))
}

/// Client-supplied `author`/`post` fields are deliberately absent here: the
/// requester identity and the path parameter are authoritative, and any such
/// values in the payload are dropped on deserialization.
#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub text: Option<String>,
}

pub async fn create_comment(
    Path(post_id): Path<i64>,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let text = payload
        .text
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("text is required"))?;

    let posts = PostService::new(state.db.clone());
    let post_exists = posts.author_of(post_id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = post_id, "failed to fetch post");
        AppError::internal("failed to fetch post")
    })?;
    if post_exists.is_none() {
        return Err(AppError::not_found("post not found"));
    }

    let service = CommentService::new(state.db.clone());
    let comment = service
        .create(auth.user_id, post_id, text)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, post_id = post_id, author_id = auth.user_id, "failed to create comment");
            AppError::internal("failed to create comment")
        })?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_comment(
    Path((post_id, id)): Path<(i64, i64)>,
    State(state): State<AppState>,
) -> Result<Json<Comment>, AppError> {
    let service = CommentService::new(state.db.clone());
    let comment = service.get(post_id, id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = post_id, comment_id = id, "failed to fetch comment");
        AppError::internal("failed to fetch comment")
    })?;

    match comment {
        Some(comment) => Ok(Json(comment)),
        None => Err(AppError::not_found("comment not found")),
    }
}

#[derive(Deserialize)]
pub struct UpdateCommentRequest {
    pub text: Option<String>,
}

pub async fn update_comment(
    Path((post_id, id)): Path<(i64, i64)>,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, AppError> {
    if let Some(text) = &payload.text {
        if text.trim().is_empty() {
            return Err(AppError::bad_request("text cannot be empty"));
        }
    }

    let service = CommentService::new(state.db.clone());
    let author_id = service.author_of(post_id, id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = post_id, comment_id = id, "failed to fetch comment");
        AppError::internal("failed to fetch comment")
    })?;

    let Some(author_id) = author_id else {
        return Err(AppError::not_found("comment not found"));
    };
    if author_id != auth.user_id {
        return Err(AppError::forbidden(PERM_DENIED_MSG));
    }

    let comment = service.update(id, payload.text).await.map_err(|err| {
        tracing::error!(error = ?err, comment_id = id, "failed to update comment");
        AppError::internal("failed to update comment")
    })?;

    match comment {
        Some(comment) => Ok(Json(comment)),
        None => Err(AppError::not_found("comment not found")),
    }
}

pub async fn delete_comment(
    Path((post_id, id)): Path<(i64, i64)>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = CommentService::new(state.db.clone());
    let author_id = service.author_of(post_id, id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = post_id, comment_id = id, "failed to fetch comment");
        AppError::internal("failed to fetch comment")
    })?;

    let Some(author_id) = author_id else {
        return Err(AppError::not_found("comment not found"));
    };
    if author_id != auth.user_id {
        return Err(AppError::forbidden(PERM_DENIED_MSG));
    }

    service.delete(id).await.map_err(|err| {
        tracing::error!(error = ?err, comment_id = id, "failed to delete comment");
        AppError::internal("failed to delete comment")
    })?;

    Ok(StatusCode::NO_CONTENT)
}

// ===========================================================================
// Follows
// ===========================================================================

#[derive(Deserialize)]
pub struct FollowQuery {
    pub search: Option<String>,
}

pub async fn list_follows(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FollowQuery>,
) -> Result<Json<Vec<Follow>>, AppError> {
    let service = FollowService::new(state.db.clone());
    let follows = service
        .list(auth.user_id, query.search.as_deref())
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = auth.user_id, "failed to list follows");
            AppError::internal("failed to list follows")
        })?;

    Ok(Json(follows))
}

#[derive(Deserialize)]
pub struct CreateFollowRequest {
    pub following: Option<String>,
}

pub async fn create_follow(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateFollowRequest>,
) -> Result<(StatusCode, Json<Follow>), AppError> {
    let following = payload
        .following
        .filter(|username| !username.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("following is required"))?;

    let users = UserService::new(state.db.clone());
    let target = users.find_by_username(&following).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to resolve user");
        AppError::internal("failed to resolve user")
    })?;

    let Some(target) = target else {
        return Err(AppError::bad_request("user not found"));
    };

    if target.id == auth.user_id {
        return Err(AppError::bad_request(SELF_FOLLOW_MSG));
    }

    let service = FollowService::new(state.db.clone());
    let already = service
        .exists(auth.user_id, target.id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = auth.user_id, "failed to check follow");
            AppError::internal("failed to check follow")
        })?;
    if already {
        return Err(AppError::bad_request(DUPLICATE_FOLLOW_MSG));
    }

    let inserted = service
        .create(auth.user_id, target.id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = auth.user_id, following_id = target.id, "failed to create follow");
            AppError::internal("failed to create follow")
        })?;

    // The unique index resolves the race between the advisory check and the
    // insert; a lost race reports the same duplicate error.
    if !inserted {
        return Err(AppError::bad_request(DUPLICATE_FOLLOW_MSG));
    }

    Ok((
        StatusCode::CREATED,
        Json(Follow {
            user: auth.username,
            following: target.username,
        }),
    ))
}
