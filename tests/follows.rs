//! Follow Tests
//!
//! Covers follow creation, self/duplicate prevention, listing scope, and
//! username search.

mod common;

use axum::http::StatusCode;
use common::app;
use serde_json::json;

const SELF_FOLLOW_MSG: &str = "Вы не можете подписаться на самого себя.";
const DUPLICATE_FOLLOW_MSG: &str = "Вы уже подписаны на этого пользователя.";

#[tokio::test]
async fn follow_user() {
    let app = app().await;
    let user_a = app.create_user("fol_create_a").await;
    let user_b = app.create_user("fol_create_b").await;

    let resp = app
        .post_json(
            "/follow",
            json!({ "following": user_b.username }),
            Some(&user_a.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let body = resp.json();
    assert_eq!(body["user"].as_str().unwrap(), user_a.username);
    assert_eq!(body["following"].as_str().unwrap(), user_b.username);
}

#[tokio::test]
async fn follow_self() {
    let app = app().await;
    let user = app.create_user("fol_self").await;

    let resp = app
        .post_json(
            "/follow",
            json!({ "following": user.username }),
            Some(&user.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), SELF_FOLLOW_MSG);

    // Nothing persisted
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(app.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn follow_twice() {
    let app = app().await;
    let user_a = app.create_user("fol_dup_a").await;
    let user_b = app.create_user("fol_dup_b").await;

    let resp = app
        .post_json(
            "/follow",
            json!({ "following": user_b.username }),
            Some(&user_a.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);

    let resp = app
        .post_json(
            "/follow",
            json!({ "following": user_b.username }),
            Some(&user_a.token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), DUPLICATE_FOLLOW_MSG);

    // Still exactly one entry for B
    let resp = app.get("/follow", Some(&user_a.token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    let matching: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| f["following"].as_str().unwrap() == user_b.username)
        .collect();
    assert_eq!(matching.len(), 1);
}

#[tokio::test]
async fn follow_unknown_user() {
    let app = app().await;
    let user = app.create_user("fol_ghost").await;

    let resp = app
        .post_json(
            "/follow",
            json!({ "following": "no_such_user" }),
            Some(&user.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "user not found");
}

#[tokio::test]
async fn follow_missing_target() {
    let app = app().await;
    let user = app.create_user("fol_notarget").await;

    let resp = app.post_json("/follow", json!({}), Some(&user.token)).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "following is required");
}

#[tokio::test]
async fn list_follows_scoped_to_requester() {
    let app = app().await;
    let user_a = app.create_user("fol_scope_a").await;
    let user_b = app.create_user("fol_scope_b").await;
    let user_c = app.create_user("fol_scope_c").await;

    // A follows C, B follows C
    app.post_json(
        "/follow",
        json!({ "following": user_c.username }),
        Some(&user_a.token),
    )
    .await;
    app.post_json(
        "/follow",
        json!({ "following": user_c.username }),
        Some(&user_b.token),
    )
    .await;

    let resp = app.get("/follow", Some(&user_a.token)).await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["user"].as_str().unwrap(), user_a.username);
    assert_eq!(items[0]["following"].as_str().unwrap(), user_c.username);
}

#[tokio::test]
async fn list_follows_search() {
    let app = app().await;
    let user = app.create_user("fol_search").await;
    let alpha = app.create_user("fol_search_alpha").await;
    let beta = app.create_user("fol_search_beta").await;

    app.post_json(
        "/follow",
        json!({ "following": alpha.username }),
        Some(&user.token),
    )
    .await;
    app.post_json(
        "/follow",
        json!({ "following": beta.username }),
        Some(&user.token),
    )
    .await;

    let resp = app.get("/follow?search=alpha", Some(&user.token)).await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["following"].as_str().unwrap(), alpha.username);
}

#[tokio::test]
async fn list_follows_search_wildcards_literal() {
    let app = app().await;
    let user = app.create_user("fol_wild").await;
    let target = app.create_user("fol_wild_target").await;

    app.post_json(
        "/follow",
        json!({ "following": target.username }),
        Some(&user.token),
    )
    .await;

    // "%" is not treated as a match-all wildcard ("%25" url-encodes "%")
    let resp = app.get("/follow?search=%25", Some(&user.token)).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json().as_array().unwrap().len(), 0);

    // A literal substring still matches
    let resp = app
        .get("/follow?search=wild_target", Some(&user.token))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["following"].as_str().unwrap(), target.username);
}

#[tokio::test]
async fn list_follows_unauthenticated() {
    let app = app().await;

    let resp = app.get("/follow", None).await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn follow_unauthenticated() {
    let app = app().await;
    let user = app.create_user("fol_anon_target").await;

    let resp = app
        .post_json("/follow", json!({ "following": user.username }), None)
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}
