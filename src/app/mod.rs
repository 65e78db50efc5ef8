pub mod auth;
pub mod comments;
pub mod follows;
pub mod groups;
pub mod posts;
pub mod users;
