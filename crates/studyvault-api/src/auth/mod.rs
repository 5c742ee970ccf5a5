//! Moderator authentication for the moderation queue and admin routes.

pub mod middleware;

pub use middleware::{moderator_auth_middleware, ModeratorAuth};
