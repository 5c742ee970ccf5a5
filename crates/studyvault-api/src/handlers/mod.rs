pub mod admin;
pub mod files;
pub mod health;
pub mod moderation;
pub mod resources;
pub mod submissions;
