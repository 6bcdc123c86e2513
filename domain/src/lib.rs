pub mod auth;
pub mod auth_state;
pub mod error;
pub mod events;
pub mod profile;
pub mod session;
