//! Demonstration handlers
//!
//! Thin application glue showing how endpoints are built against the
//! handler contract; the server registers both at startup.

pub mod auth;
pub mod hike;

pub use auth::AuthHandler;
pub use hike::HikeHandler;
