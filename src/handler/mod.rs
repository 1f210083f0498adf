//! Request handler module
//!
//! The handler contract, the prefix-matching app server, and the static
//! file fallback.

pub mod contract;
pub mod router;
pub mod static_files;

// Re-export the types handlers are built against
pub use contract::{dispatch_full_method, dispatch_method, WebFullHandler, WebHandler, WebRequest};
pub use router::{AppServer, RegisterError};
pub use static_files::{FileError, FileServer};
