//! HTTP protocol layer module
//!
//! Response builders and cookie handling shared by the router, the file
//! server, and registered handlers.

pub mod cookie;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_401_response, build_403_response, build_404_response, build_405_response,
    build_500_response, build_501_response, build_bytes_response, build_html_response,
    build_text_response, json_response,
};
