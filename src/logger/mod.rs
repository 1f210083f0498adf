//! Logging module
//!
//! Plain stdout/stderr logging for server lifecycle, request dispatch,
//! and boundary errors. Per-request lines are gated by the caller via
//! `logging.access_log`.

use crate::config::Config;
use hyper::Method;
use std::net::SocketAddr;

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    println!("======================================");
    println!("webber app server started");
    println!("Listening on: http://{addr}");
    println!("File root: {}", config.wwwroot);
    println!("API base: {}", config.api_base);
    println!("File base: {}", config.file_base);
    if let Some(workers) = config.workers {
        println!("Worker threads: {workers}");
    }
    println!("Using Tokio runtime for concurrency");
    println!("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    println!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[Error] Failed to serve connection: {err:?}");
}

pub fn log_request(method: &Method, path: &str) {
    println!("[Request] {method} {path}");
}

/// Log which handler a request was dispatched to
pub fn log_dispatch(handler_name: &str, method: &Method, path: &str) {
    println!("[Dispatch] {handler_name}: {method} {path}");
}

pub fn log_response(status: u16) {
    println!("[Response] {status}");
}

pub fn log_registered(handler_name: &str, base_path: &str) {
    println!("[Register] {handler_name} at {base_path}");
}

pub fn log_config_error(source: &str, err: &impl std::fmt::Display) {
    eprintln!("[Config] Failed to load '{source}': {err}");
    eprintln!("[Config] Continuing with built-in defaults");
}

pub fn log_warning(message: &str) {
    eprintln!("[Warn] {message}");
}

pub fn log_error(message: &str) {
    eprintln!("[Error] {message}");
}
