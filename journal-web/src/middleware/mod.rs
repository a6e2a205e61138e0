/// Middleware modules for the web server
///
/// This module contains custom middleware for:
/// - Security headers
/// - Cookie sessions

pub mod security;
pub mod session;
