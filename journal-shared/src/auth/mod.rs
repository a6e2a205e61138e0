/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id hashing and password strength rules
/// - [`session`]: Signed session tokens carried in the session cookie
/// - [`reset_token`]: Password reset token generation and hashing
///
/// The account flows built on these live in [`crate::services::auth`].

pub mod password;
pub mod reset_token;
pub mod session;
