/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: token issuance at login and validation for `/api/auth/me`

pub mod jwt;
pub mod password;
