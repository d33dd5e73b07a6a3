//! Helpers shared by the redirect path, the HTTP layer and the admin CLI.
//!
//! - [`short_code`] - Syntactic validation of requested codes
//! - [`user_agent`] - Device classification from `User-Agent`
//! - [`fingerprint`] - Visitor fingerprint for sticky A/B assignments
//! - [`password`] - Argon2 password hashing and verification
//! - [`client_ip`] - Client address extraction behind proxies
//! - [`api_token`] - Random API token generation

pub mod api_token;
pub mod client_ip;
pub mod fingerprint;
pub mod password;
pub mod short_code;
pub mod user_agent;
