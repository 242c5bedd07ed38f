//! Authentication and authorization module

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, TokenCodec};
pub use middleware::{auth_guard, extract_token, require_role, CurrentUser};
pub use password::PasswordHasher;
