//! # SocialFlow Auth
//!
//! Credentials and bearer tokens for the SocialFlow API.
//!
//! - [`password`]: Argon2 hashing and verification of user passwords
//! - [`jwt`]: HS256 access tokens carrying [`SessionClaims`]
//!
//! ```rust
//! use socialflow_auth::{hash_password, verify_password, JwtService};
//! use uuid::Uuid;
//!
//! let hash = hash_password("correct horse battery").unwrap();
//! assert!(verify_password("correct horse battery", &hash).unwrap());
//!
//! let jwt = JwtService::with_secret("test-secret-key-for-jwt-signing-minimum-32-chars").unwrap();
//! let token = jwt.issue(Uuid::now_v7(), "ana@example.com", "Ana").unwrap();
//! let claims = jwt.validate_token(&token.access_token).unwrap();
//! assert_eq!(claims.email, "ana@example.com");
//! ```

pub mod claims;
pub mod error;
pub mod jwt;
pub mod password;

pub use claims::SessionClaims;
pub use error::{AuthError, AuthResult};
pub use jwt::{AccessToken, JwtConfig, JwtService, MIN_SECRET_LEN};
pub use password::{hash_password, validate_password, verify_password, MIN_PASSWORD_LEN};
