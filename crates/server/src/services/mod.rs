//! Business logic services for the blog.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `upload` - Image uploads written to the public directory

pub mod auth;
pub mod upload;

pub use auth::{AuthError, AuthService};
pub use upload::{ImageStore, UploadError, UploadedFile};
