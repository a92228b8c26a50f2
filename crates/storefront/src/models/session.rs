//! Session-related types.
//!
//! Types stored in the session for admin authentication state.

use serde::{Deserialize, Serialize};

/// Session-stored admin identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Normalized admin email.
    pub email: String,
}

/// Session keys.
///
/// Cart keys live in `simea_core::cart::storage`.
pub mod keys {
    /// Key for storing the logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
