//! Session-related types.
//!
//! The session cookie carries only an opaque session id; the values below live
//! in the server-side session record.

/// Session keys for authentication data.
pub mod keys {
    /// Key for the logged-in member's [`turnstile_core::UserId`].
    pub const USER_ID: &str = "user_id";
}
