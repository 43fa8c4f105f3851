//! Authentication plumbing: HMAC-signed session cookies and the request guard
//! that turns them into an explicit per-request [`Session`].

pub mod guard;
pub mod session;

pub use guard::require_session;
pub use session::{Session, SessionError, SessionKeys};
