//! pws-core - session management for the practice web server client.
//!
//! This crate tracks whether a user is signed in, keeps the session across
//! runs, and drives login/logout against the server's `login` endpoint,
//! reporting every outcome through a `Notifier`.
//!
//! The transport, the durable store and the notification surface are all
//! traits, so front ends plug in their own and tests use in-memory doubles.

pub mod auth;
pub mod config;
pub mod error;
pub mod notify;
pub mod session;
pub mod storage;
pub mod transport;

pub use auth::{AuthOrchestrator, LoginForm, LoginOutcome, RequestHandle};
pub use config::{Config, StorageBackend};
pub use error::{StoreError, TransportError};
pub use notify::{Notifier, Severity, TracingNotifier};
pub use session::SessionStore;
pub use storage::KeyValueStore;
pub use transport::{HttpTransport, Transport};
