//! Authentication module for logging in and out of the practice server.
//!
//! This module provides:
//! - `LoginForm`: the caller's username/password buffer
//! - `LoginReply`: interpretation of the `login` endpoint's response
//! - `AuthOrchestrator`: login/logout use cases tying the transport,
//!   the session store and user notifications together
//!
//! Sessions have no expiry; they last until an explicit logout.

pub mod credentials;
pub mod orchestrator;

pub use credentials::{LoginForm, LoginReply, LoginRequest, LoginResponse};
pub use orchestrator::{AuthOrchestrator, LoginOutcome, RequestHandle};
