//! HTTP boundary for the Mayfly shortener and pastebin.
//!
//! The router lives in [`app`]; request validation lives next to the request
//! types in [`model`]. Everything else is wiring: shared [`state`], the
//! [`error`] mapping to status codes, the request [`middleware`] and the
//! background [`sweeper`].

pub mod app;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod state;
pub mod sweeper;
pub mod telemetry;

pub use app::App;
pub use error::AppError;
pub use state::AppState;
