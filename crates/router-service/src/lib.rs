//! HTTP service for the action router.
//!
//! Provides:
//! - [`Dispatcher`]: prompt -> nearest action -> optional snippet -> run
//! - `POST /execute`, `POST /resolve`, `GET /actions`, `GET /health`
//! - [`run_server_with_shutdown`] for the daemon

pub mod dispatcher;
pub mod error;
pub mod http;
pub mod server;

pub use dispatcher::{Dispatcher, ExecutionReport, DEFAULT_EXECUTION_MESSAGE};
pub use error::ServiceError;
pub use http::{build_router, AppState};
pub use server::run_server_with_shutdown;
