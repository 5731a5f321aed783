//! podium — a small blogging and event-management web application.
//!
//! An authenticated administrator writes markdown "entries" (blog posts with
//! event metadata), manages a speaker roster, and visitors submit a tag
//! preference survey that drives a simple recommendation listing.
//!
//! # Architecture
//!
//! - **AppState**: shared state (database handle, templates, cookie key,
//!   embed cache, configuration)
//! - **Session**: signed session/flash cookies and the login gate
//! - **Routes**: HTML endpoint handlers grouped by domain

pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod render;
pub mod routes;
pub mod session;
pub mod state;
pub mod upload;
pub mod util;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::routes::router;
pub use crate::state::AppState;
