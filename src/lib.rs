//! Coverlay - coverage-aware source tree browser with git-mirrored projects.
//!
//! Projects register a git repository and a cache partition; Coverlay keeps a
//! local mirror of the repository and serves its tree with coverage hit-set
//! highlights fetched from the cache.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod reply;
pub mod services;
pub mod state;

pub use config::config;
pub use error::{Error, Result};
pub use reply::Reply;
pub use state::AppState;
