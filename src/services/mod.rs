//! Service layer for Coverlay.
//!
//! Contains business logic and external service integrations:
//! - Cache (per-project redis partitions)
//! - Coverage (hit-set lookup for line highlighting)
//! - files (mirror filesystem listings and typed reads)
//! - GitSync (mirror clone/checkout/update via libgit2)

mod cache;
mod coverage;
pub mod files;
mod git_sync;

pub use cache::CacheService;
pub use coverage::CoverageService;
pub use git_sync::GitSyncService;
