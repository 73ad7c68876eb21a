//! API Routes for Coverlay
//!
//! This module combines all API routes into a single router.
//! Routes are organized by domain.

mod projects;
pub mod status;
mod tree;

use axum::routing::get;
use axum::Router;

use crate::AppState;

/// Build the complete API router.
///
/// Route structure:
/// - /projects/* - Project management, cache cleaning, git sync
/// - /projects/:pname/tree/* - Mirror browsing with coverage highlights
/// - /health/* - Health checks
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health and status endpoints
        .merge(status::routes())
        // Project management and tree browsing
        .nest("/projects", project_routes())
        // The nested "/" route answers /projects; this covers /projects/
        .route(
            "/projects/",
            get(projects::list_projects).post(projects::create_project),
        )
}

/// Project-scoped routes.
fn project_routes() -> Router<AppState> {
    Router::new()
        .merge(projects::routes())
        .merge(tree::routes())
}
