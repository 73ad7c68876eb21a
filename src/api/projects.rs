//! Projects Routes
//!
//! Project management for Coverlay.
//!
//! Routes:
//! - GET /projects - List all projects
//! - POST /projects - Create a new project
//! - POST /projects/:pname/clean - Flush the project's cache partition
//! - POST /projects/:pname/gitsync - Sync the project mirror to a branch

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::db::Project;
use crate::reply::Reply;
use crate::{AppState, Error, Result};

/// Build project routes.
///
/// Trailing-slash variants are registered alongside the canonical paths;
/// legacy clients use both forms.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route("/:pname/clean", post(clean_project))
        .route("/:pname/clean/", post(clean_project))
        .route("/:pname/gitsync", post(gitsync_project))
        .route("/:pname/gitsync/", post(gitsync_project))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Form submitted to create a project. Field names match the legacy wire
/// format.
#[derive(Debug, Deserialize)]
pub struct CreateProjectForm {
    /// Unique project name
    pub pname: String,
    /// Cache partition index
    pub redisdb: i64,
    /// Git remote address
    pub gitaddr: String,
    /// Mirror directory name under the repo root
    pub drname: String,
    /// Comma-separated source labels
    pub sourcelist: String,
}

/// Form submitted to sync a project mirror.
#[derive(Debug, Deserialize)]
pub struct GitSyncForm {
    /// Branch to check out and update
    pub gitbranch: String,
}

/// Project response in the legacy wire format.
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub pname: String,
    pub redisdb: i64,
    pub gitaddr: String,
    pub drname: String,
    pub sourcelist: Vec<String>,
    pub fsroot: String,
    pub created_at: String,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        let sourcelist = p.sources();
        Self {
            pname: p.name,
            redisdb: p.cache_db,
            gitaddr: p.git_addr,
            drname: p.dir_name,
            sourcelist,
            fsroot: p.fs_root,
            created_at: p.created_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List all projects.
///
/// GET /projects
///
/// Returns every project record, name-ordered, in the legacy wire shape.
#[axum::debug_handler]
pub(super) async fn list_projects(State(state): State<AppState>) -> Result<Reply> {
    let projects = crate::db::list_projects(&state.db).await?;
    let responses: Vec<ProjectResponse> = projects.into_iter().map(Into::into).collect();

    Ok(Reply::data(serde_json::to_value(responses)?))
}

/// Create a new project.
///
/// POST /projects
///
/// Accepts the legacy urlencoded form. The mirror path is fixed here, from
/// the repo root configured right now, and never re-derived.
#[axum::debug_handler]
pub(super) async fn create_project(
    State(state): State<AppState>,
    Form(form): Form<CreateProjectForm>,
) -> Result<Reply> {
    if !is_valid_project_name(&form.pname) {
        return Err(Error::Validation(
            "Project name must be alphanumeric with hyphens or underscores, 64 chars max".into(),
        ));
    }
    if !is_single_path_component(&form.drname) {
        return Err(Error::Validation(
            "Directory name must be a single path component".into(),
        ));
    }
    if form.gitaddr.trim().is_empty() {
        return Err(Error::Validation("Git address must not be empty".into()));
    }

    let sources: Vec<String> = form
        .sourcelist
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    let fs_root = state.repo_root.join(&form.drname);

    let input = crate::db::CreateProject {
        name: form.pname,
        cache_db: form.redisdb,
        git_addr: form.gitaddr,
        dir_name: form.drname,
        source_list: serde_json::to_string(&sources)?,
        fs_root: fs_root.to_string_lossy().into_owned(),
    };

    let project = crate::db::create_project(&state.db, input).await?;
    info!(pname = %project.name, fs_root = %project.fs_root, "Created project");

    Ok(Reply::view(
        "project_node.html",
        json!({ "project": ProjectResponse::from(project) }),
    ))
}

/// Flush a project's cache partition.
///
/// POST /projects/:pname/clean
#[axum::debug_handler]
async fn clean_project(State(state): State<AppState>, Path(pname): Path<String>) -> Result<Reply> {
    let project = crate::db::get_project_by_name(&state.db, &pname)
        .await?
        .ok_or(Error::ProjectNotFound)?;

    state.cache.flush_partition(project.cache_db).await?;
    info!(pname = %project.name, partition = project.cache_db, "Cleaned project cache");

    Ok(Reply::ok())
}

/// Sync a project mirror to a branch.
///
/// POST /projects/:pname/gitsync
///
/// Checks the branch out, cloning the mirror first when it does not exist,
/// then advances it to the remote tip.
#[axum::debug_handler]
async fn gitsync_project(
    State(state): State<AppState>,
    Path(pname): Path<String>,
    Form(form): Form<GitSyncForm>,
) -> Result<Reply> {
    let project = crate::db::get_project_by_name(&state.db, &pname)
        .await?
        .ok_or(Error::ProjectNotFound)?;

    let mirror = project.mirror_path();
    state
        .git
        .switch(&mirror, &project.git_addr, &form.gitbranch)
        .await?;
    state.git.update(&mirror, &form.gitbranch).await?;

    info!(pname = %project.name, branch = %form.gitbranch, "Synced project mirror");

    Ok(Reply::ok())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Check if a string is a usable project name.
fn is_valid_project_name(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 64
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Check if a string is a bare directory name with no traversal potential.
fn is_single_path_component(s: &str) -> bool {
    !s.is_empty() && s != "." && s != ".." && !s.contains('/') && !s.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_project_names() {
        assert!(is_valid_project_name("demo"));
        assert!(is_valid_project_name("demo-2_x"));
        assert!(!is_valid_project_name(""));
        assert!(!is_valid_project_name("has space"));
        assert!(!is_valid_project_name(&"x".repeat(65)));
    }

    #[test]
    fn test_single_path_component() {
        assert!(is_single_path_component("demo"));
        assert!(is_single_path_component("demo.git"));
        assert!(!is_single_path_component("."));
        assert!(!is_single_path_component(".."));
        assert!(!is_single_path_component("a/b"));
        assert!(!is_single_path_component("a\\b"));
        assert!(!is_single_path_component(""));
    }
}
