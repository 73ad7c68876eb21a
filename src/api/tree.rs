//! Tree Routes
//!
//! Mirror browsing for Coverlay: directory structure views and file views
//! with coverage highlights.
//!
//! Routes:
//! - GET /projects/:pname/tree - Browse the mirror root
//! - GET /projects/:pname/tree/*fpath - Browse a directory or view a file

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::reply::Reply;
use crate::services::files::{self, FileView};
use crate::{AppState, Error, Result};

/// Build tree routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:pname/tree", get(tree_root))
        .route("/:pname/tree/", get(tree_root))
        .route("/:pname/tree/*fpath", get(tree_node))
}

/// Breadcrumb link for the tree views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreadLink {
    pub name: String,
    pub url: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Browse the mirror root.
///
/// GET /projects/:pname/tree
#[axum::debug_handler]
async fn tree_root(State(state): State<AppState>, Path(pname): Path<String>) -> Result<Reply> {
    render_node(&state, &pname, "").await
}

/// Browse a directory or view a file.
///
/// GET /projects/:pname/tree/*fpath
#[axum::debug_handler]
async fn tree_node(
    State(state): State<AppState>,
    Path((pname, fpath)): Path<(String, String)>,
) -> Result<Reply> {
    render_node(&state, &pname, &fpath).await
}

/// Render one node of a project tree.
///
/// Directories get the structure view. Anything else gets the code view,
/// falling back to a canned placeholder when the content cannot be loaded;
/// bad file paths never 404, the legacy front end expects a page either way.
async fn render_node(state: &AppState, pname: &str, fpath: &str) -> Result<Reply> {
    let project = crate::db::get_project_by_name(&state.db, pname)
        .await?
        .ok_or(Error::ProjectNotFound)?;

    let breadlinks = bread_links(pname, fpath);
    let resolved = files::resolve(&project.mirror_path(), fpath);

    // The directory check always runs first; the file read only happens
    // when the node is not a directory.
    if let Some(path) = resolved.as_deref() {
        if files::is_directory(path).await {
            let (dirs, file_entries) =
                files::directory_structure(path, &node_url(pname, fpath)).await?;
            return Ok(Reply::view(
                "structure.html",
                json!({
                    "dirs": dirs,
                    "files": file_entries,
                    "breadlinks": breadlinks,
                }),
            ));
        }
    }

    let (view, highlights) = match resolved.as_deref() {
        Some(path) => match files::read_with_type(path).await {
            Some(view) => {
                let key = fpath.trim_end_matches('/');
                let highlights = state.coverage.hit_set(project.cache_db, key).await;
                (view, highlights)
            }
            None => {
                debug!(pname = %pname, fpath = %fpath, "Serving placeholder for unloadable file");
                (FileView::unloadable(), Vec::new())
            }
        },
        None => {
            debug!(pname = %pname, fpath = %fpath, "Serving placeholder for unresolvable path");
            (FileView::unloadable(), Vec::new())
        }
    };

    Ok(Reply::view(
        "code.html",
        json!({
            "content": view.content,
            "code_type": view.code_type,
            "code_type_script": view.code_type_script,
            "highlights": highlights,
            "breadlinks": breadlinks,
        }),
    ))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Browse URL of a node, without trailing slash.
fn node_url(pname: &str, fpath: &str) -> String {
    let trimmed = fpath.trim_end_matches('/');
    if trimmed.is_empty() {
        format!("/projects/{}/tree", pname)
    } else {
        format!("/projects/{}/tree/{}", pname, trimmed)
    }
}

/// Breadcrumb links for a node.
///
/// The root browse page gets none. Deeper nodes get a root link named after
/// the project, then one link per path segment with cumulative urls. One
/// trailing slash is stripped before splitting, so `a/b/` equals `a/b`.
pub fn bread_links(pname: &str, fpath: &str) -> Vec<BreadLink> {
    if fpath.is_empty() {
        return Vec::new();
    }

    let fpath = fpath.strip_suffix('/').unwrap_or(fpath);

    let mut links = vec![BreadLink {
        name: pname.to_string(),
        url: format!("/projects/{}/tree", pname),
    }];

    let mut prefix = String::new();
    for segment in fpath.split('/') {
        if prefix.is_empty() {
            prefix = segment.to_string();
        } else {
            prefix = format!("{}/{}", prefix, segment);
        }
        links.push(BreadLink {
            name: segment.to_string(),
            url: format!("/projects/{}/tree/{}", pname, prefix),
        });
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(name: &str, url: &str) -> BreadLink {
        BreadLink {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_bread_links_empty_path() {
        assert!(bread_links("demo", "").is_empty());
    }

    #[test]
    fn test_bread_links_nested_path() {
        let links = bread_links("demo", "a/b/c");
        assert_eq!(
            links,
            vec![
                link("demo", "/projects/demo/tree"),
                link("a", "/projects/demo/tree/a"),
                link("b", "/projects/demo/tree/a/b"),
                link("c", "/projects/demo/tree/a/b/c"),
            ]
        );
    }

    #[test]
    fn test_bread_links_trailing_slash_is_stripped() {
        assert_eq!(bread_links("demo", "a/b/"), bread_links("demo", "a/b"));
    }

    #[test]
    fn test_bread_links_single_segment() {
        let links = bread_links("demo", "src");
        assert_eq!(
            links,
            vec![
                link("demo", "/projects/demo/tree"),
                link("src", "/projects/demo/tree/src"),
            ]
        );
    }

    #[test]
    fn test_node_url() {
        assert_eq!(node_url("demo", ""), "/projects/demo/tree");
        assert_eq!(node_url("demo", "a/b"), "/projects/demo/tree/a/b");
        assert_eq!(node_url("demo", "a/b/"), "/projects/demo/tree/a/b");
    }
}
