//! Project database queries.
//!
//! A project ties together one git mirror on disk, one cache partition for
//! coverage hit sets, and the metadata the browser needs to render it.

use std::path::PathBuf;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;

// ============================================================================
// Types
// ============================================================================

/// Project record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    /// Cache partition index holding this project's coverage sets.
    pub cache_db: i64,
    /// Git remote the mirror syncs from.
    pub git_addr: String,
    /// Mirror directory name under the configured repo root.
    pub dir_name: String,
    /// JSON array of source labels, as split from the submitted list.
    pub source_list: String,
    /// Mirror path, fixed at creation time and never re-derived.
    pub fs_root: String,
    pub created_at: String,
}

impl Project {
    /// Parsed source labels. Empty when the stored JSON is unusable.
    pub fn sources(&self) -> Vec<String> {
        serde_json::from_str(&self.source_list).unwrap_or_default()
    }

    /// The mirror location on disk.
    pub fn mirror_path(&self) -> PathBuf {
        PathBuf::from(&self.fs_root)
    }
}

/// Input for creating a new project.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub cache_db: i64,
    pub git_addr: String,
    pub dir_name: String,
    /// JSON array of source labels.
    pub source_list: String,
    pub fs_root: String,
}

// ============================================================================
// Queries
// ============================================================================

/// Create a new project.
pub async fn create_project(pool: &DbPool, input: CreateProject) -> Result<Project> {
    sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects (name, cache_db, git_addr, dir_name, source_list, fs_root)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(input.cache_db)
    .bind(&input.git_addr)
    .bind(&input.dir_name)
    .bind(&input.source_list)
    .bind(&input.fs_root)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            Error::AlreadyExists(input.name.clone())
        }
        _ => Error::Database(e),
    })
}

/// Get a project by name.
pub async fn get_project_by_name(pool: &DbPool, name: &str) -> Result<Option<Project>> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

/// List all projects.
pub async fn list_projects(pool: &DbPool) -> Result<Vec<Project>> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY name ASC")
        .fetch_all(pool)
        .await
        .map_err(Error::Database)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_pool, migrate};

    async fn setup_test_db() -> DbPool {
        let pool = init_pool(":memory:").await.unwrap();
        migrate(&pool).await.unwrap();
        pool
    }

    fn sample_input(name: &str) -> CreateProject {
        CreateProject {
            name: name.to_string(),
            cache_db: 3,
            git_addr: "https://git.example.com/demo.git".to_string(),
            dir_name: "demo".to_string(),
            source_list: r#"["src","tests"]"#.to_string(),
            fs_root: "/var/repos/demo".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_project() {
        let pool = setup_test_db().await;

        let project = create_project(&pool, sample_input("demo")).await.unwrap();
        assert_eq!(project.name, "demo");
        assert_eq!(project.cache_db, 3);
        assert!(!project.created_at.is_empty());

        let fetched = get_project_by_name(&pool, "demo").await.unwrap().unwrap();
        assert_eq!(fetched.fs_root, "/var/repos/demo");
        assert_eq!(fetched.sources(), vec!["src", "tests"]);
    }

    #[tokio::test]
    async fn test_get_missing_project_is_none() {
        let pool = setup_test_db().await;
        let found = get_project_by_name(&pool, "nope").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_error() {
        let pool = setup_test_db().await;

        create_project(&pool, sample_input("demo")).await.unwrap();
        let result = create_project(&pool, sample_input("demo")).await;

        assert!(matches!(result, Err(Error::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_list_projects_ordered_by_name() {
        let pool = setup_test_db().await;

        for name in ["charlie", "alpha", "bravo"] {
            create_project(&pool, sample_input(name)).await.unwrap();
        }

        let projects = list_projects(&pool).await.unwrap();
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "bravo", "charlie"]);
    }

    #[tokio::test]
    async fn test_sources_survive_malformed_json() {
        let pool = setup_test_db().await;

        let mut input = sample_input("demo");
        input.source_list = "not json".to_string();
        let project = create_project(&pool, input).await.unwrap();

        assert!(project.sources().is_empty());
    }
}
