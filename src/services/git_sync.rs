//! Git mirror synchronisation service.
//!
//! Keeps each project's on-disk mirror in step with its remote. Uses the
//! git2 library for native git operations; libgit2 is synchronous, so every
//! operation runs under spawn_blocking.

use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{FetchOptions, Repository as GitRepo};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Service for syncing project mirrors from their git remotes.
#[derive(Debug, Clone, Default)]
pub struct GitSyncService;

impl GitSyncService {
    pub fn new() -> Self {
        Self
    }

    /// Check if a path holds a usable repository.
    pub fn is_mirror(path: &Path) -> bool {
        GitRepo::open(path).is_ok()
    }

    /// Make `branch` the checked-out branch of the mirror at `dest`.
    ///
    /// Clones from `url` when no usable repository exists there yet;
    /// otherwise re-points origin at `url`, fetches the branch and checks
    /// it out, forcing the working tree.
    pub async fn switch(&self, dest: &Path, url: &str, branch: &str) -> Result<()> {
        let dest = dest.to_path_buf();
        let url = url.to_string();
        let branch = branch.to_string();

        info!(path = %dest.display(), branch = %branch, "Switching mirror branch");

        tokio::task::spawn_blocking(move || switch_blocking(&dest, &url, &branch))
            .await
            .map_err(|e| Error::Internal(format!("Switch task failed: {}", e)))?
    }

    /// Advance the mirror's `branch` to the fetched remote tip.
    pub async fn update(&self, dest: &Path, branch: &str) -> Result<()> {
        let dest = dest.to_path_buf();
        let branch = branch.to_string();

        info!(path = %dest.display(), branch = %branch, "Updating mirror");

        tokio::task::spawn_blocking(move || update_blocking(&dest, &branch))
            .await
            .map_err(|e| Error::Internal(format!("Update task failed: {}", e)))?
    }
}

fn switch_blocking(dest: &Path, url: &str, branch: &str) -> Result<()> {
    if !GitSyncService::is_mirror(dest) {
        // Leftover non-repository content confuses clone; start clean
        if dest.exists() {
            warn!(path = %dest.display(), "Removing non-repository mirror directory");
            std::fs::remove_dir_all(dest)
                .map_err(|e| Error::Internal(format!("Failed to remove mirror dir: {}", e)))?;
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Internal(format!("Failed to create mirror parent: {}", e)))?;
        }

        info!(url = %url, path = %dest.display(), branch = %branch, "Cloning mirror");

        let mut builder = RepoBuilder::new();
        builder.branch(branch);
        builder.clone(url, dest)?;
        return Ok(());
    }

    let repo = GitRepo::open(dest)?;

    // The stored remote address wins over whatever origin pointed at before
    repo.remote_set_url("origin", url)?;

    let mut remote = repo.find_remote("origin")?;
    remote.fetch(&[branch], Some(&mut FetchOptions::new()), None)?;

    let fetch_head = repo.find_reference("FETCH_HEAD")?;
    let fetch_commit = repo.reference_to_annotated_commit(&fetch_head)?;

    let refname = format!("refs/heads/{}", branch);
    if repo.find_reference(&refname).is_err() {
        // First checkout of this branch: create it at the fetched tip
        let commit = repo.find_commit(fetch_commit.id())?;
        repo.branch(branch, &commit, false)?;
    }

    repo.set_head(&refname)?;
    repo.checkout_head(Some(CheckoutBuilder::default().force()))?;

    Ok(())
}

fn update_blocking(dest: &Path, branch: &str) -> Result<()> {
    let repo = GitRepo::open(dest)?;

    let mut remote = repo.find_remote("origin")?;
    remote.fetch(&[branch], Some(&mut FetchOptions::new()), None)?;

    let fetch_head = repo.find_reference("FETCH_HEAD")?;
    let fetch_commit = repo.reference_to_annotated_commit(&fetch_head)?;

    let (analysis, _) = repo.merge_analysis(&[&fetch_commit])?;

    if analysis.is_up_to_date() {
        debug!(path = %dest.display(), "Mirror is up to date");
        return Ok(());
    }

    if analysis.is_fast_forward() {
        let refname = format!("refs/heads/{}", branch);
        let mut reference = repo.find_reference(&refname)?;
        reference.set_target(fetch_commit.id(), "Fast-forward")?;
        repo.checkout_head(Some(CheckoutBuilder::default().force()))?;
        info!(path = %dest.display(), "Fast-forwarded mirror");
    } else {
        // The mirror is a browse copy; local drift is discarded
        let commit = repo.find_commit(fetch_commit.id())?;
        repo.reset(commit.as_object(), git2::ResetType::Hard, None)?;
        info!(path = %dest.display(), "Reset mirror to remote tip");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_mirror_rejects_plain_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!GitSyncService::is_mirror(dir.path()));
    }

    #[test]
    fn test_is_mirror_accepts_initialized_repo() {
        let dir = tempfile::tempdir().unwrap();
        GitRepo::init(dir.path()).unwrap();
        assert!(GitSyncService::is_mirror(dir.path()));
    }
}
