//! Worktree inventory.
//!
//! Grove only reads repository state: which worktrees exist, which branch
//! each has checked out, and where the primary repository root is. Worktree
//! creation/removal and branch porcelain live outside this crate.

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::warn;

use super::errors::GitError;
use super::types::WorktreeInfo;

/// Resolve the primary repository root for a path that may sit inside a
/// linked worktree.
///
/// Usage ledgers are keyed by the primary root so that history recorded in
/// one worktree is visible from every other worktree of the same repository.
pub fn main_repo_root(path: &Path) -> Result<PathBuf, GitError> {
    let repo = Repository::discover(path).map_err(|_| GitError::NotARepository {
        path: path.display().to_string(),
    })?;

    // commondir() points at the primary checkout's .git directory for both
    // the main worktree and linked ones.
    let commondir = repo.commondir().to_path_buf();
    match commondir.parent() {
        Some(root) => Ok(root.to_path_buf()),
        None => Err(GitError::OperationFailed {
            message: format!(
                "Cannot derive repository root from '{}'",
                commondir.display()
            ),
        }),
    }
}

/// The branch currently checked out at `path`, or `None` when HEAD is
/// detached or unborn.
pub fn current_branch(path: &Path) -> Result<Option<String>, GitError> {
    let repo = Repository::discover(path).map_err(|_| GitError::NotARepository {
        path: path.display().to_string(),
    })?;

    match repo.head() {
        Ok(head) if head.is_branch() => Ok(head.shorthand().map(|s| s.to_string())),
        Ok(_) => Ok(None),
        Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
        Err(e) => Err(GitError::Git2Error { source: e }),
    }
}

/// List the primary checkout plus all linked worktrees with their branches.
///
/// Worktrees whose directory has been deleted out-of-band, or whose HEAD
/// cannot be read, are skipped with a warning rather than failing the whole
/// inventory.
pub fn list_worktrees(repo_root: &Path) -> Result<Vec<WorktreeInfo>, GitError> {
    let repo = Repository::discover(repo_root).map_err(|_| GitError::NotARepository {
        path: repo_root.display().to_string(),
    })?;

    let mut inventory = Vec::new();

    if let Some(workdir) = repo.workdir()
        && let Ok(Some(branch)) = current_branch(workdir)
    {
        inventory.push(WorktreeInfo::new(workdir.to_path_buf(), branch));
    }

    let names = repo.worktrees()?;
    for name in names.iter().flatten() {
        let worktree = match repo.find_worktree(name) {
            Ok(wt) => wt,
            Err(e) => {
                warn!(
                    event = "core.git.worktree_lookup_failed",
                    worktree = name,
                    error = %e
                );
                continue;
            }
        };

        let path = worktree.path().to_path_buf();
        if !path.exists() {
            warn!(
                event = "core.git.worktree_path_missing",
                worktree = name,
                path = %path.display()
            );
            continue;
        }

        match current_branch(&path) {
            Ok(Some(branch)) => inventory.push(WorktreeInfo::new(path, branch)),
            Ok(None) => {
                warn!(
                    event = "core.git.worktree_detached_head",
                    worktree = name,
                    path = %path.display()
                );
            }
            Err(e) => {
                warn!(
                    event = "core.git.worktree_head_read_failed",
                    worktree = name,
                    error = %e
                );
            }
        }
    }

    Ok(inventory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_repo_with_commit(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        {
            let sig = git2::Signature::now("grove-test", "grove@example.com").unwrap();
            let tree_id = {
                let mut index = repo.index().unwrap();
                index.write_tree().unwrap()
            };
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
                .unwrap();
        }
        repo
    }

    #[test]
    fn test_main_repo_root_of_primary_checkout() {
        let dir = TempDir::new().unwrap();
        init_repo_with_commit(dir.path());

        let root = main_repo_root(dir.path()).unwrap();
        assert_eq!(
            root.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_main_repo_root_not_a_repo() {
        let dir = TempDir::new().unwrap();
        let err = main_repo_root(dir.path()).unwrap_err();
        assert!(matches!(err, GitError::NotARepository { .. }));
    }

    #[test]
    fn test_current_branch_matches_head() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo_with_commit(dir.path());

        let branch = current_branch(dir.path()).unwrap().unwrap();
        let head = repo.head().unwrap();
        assert_eq!(branch, head.shorthand().unwrap());
    }

    #[test]
    fn test_list_worktrees_includes_linked_worktree() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo_with_commit(dir.path());

        let wt_parent = TempDir::new().unwrap();
        let wt_path = wt_parent.path().join("feature-x");
        repo.worktree("feature-x", &wt_path, None).unwrap();

        let inventory = list_worktrees(dir.path()).unwrap();
        assert_eq!(inventory.len(), 2);
        assert!(
            inventory
                .iter()
                .any(|wt| wt.branch == "feature-x"
                    && wt.path.canonicalize().unwrap() == wt_path.canonicalize().unwrap())
        );
    }

    #[test]
    fn test_main_repo_root_from_linked_worktree() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo_with_commit(dir.path());

        let wt_parent = TempDir::new().unwrap();
        let wt_path = wt_parent.path().join("feature-y");
        repo.worktree("feature-y", &wt_path, None).unwrap();

        let root = main_repo_root(&wt_path).unwrap();
        assert_eq!(
            root.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }
}
