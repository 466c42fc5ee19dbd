use crate::error::Result;
use crate::history::{CommitRecord, HistorySource, TagTarget};
use git2::{ErrorCode, Object, Oid, Repository, Sort};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::debug;

/// History of a git repository read in-process through libgit2
pub struct Git2History {
    repo: Repository,
}

impl Git2History {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path)?;

        Ok(Git2History { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Repository) -> Self {
        Git2History { repo }
    }

    fn short_hash(object: &Object<'_>) -> Result<String> {
        let short = object.short_id()?;
        Ok(short.as_str().unwrap_or_default().to_string())
    }

    /// Tag names by the commit they point at; tags of other objects are
    /// left out.
    fn tags_by_commit(&self) -> Result<HashMap<Oid, BTreeSet<String>>> {
        let mut tags: HashMap<Oid, BTreeSet<String>> = HashMap::new();

        for name in self.repo.tag_names(None)?.iter().flatten() {
            let object = self.repo.revparse_single(&format!("refs/tags/{}", name))?;
            match object.peel_to_commit() {
                Ok(commit) => {
                    tags.entry(commit.id()).or_default().insert(name.to_string());
                }
                Err(e) => debug!(tag = name, error = %e, "tag does not point at a commit"),
            }
        }

        Ok(tags)
    }
}

impl HistorySource for Git2History {
    fn head_hash(&self) -> Result<String> {
        let head = self.repo.head()?.peel_to_commit()?;
        Self::short_hash(head.as_object())
    }

    fn commits(&self) -> Result<Vec<CommitRecord>> {
        let mut tags = self.tags_by_commit()?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        let mut commits = Vec::new();

        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;

            commits.push(CommitRecord {
                hash: Self::short_hash(commit.as_object())?,
                tags: tags.remove(&oid).unwrap_or_default(),
                message: commit.message().unwrap_or_default().to_string(),
            });
        }

        debug!(count = commits.len(), "read commit history");
        Ok(commits)
    }
}

impl TagTarget for Git2History {
    fn tag_exists(&self, name: &str) -> Result<bool> {
        let reference_name = format!("refs/tags/{}", name);

        match self.repo.find_reference(&reference_name) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.tag_lightweight(name, head.as_object(), false)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn commit(repo: &Repository, message: &str) -> Oid {
        let signature = git2::Signature::now("Test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn test_open_outside_repository_fails() {
        let dir = TempDir::new().unwrap();
        let result = Git2History::open(dir.path().join("missing"));
        assert!(result.is_err());
    }

    #[test]
    fn test_commits_newest_first_with_tags() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let first = commit(&repo, "first");
        let object = repo.find_object(first, None).unwrap();
        repo.tag_lightweight("1.0.0", &object, false).unwrap();
        drop(object);
        commit(&repo, "second\n\nsem-ver: feature");

        let history = Git2History::from_git2(repo);
        let commits = history.commits().unwrap();

        assert_eq!(commits.len(), 2);
        assert!(commits[0].message.starts_with("second"));
        assert!(commits[0].tags.is_empty());
        assert!(commits[1].tags.contains("1.0.0"));
        assert_eq!(history.head_hash().unwrap(), commits[0].hash);
    }

    #[test]
    fn test_create_tag_on_head() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit(&repo, "first");

        let history = Git2History::from_git2(repo);
        assert!(!history.tag_exists("0.0.1").unwrap());
        history.create_tag("0.0.1").unwrap();
        assert!(history.tag_exists("0.0.1").unwrap());
        assert!(history.commits().unwrap()[0].tags.contains("0.0.1"));
    }

    #[test]
    fn test_unborn_head_is_git_error() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let history = Git2History::from_git2(repo);
        assert!(history.head_hash().unwrap_err().is_collaborator_failure());
    }
}
