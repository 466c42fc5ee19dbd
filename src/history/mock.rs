use crate::error::Result;
use crate::history::{CommitRecord, HistorySource, TagTarget};
use std::collections::BTreeSet;
use std::sync::Mutex;

/// Mock history for testing without actual git operations
///
/// Commits are added oldest first, the way they were made; the last one
/// added is HEAD.
#[derive(Debug, Default)]
pub struct MockHistory {
    commits: Vec<CommitRecord>,
    unavailable: bool,
    created_tags: Mutex<BTreeSet<String>>,
}

impl MockHistory {
    /// Create a new empty mock history
    pub fn new() -> Self {
        Self::default()
    }

    /// A history whose every read fails, like a directory outside any
    /// repository
    pub fn unavailable() -> Self {
        MockHistory {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Add a commit on top of the current HEAD
    pub fn add_commit(&mut self, hash: impl Into<String>, message: impl Into<String>) {
        self.commits.insert(0, CommitRecord::new(hash, message));
    }

    /// Add a tag pointing at HEAD
    pub fn add_tag(&mut self, name: impl Into<String>) {
        if let Some(head) = self.commits.first_mut() {
            head.tags.insert(name.into());
        }
    }

    /// Tags created through [TagTarget::create_tag]
    pub fn created_tags(&self) -> Vec<String> {
        match self.created_tags.lock() {
            Ok(tags) => tags.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(git2::Error::from_str("could not find repository").into());
        }
        Ok(())
    }
}

impl HistorySource for MockHistory {
    fn head_hash(&self) -> Result<String> {
        self.check_available()?;
        match self.commits.first() {
            Some(head) => Ok(head.hash.clone()),
            None => Err(git2::Error::from_str("reference 'refs/heads/main' not found").into()),
        }
    }

    fn commits(&self) -> Result<Vec<CommitRecord>> {
        self.check_available()?;
        Ok(self.commits.clone())
    }
}

impl TagTarget for MockHistory {
    fn tag_exists(&self, name: &str) -> Result<bool> {
        self.check_available()?;
        let created = self.created_tags().iter().any(|t| t == name);
        Ok(created || self.commits.iter().any(|c| c.tags.contains(name)))
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        self.check_available()?;
        if let Ok(mut tags) = self.created_tags.lock() {
            tags.insert(name.to_string());
        }
        Ok(())
    }
}
