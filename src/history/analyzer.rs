use crate::config::SemVerConfig;
use crate::domain::ReleaseGranularity;
use crate::history::CommitRecord;

fn contains(list: &[String], keyword: &str) -> bool {
    list.iter().any(|k| k == keyword)
}

/// Maps `sem-ver:` trailer keywords to a release granularity
#[derive(Debug, Clone, Default)]
pub struct VersionAnalyzer {
    config: SemVerConfig,
}

impl VersionAnalyzer {
    /// Create a new version analyzer
    pub fn new(config: SemVerConfig) -> Self {
        VersionAnalyzer { config }
    }

    /// Granularity called for by `keywords`.
    ///
    /// The highest-impact keyword wins. Patch is the floor, so unknown
    /// keywords and an empty list both give a patch increment.
    pub fn granularity<I, S>(&self, keywords: I) -> ReleaseGranularity
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut result = ReleaseGranularity::Patch;

        for keyword in keywords {
            let keyword = keyword.as_ref().trim();

            // Highest priority, nothing can outrank it
            if contains(&self.config.major_keywords, keyword) {
                return ReleaseGranularity::Major;
            }
            if contains(&self.config.minor_keywords, keyword) {
                result = ReleaseGranularity::Minor;
            }
        }

        result
    }

    /// Granularity called for by the trailers of `commits`
    pub fn analyze_commits(&self, commits: &[CommitRecord]) -> ReleaseGranularity {
        self.granularity(commits.iter().flat_map(|c| c.sem_ver_keywords()))
    }
}
