use chrono::Duration;
use regex::Regex;
use std::sync::Arc;

use super::{CategoryNode, Classifier, LabelDurations};
use crate::error::UsageError;
use crate::models::Sample;

/// Label for editor windows outside every known project root.
pub const MISC_PROJECT: &str = "misc";

/// Ordered project patterns; capture group 1 names the project.
#[derive(Debug, Clone)]
pub struct ProjectPatterns {
    patterns: Arc<Vec<Regex>>,
}

impl ProjectPatterns {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, UsageError> {
        let compiled = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern.as_ref()).map_err(|source| UsageError::InvalidPattern {
                    pattern: pattern.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns: Arc::new(compiled),
        })
    }

    /// Group 1 of the first matching pattern that has one.
    ///
    /// A match whose group 1 did not participate names the empty project;
    /// patterns without a capture group never match.
    pub fn project_for<'t>(&self, title: &'t str) -> Option<&'t str> {
        self.patterns
            .iter()
            .filter(|pattern| pattern.captures_len() > 1)
            .find_map(|pattern| {
                pattern
                    .captures(title)
                    .map(|captures| captures.get(1).map_or("", |project| project.as_str()))
            })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Groups editor time by the project the open file belongs to.
pub struct EditorClassifier {
    process: String,
    patterns: ProjectPatterns,
    projects: LabelDurations,
}

impl EditorClassifier {
    pub fn new(process: impl Into<String>, patterns: ProjectPatterns, period: Duration) -> Self {
        Self {
            process: process.into(),
            patterns,
            projects: LabelDurations::new(period),
        }
    }
}

impl Classifier for EditorClassifier {
    fn record(&mut self, sample: &Sample) {
        let project = self
            .patterns
            .project_for(&sample.focused.window_title)
            .unwrap_or(MISC_PROJECT);
        self.projects.add(project, 1);
    }

    fn serialize(&self) -> CategoryNode {
        self.projects.to_node(&self.process)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record_titles(patterns: &[&str], titles: &[&str]) -> CategoryNode {
        let patterns = ProjectPatterns::compile(patterns).expect("patterns");
        let mut classifier = EditorClassifier::new("sublime_text", patterns, Duration::seconds(10));
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        for title in titles {
            classifier.record(&Sample::new(at, "laptop", "sublime_text", *title, Duration::zero()));
        }
        classifier.serialize()
    }

    #[test]
    fn project_name_comes_from_first_capture() {
        let node = record_titles(
            &["~/Projects/([^/]+)/.*"],
            &["~/Projects/usage-tracker/main - Editor"],
        );
        assert_eq!(node.child("usage-tracker").map(CategoryNode::total_secs), Some(10));
    }

    #[test]
    fn unmatched_title_is_misc() {
        let node = record_titles(&["~/Projects/([^/]+)/.*"], &["untitled - Editor"]);
        assert_eq!(node.child(MISC_PROJECT).map(CategoryNode::total_secs), Some(10));
    }

    #[test]
    fn earlier_patterns_win() {
        let patterns = ProjectPatterns::compile(&[
            "~/Dropbox/Programmieren/([^/]+)/.*",
            "~/([^/]+)/.*",
        ])
        .expect("patterns");
        assert_eq!(
            patterns.project_for("~/Dropbox/Programmieren/tracker/src/lib.rs"),
            Some("tracker")
        );
        assert_eq!(patterns.project_for("~/scratch/notes.txt"), Some("scratch"));
        assert_eq!(patterns.len(), 2);
    }

    #[test]
    fn equivalent_home_conventions_share_a_project() {
        let node = record_titles(
            &["~/Dropbox/Programmieren/([^/]+)/.*", "~/Programmieren/([^/]+)/.*"],
            &[
                "~/Dropbox/Programmieren/tracker/a.go",
                "~/Programmieren/tracker/b.go",
            ],
        );
        assert_eq!(node.child("tracker").map(CategoryNode::total_secs), Some(20));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = ProjectPatterns::compile(&["([unclosed"]).expect_err("invalid");
        match err {
            UsageError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "([unclosed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_patterns_means_everything_is_misc() {
        let patterns: [&str; 0] = [];
        let node = record_titles(&patterns, &["~/Projects/x/y"]);
        assert_eq!(node.total_secs(), 10);
        assert!(node.child(MISC_PROJECT).is_some());
    }

    #[test]
    fn unset_optional_group_names_the_empty_project() {
        let patterns =
            ProjectPatterns::compile(&["~/scratch(?:/([^/]+))?$", "~/([^/]+)/.*"]).expect("patterns");
        assert_eq!(patterns.project_for("~/scratch"), Some(""));
        assert_eq!(patterns.project_for("~/scratch/demo"), Some("demo"));
    }

    #[test]
    fn patterns_without_a_group_are_skipped() {
        let patterns = ProjectPatterns::compile(&["~/notes/.*", "~/([^/]+)/.*"]).expect("patterns");
        assert_eq!(patterns.project_for("~/notes/today.md"), Some("notes"));
    }
}
