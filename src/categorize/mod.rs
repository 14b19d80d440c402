//! Per-application categorization of confirmed samples.
//!
//! `UsageTree` dispatches every confirmed sample to a classifier keyed by the
//! focused process, creating it on first sighting. Each classifier turns the
//! window title into a label and accumulates one sampling period per sample.

pub mod browser;
pub mod editor;
pub mod generic;
pub mod practice;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::config::EngineConfig;
use crate::error::UsageError;
use crate::models::{PracticePiece, Sample};

pub use browser::{site_label, BrowserClassifier};
pub use editor::{EditorClassifier, ProjectPatterns, MISC_PROJECT};
pub use generic::GenericClassifier;
pub use practice::PracticeClassifier;

pub const ROOT_NAME: &str = "AppUsage";

/// One node of the serialized usage breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CategoryNode {
    Internal {
        name: String,
        children: Vec<CategoryNode>,
    },
    Leaf {
        name: String,
        /// Accumulated seconds.
        size: i64,
    },
}

impl CategoryNode {
    pub fn name(&self) -> &str {
        match self {
            CategoryNode::Internal { name, .. } | CategoryNode::Leaf { name, .. } => name,
        }
    }

    pub fn child(&self, name: &str) -> Option<&CategoryNode> {
        match self {
            CategoryNode::Internal { children, .. } => {
                children.iter().find(|child| child.name() == name)
            }
            CategoryNode::Leaf { .. } => None,
        }
    }

    /// Seconds accumulated in this node and everything below it.
    pub fn total_secs(&self) -> i64 {
        match self {
            CategoryNode::Internal { children, .. } => {
                children.iter().map(CategoryNode::total_secs).sum()
            }
            CategoryNode::Leaf { size, .. } => *size,
        }
    }
}

/// Shared capability of every classifier variant.
pub trait Classifier: Send {
    fn record(&mut self, sample: &Sample);
    fn serialize(&self) -> CategoryNode;
}

/// Label → accumulated time, in sampling-period units.
#[derive(Debug, Clone)]
pub struct LabelDurations {
    period: Duration,
    units: BTreeMap<String, u64>,
}

impl LabelDurations {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            units: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, label: impl Into<String>, units: u64) {
        *self.units.entry(label.into()).or_insert(0) += units;
    }

    pub fn get(&self, label: &str) -> Option<Duration> {
        self.units
            .get(label)
            .map(|units| self.period * (*units as i32))
    }

    pub fn to_node(&self, name: &str) -> CategoryNode {
        let period_secs = self.period.num_seconds();
        CategoryNode::Internal {
            name: name.to_string(),
            children: self
                .units
                .iter()
                .map(|(label, units)| CategoryNode::Leaf {
                    name: label.clone(),
                    size: period_secs * (*units as i64),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Generic,
    Browser,
    Editor,
}

/// Maps process names to the classifier variant created for them.
#[derive(Debug, Clone)]
pub struct ClassifierRegistry {
    kinds: HashMap<String, ClassifierKind>,
    patterns: ProjectPatterns,
    period: Duration,
}

impl ClassifierRegistry {
    pub fn from_config(config: &EngineConfig) -> Result<Self, UsageError> {
        let patterns = ProjectPatterns::compile(&config.project_patterns)?;
        let mut kinds = HashMap::new();
        for process in &config.browser_processes {
            kinds.insert(process.clone(), ClassifierKind::Browser);
        }
        for process in &config.editor_processes {
            kinds.insert(process.clone(), ClassifierKind::Editor);
        }

        Ok(Self {
            kinds,
            patterns,
            period: config.sampling_period(),
        })
    }

    pub fn kind_for(&self, process: &str) -> ClassifierKind {
        self.kinds
            .get(process)
            .copied()
            .unwrap_or(ClassifierKind::Generic)
    }

    pub fn create(&self, process: &str) -> Box<dyn Classifier> {
        match self.kind_for(process) {
            ClassifierKind::Generic => Box::new(GenericClassifier::new(process, self.period)),
            ClassifierKind::Browser => Box::new(BrowserClassifier::new(process, self.period)),
            ClassifierKind::Editor => Box::new(EditorClassifier::new(
                process,
                self.patterns.clone(),
                self.period,
            )),
        }
    }
}

/// Root dispatcher building the "AppUsage" tree for one reconstruction pass.
pub struct UsageTree {
    registry: ClassifierRegistry,
    apps: HashMap<String, Box<dyn Classifier>>,
    practice_label: String,
    period: Duration,
}

impl UsageTree {
    pub fn new(config: &EngineConfig) -> Result<Self, UsageError> {
        Ok(Self::with_registry(
            ClassifierRegistry::from_config(config)?,
            config,
        ))
    }

    pub fn with_registry(registry: ClassifierRegistry, config: &EngineConfig) -> Self {
        Self {
            registry,
            apps: HashMap::new(),
            practice_label: config.practice_label.clone(),
            period: config.sampling_period(),
        }
    }

    pub fn record(&mut self, sample: &Sample) {
        let process = sample.focused.process.as_str();
        let registry = &self.registry;
        self.apps
            .entry(process.to_string())
            .or_insert_with(|| registry.create(process))
            .record(sample);
    }

    /// Count a practice piece as a peer category of the focused apps.
    pub fn record_practice(&mut self, piece: &PracticePiece) {
        let label = self.practice_label.clone();
        let period = self.period;
        let sample = practice::practice_sample(piece, &label);
        let classifier = self
            .apps
            .entry(label.clone())
            .or_insert_with(|| -> Box<dyn Classifier> {
                Box::new(PracticeClassifier::new(label, period))
            });
        for _ in 0..piece.sampling_units(period) {
            classifier.record(&sample);
        }
    }

    pub fn app_count(&self) -> usize {
        self.apps.len()
    }

    pub fn serialize(&self) -> CategoryNode {
        let mut children: Vec<CategoryNode> =
            self.apps.values().map(|app| app.serialize()).collect();
        children.sort_by(|a, b| a.name().cmp(b.name()));
        CategoryNode::Internal {
            name: ROOT_NAME.to_string(),
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample(process: &str, title: &str) -> Sample {
        Sample::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            "laptop",
            process,
            title,
            Duration::zero(),
        )
    }

    fn config() -> EngineConfig {
        EngineConfig {
            project_patterns: vec!["~/Projects/([^/]+)/.*".into()],
            ..EngineConfig::default()
        }
    }

    #[test]
    fn dispatches_by_process_and_creates_lazily() {
        let mut tree = UsageTree::new(&config()).expect("tree");
        assert_eq!(tree.app_count(), 0);

        tree.record(&sample("chrome", "github.com - Safari"));
        tree.record(&sample("chrome", "github.com - Safari"));
        tree.record(&sample("sublime_text", "~/Projects/usage-tracker/main.rs - Sublime"));
        tree.record(&sample("terminal", "zsh"));
        assert_eq!(tree.app_count(), 3);

        let root = tree.serialize();
        assert_eq!(root.name(), ROOT_NAME);
        let names: Vec<&str> = match &root {
            CategoryNode::Internal { children, .. } => children.iter().map(|c| c.name()).collect(),
            CategoryNode::Leaf { .. } => panic!("root must be internal"),
        };
        assert_eq!(names, vec!["chrome", "sublime_text", "terminal"]);

        let chrome = root.child("chrome").expect("chrome");
        assert_eq!(chrome.child("github").map(CategoryNode::total_secs), Some(20));
        let editor = root.child("sublime_text").expect("editor");
        assert_eq!(editor.child("usage-tracker").map(CategoryNode::total_secs), Some(10));
        let terminal = root.child("terminal").expect("terminal");
        assert_eq!(terminal.child("zsh").map(CategoryNode::total_secs), Some(10));
        assert_eq!(root.total_secs(), 40);
    }

    #[test]
    fn invalid_pattern_fails_at_construction() {
        let config = EngineConfig {
            project_patterns: vec!["~/Projects/([^/]+".into()],
            ..EngineConfig::default()
        };
        assert!(matches!(
            UsageTree::new(&config),
            Err(UsageError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn practice_appears_as_peer_category() {
        let mut tree = UsageTree::new(&config()).expect("tree");
        tree.record(&sample("terminal", "zsh"));

        let start = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
        let piece = PracticePiece {
            started_at: start,
            length_ms: 25_000,
            notes: Vec::new(),
        };
        tree.record_practice(&piece);

        let root = tree.serialize();
        let piano = root.child("piano").expect("practice node");
        assert_eq!(piano.total_secs(), 30);
        assert_eq!(root.total_secs(), 40);
    }

    #[test]
    fn durations_are_period_multiples() {
        let mut tree = UsageTree::new(&EngineConfig {
            sampling_period_secs: 7,
            ..config()
        })
        .expect("tree");
        for _ in 0..5 {
            tree.record(&sample("terminal", "vim"));
        }
        let root = tree.serialize();
        let secs = root.total_secs();
        assert_eq!(secs, 35);
        assert_eq!(secs % 7, 0);
    }

    #[test]
    fn serialized_tree_matches_chart_json_shape() {
        let mut tree = UsageTree::new(&config()).expect("tree");
        tree.record(&sample("terminal", "zsh"));
        let json = serde_json::to_value(tree.serialize()).expect("json");
        assert_eq!(
            json,
            serde_json::json!({
                "name": "AppUsage",
                "children": [
                    { "name": "terminal", "children": [ { "name": "zsh", "size": 10 } ] }
                ]
            })
        );
    }
}
