use chrono::Duration;

use super::{CategoryNode, Classifier, LabelDurations};
use crate::models::Sample;

/// Fallback classifier: one category per distinct window title.
pub struct GenericClassifier {
    process: String,
    titles: LabelDurations,
}

impl GenericClassifier {
    pub fn new(process: impl Into<String>, period: Duration) -> Self {
        Self {
            process: process.into(),
            titles: LabelDurations::new(period),
        }
    }
}

impl Classifier for GenericClassifier {
    fn record(&mut self, sample: &Sample) {
        self.titles.add(sample.focused.window_title.as_str(), 1);
    }

    fn serialize(&self) -> CategoryNode {
        self.titles.to_node(&self.process)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn titles_are_kept_verbatim() {
        let mut classifier = GenericClassifier::new("terminal", Duration::seconds(10));
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        for title in ["vim - notes.md", "vim - notes.md", "htop"] {
            classifier.record(&Sample::new(at, "laptop", "terminal", title, Duration::zero()));
        }

        assert_eq!(classifier.titles.get("vim - notes.md"), Some(Duration::seconds(20)));
        let node = classifier.serialize();
        assert_eq!(node.name(), "terminal");
        assert_eq!(node.child("htop").map(CategoryNode::total_secs), Some(10));
    }
}
