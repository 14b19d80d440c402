use chrono::Duration;

use super::{CategoryNode, Classifier, LabelDurations};
use crate::models::{PracticePiece, Sample};

/// Synthetic classifier for activity that never shows up as a focused window.
///
/// Every recorded sample adds one sampling period under the fixed label,
/// whatever the sample says.
pub struct PracticeClassifier {
    label: String,
    time: LabelDurations,
}

impl PracticeClassifier {
    pub fn new(label: impl Into<String>, period: Duration) -> Self {
        Self {
            label: label.into(),
            time: LabelDurations::new(period),
        }
    }
}

impl Classifier for PracticeClassifier {
    fn record(&mut self, _sample: &Sample) {
        self.time.add(self.label.as_str(), 1);
    }

    fn serialize(&self) -> CategoryNode {
        self.time.to_node(&self.label)
    }
}

/// Confirmed sample standing in for a practice piece.
pub fn practice_sample(piece: &PracticePiece, label: &str) -> Sample {
    Sample::new(piece.started_at, "", label, label, Duration::zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn every_call_adds_one_period_under_the_fixed_label() {
        let piece = PracticePiece {
            started_at: Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap(),
            length_ms: 0,
            notes: Vec::new(),
        };
        let mut classifier = PracticeClassifier::new("piano", Duration::seconds(10));
        for _ in 0..3 {
            classifier.record(&practice_sample(&piece, "piano"));
        }

        let node = classifier.serialize();
        assert_eq!(node.name(), "piano");
        assert_eq!(node.child("piano").map(CategoryNode::total_secs), Some(30));
    }
}
