use chrono::Duration;
use url::Url;

use super::{CategoryNode, Classifier, LabelDurations};
use crate::models::Sample;

const TITLE_SEPARATOR: &str = " - ";

/// Groups browser time by the site the window title points at.
pub struct BrowserClassifier {
    process: String,
    sites: LabelDurations,
}

impl BrowserClassifier {
    pub fn new(process: impl Into<String>, period: Duration) -> Self {
        Self {
            process: process.into(),
            sites: LabelDurations::new(period),
        }
    }
}

impl Classifier for BrowserClassifier {
    fn record(&mut self, sample: &Sample) {
        self.sites.add(site_label(&sample.focused.window_title), 1);
    }

    fn serialize(&self) -> CategoryNode {
        self.sites.to_node(&self.process)
    }
}

/// Best-effort site name for a browser window title.
///
/// `"<address> - <browser>"` titles (and longer titles whose first segment is
/// an address) are parsed as URLs; everything else uses the second-to-last
/// segment, which is where browsers put the site for `"<page> - <site> - <browser>"`.
pub fn site_label(title: &str) -> String {
    let parts: Vec<&str> = title.split(TITLE_SEPARATOR).map(str::trim).collect();

    let address_first = (parts.len() == 2 && title.contains('.'))
        || (parts.len() > 2 && looks_like_address(parts[0]));
    if address_first {
        return host_label(parts[0]);
    }

    if parts.len() >= 2 {
        strip_site(parts[parts.len() - 2]).to_string()
    } else {
        strip_site(title.trim()).to_string()
    }
}

fn looks_like_address(segment: &str) -> bool {
    segment.contains('.') && !segment.chars().any(char::is_whitespace)
}

fn host_label(candidate: &str) -> String {
    let address = if candidate.contains("://") {
        candidate.to_string()
    } else {
        format!("http://{candidate}")
    };

    match Url::parse(&address) {
        Ok(url) => match url.host_str() {
            Some(host) => strip_site(host).to_string(),
            None => address,
        },
        Err(_) => address,
    }
}

fn strip_site(host: &str) -> &str {
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.strip_suffix(".com").unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn address_first_title_uses_host() {
        assert_eq!(site_label("github.com - mononofu - Safari"), "github");
        assert_eq!(site_label("www.reddit.com/r/rust - Google Chrome"), "reddit");
        assert_eq!(
            site_label("https://news.ycombinator.com/item?id=1 - Chrome"),
            "news.ycombinator"
        );
    }

    #[test]
    fn page_titles_use_second_to_last_segment() {
        assert_eq!(
            site_label("Rust Programming Language - www.rust-lang.org - Google Chrome"),
            "rust-lang.org"
        );
        assert_eq!(site_label("Inbox (3) - someone - Gmail - Google Chrome"), "Gmail");
        assert_eq!(site_label("Search results - Google Chrome"), "Search results");
    }

    #[test]
    fn unparseable_address_falls_back_to_prefixed_string() {
        assert_eq!(site_label("Release notes v1.2 - Chrome"), "http://Release notes v1.2");
    }

    #[test]
    fn single_segment_title_is_used_whole() {
        assert_eq!(site_label("New Tab"), "New Tab");
        assert_eq!(site_label("www.example.com"), "example");
    }

    #[test]
    fn classifier_accumulates_per_site() {
        let mut classifier = BrowserClassifier::new("chrome", Duration::seconds(10));
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        for title in [
            "github.com - Google Chrome",
            "www.github.com - Google Chrome",
            "docs.rs - Google Chrome",
        ] {
            classifier.record(&Sample::new(at, "laptop", "chrome", title, Duration::zero()));
        }

        let node = classifier.serialize();
        assert_eq!(node.name(), "chrome");
        assert_eq!(node.child("github").map(CategoryNode::total_secs), Some(20));
        assert_eq!(node.child("docs.rs").map(CategoryNode::total_secs), Some(10));
    }
}
