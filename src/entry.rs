//! Entry-point detection for resume-by-link.
//!
//! A boolean `resume` query parameter in the initial navigation URL selects
//! resume-by-link behavior; once consumed, the parameter is stripped so a
//! later in-app reload is a normal entry.

use tracing::warn;
use url::Url;

/// How the process was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryPoint {
    resume: bool,
}

impl EntryPoint {
    /// A normal (non-resume) entry.
    pub fn fresh() -> Self {
        Self { resume: false }
    }

    /// A resume-by-link entry, for hosts that detect the flag themselves.
    pub fn resume_entry() -> Self {
        Self { resume: true }
    }

    pub fn resume(&self) -> bool {
        self.resume
    }

    /// Parses the initial navigation URL.
    ///
    /// Returns the entry point and, when the resume flag was present, the URL
    /// with exactly that parameter stripped (other query parameters are kept).
    /// An unparseable URL degrades to a fresh entry.
    pub fn from_url(raw: &str) -> (Self, Option<String>) {
        let mut url = match Url::parse(raw) {
            Ok(url) => url,
            Err(err) => {
                warn!(%err, "unparseable entry url, treating as fresh entry");
                return (Self::fresh(), None);
            }
        };

        let resume = url
            .query_pairs()
            .any(|(key, value)| key == "resume" && value == "true");
        if !resume {
            return (Self::fresh(), None);
        }

        let remaining: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "resume")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        if remaining.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(remaining.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        (Self::resume_entry(), Some(url.to_string()))
    }
}
