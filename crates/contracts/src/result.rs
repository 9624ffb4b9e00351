//! Search results - backend output and aggregator output
//!
//! `Answer` is produced exactly once per successful backend call.
//! `ResultCollection` is what the aggregator hands back to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::{Category, Query};

/// Marker text used for the deadline sentinel
pub const TIMED_OUT_MARKER: &str = "timed-out";

/// One backend answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Category that answered
    pub category: Category,

    /// Replica index within the category, if the backend is one of several replicas
    pub replica: Option<usize>,

    /// Result text, derived only from category and query
    pub text: String,

    /// Service time the backend spent before answering
    pub latency: Duration,
}

impl Answer {
    /// Build an answer with the canonical `<category> result for "<query>"` text
    pub fn new(category: Category, query: &Query, latency: Duration) -> Self {
        Self {
            text: Self::render(&category, query),
            category,
            replica: None,
            latency,
        }
    }

    /// Tag the answer with the replica that produced it
    pub fn with_replica(mut self, replica: usize) -> Self {
        self.replica = Some(replica);
        self
    }

    /// Canonical answer text for a (category, query) pair
    pub fn render(category: &Category, query: &Query) -> String {
        format!("{} result for {:?}", category, query.as_str())
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One entry of a result collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchResult {
    /// A category answered before the deadline
    Answered(Answer),
    /// Sentinel standing in for a category that did not answer in time
    TimedOut,
}

impl SearchResult {
    /// Returns the answer, if this entry is not a sentinel
    pub fn answer(&self) -> Option<&Answer> {
        match self {
            Self::Answered(answer) => Some(answer),
            Self::TimedOut => None,
        }
    }

    /// True for the deadline sentinel
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

impl From<Answer> for SearchResult {
    fn from(answer: Answer) -> Self {
        Self::Answered(answer)
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Answered(answer) => answer.fmt(f),
            Self::TimedOut => f.write_str(TIMED_OUT_MARKER),
        }
    }
}

/// How a collection call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionOutcome {
    /// Every category reported before the deadline
    #[default]
    Completed,
    /// The deadline elapsed with categories still outstanding
    TimedOut,
}

/// Results in arrival order
///
/// Invariant: `len() <= requested()`. Entries are never reordered by
/// category; the category is recoverable from each answer's content.
///
/// Serialize-only: a collection is built through `push`, never decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultCollection {
    entries: Vec<SearchResult>,
    requested: usize,
    outcome: CollectionOutcome,
}

impl ResultCollection {
    /// Empty collection for `requested` categories
    pub fn new(requested: usize) -> Self {
        Self {
            entries: Vec::with_capacity(requested),
            requested,
            outcome: CollectionOutcome::Completed,
        }
    }

    /// Append an arrival
    ///
    /// Entries beyond `requested` are ignored.
    pub fn push(&mut self, result: impl Into<SearchResult>) {
        if self.entries.len() < self.requested {
            self.entries.push(result.into());
        }
    }

    /// Pad with sentinels until every requested category has an entry
    pub fn fill_with_sentinels(&mut self) {
        while self.entries.len() < self.requested {
            self.entries.push(SearchResult::TimedOut);
        }
    }

    /// Mark the collection as cut short by the deadline
    pub fn mark_timed_out(&mut self) {
        self.outcome = CollectionOutcome::TimedOut;
    }

    pub fn outcome(&self) -> CollectionOutcome {
        self.outcome
    }

    /// True if the deadline cut the collection short
    pub fn is_timed_out(&self) -> bool {
        self.outcome == CollectionOutcome::TimedOut
    }

    /// Number of categories submitted
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Number of entries (answers plus sentinels)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of real answers
    pub fn answered(&self) -> usize {
        self.answers().count()
    }

    /// Number of categories without an answer
    pub fn missed(&self) -> usize {
        self.requested.saturating_sub(self.answered())
    }

    pub fn entries(&self) -> &[SearchResult] {
        &self.entries
    }

    /// Iterate over real answers, in arrival order
    pub fn answers(&self) -> impl Iterator<Item = &Answer> {
        self.entries.iter().filter_map(SearchResult::answer)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchResult> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ResultCollection {
    type Item = &'a SearchResult;
    type IntoIter = std::slice::Iter<'a, SearchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for ResultCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{entry}")?;
        }
        f.write_str("]")
    }
}
