use std::fmt;
use tracing::{info, warn};

use crate::anchor::{LocateError, Locator};
use crate::insert::{insert, ContentPayload, FormattedBlock};

// =============================================================================
// Report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Inserted,
    NotFound,
    Ambiguous(String),
}

impl Outcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Outcome::Inserted)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Inserted => f.write_str("inserted"),
            Outcome::NotFound => f.write_str("not found"),
            Outcome::Ambiguous(reason) => write!(f, "ambiguous ({reason})"),
        }
    }
}

impl From<LocateError> for Outcome {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::NotFound(_) => Outcome::NotFound,
            LocateError::Ambiguous { reason, .. } => Outcome::Ambiguous(reason),
        }
    }
}

/// Per-record outcomes in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub entries: Vec<(String, Outcome)>,
}

impl BatchReport {
    pub fn inserted(&self) -> usize {
        self.count(|o| o.is_inserted())
    }

    pub fn not_found(&self) -> usize {
        self.count(|o| matches!(o, Outcome::NotFound))
    }

    pub fn ambiguous(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Ambiguous(_)))
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn is_clean(&self) -> bool {
        self.inserted() == self.total()
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.entries.iter().filter(|(_, o)| pred(o)).count()
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Fold `payloads` over `document` in the given order.
/// Role: Locate, render, insert; a failed record is reported and skipped and
/// the updated text carries into the next record.
pub fn run<'a, I>(document: &str, payloads: I, locator: &Locator) -> (String, BatchReport)
where
    I: IntoIterator<Item = (&'a str, &'a ContentPayload)>,
{
    let quote = locator.layout().quote;
    let mut current = document.to_string();
    let mut report = BatchReport::default();

    for (record_id, payload) in payloads {
        let outcome = match locator.locate(&current, record_id) {
            Ok(anchor) => {
                let block = FormattedBlock::render(payload, &anchor, quote);
                current = insert(&current, &anchor, &block);
                info!(record = record_id, bytes = block.len(), "inserted block");
                Outcome::Inserted
            }
            Err(err) => {
                warn!(record = record_id, "skipped: {err}");
                Outcome::from(err)
            }
        };
        report.entries.push((record_id.to_string(), outcome));
    }

    (current, report)
}

/// One record of a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub record: String,
    /// Current value of the end field, the text the block would follow.
    pub current: Option<String>,
    pub block: Result<FormattedBlock, LocateError>,
}

/// Render what [`run`] would insert, without producing a document.
/// Records that cannot be located carry an `Err` block, in the same order.
pub fn preview<'a, I>(document: &str, payloads: I, locator: &Locator) -> Vec<PreviewEntry>
where
    I: IntoIterator<Item = (&'a str, &'a ContentPayload)>,
{
    let layout = locator.layout();
    payloads
        .into_iter()
        .map(|(record_id, payload)| {
            let block = locator
                .locate(document, record_id)
                .map(|anchor| FormattedBlock::render(payload, &anchor, layout.quote));
            let current = locator
                .read_field(document, record_id, &layout.end_field)
                .ok()
                .flatten();
            PreviewEntry {
                record: record_id.to_string(),
                current,
                block,
            }
        })
        .collect()
}
