//! Pattern-based bulk edits for content data files.
//!
//! The main piece is a block inserter: it finds a record by its id inside a
//! semi-structured source file, locates a known field in that record and
//! splices new string fields in right after it, leaving every other byte
//! alone. Matching is done with regular expressions, not a parser.

pub mod anchor;
pub mod batch;
pub mod config;
pub mod emoji;
pub mod insert;
pub mod normalize;
pub mod report;
pub mod store;

pub use anchor::{Anchor, LayoutError, LineStyle, LocateError, Locator, RecordLayout};
pub use batch::{preview, run, BatchReport, Outcome, PreviewEntry};
pub use config::{load_job, parse_job, Job, JobError};
pub use insert::{insert, ContentPayload, FormattedBlock};
pub use normalize::{normalize, unescape};
