use regex::{NoExpand, Regex};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::anchor::{check_identifier, LayoutError};
use crate::store::{read_document, write_if_changed, StoreError};

// =============================================================================
// Emoji stripping
// =============================================================================

/// Inclusive code point ranges treated as emoji, pictographs, dingbats and
/// other symbols.
///
/// `24C2..=1F251` is broad: it also covers CJK and other scripts between the
/// enclosed alphanumerics and the enclosed ideographic supplement.
pub const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x1F600, 0x1F64F), // emoticons
    (0x1F300, 0x1F5FF), // symbols & pictographs
    (0x1F680, 0x1F6FF), // transport & map
    (0x1F1E0, 0x1F1FF), // flags
    (0x2702, 0x27B0),   // dingbats
    (0x24C2, 0x1F251),  // enclosed characters
    (0x1F900, 0x1F9FF), // supplemental symbols
    (0x1FA00, 0x1FA6F), // extended symbols
    (0x2600, 0x26FF),   // miscellaneous symbols
    (0x2700, 0x27BF),   // dingbats
    (0x231A, 0x231B),   // watches
    (0x23E9, 0x23FA),   // av symbols
    (0x2B00, 0x2BFF),   // arrows
];

pub fn is_emoji(ch: char) -> bool {
    let cp = ch as u32;
    EMOJI_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Drop every emoji code point. Borrows when there is nothing to remove.
pub fn strip_emojis(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_emoji) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.chars().filter(|&c| !is_emoji(c)).collect())
}

// =============================================================================
// Field blanking
// =============================================================================

/// Empties a non-empty string field and leaves a trailing comment:
/// `icon: '🕯️',` becomes `icon: '', // Removed emoji`.
#[derive(Debug)]
pub struct FieldBlanker {
    pattern: Regex,
    replacement: String,
}

impl FieldBlanker {
    pub const DEFAULT_COMMENT: &'static str = "Removed emoji";

    pub fn new(field: &str, quote: char, comment: &str) -> Result<Self, LayoutError> {
        check_identifier("clear_field", field)?;
        if !matches!(quote, '\'' | '"' | '`') {
            return Err(LayoutError::InvalidQuote(quote));
        }
        let q = regex::escape(&quote.to_string());
        let pattern = Regex::new(&format!(
            r"\b{}:\s*{q}[^{q}]+{q},",
            regex::escape(field)
        ))?;
        Ok(Self {
            pattern,
            replacement: format!("{field}: {quote}{quote}, // {comment}"),
        })
    }

    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern
            .replace_all(text, NoExpand(&self.replacement))
    }
}

// =============================================================================
// Files
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Changed,
    Unchanged,
    Missing,
    /// Read or write failed; carries the error text.
    Failed(String),
}

#[derive(Debug, Default)]
pub struct StripReport {
    pub entries: Vec<(PathBuf, FileOutcome)>,
}

impl StripReport {
    pub fn updated(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, o)| *o == FileOutcome::Changed)
            .count()
    }

    pub fn missing(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, o)| *o == FileOutcome::Missing)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, o)| matches!(o, FileOutcome::Failed(_)))
            .count()
    }
}

/// Extensions picked up when a directory is given.
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("invalid glob '{pattern}': {source}")]
    Glob {
        pattern: String,
        source: glob::PatternError,
    },
}

/// Expand operator inputs into file paths.
/// Role: Directories are walked for source files, glob patterns are expanded,
/// anything else is kept as-is so a missing file still gets reported.
pub fn collect_sources(inputs: &[String]) -> Result<Vec<PathBuf>, SourceError> {
    let mut paths = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| {
                    p.extension()
                        .and_then(|ext| ext.to_str())
                        .map_or(false, |ext| SOURCE_EXTENSIONS.contains(&ext))
                })
                .collect();
            found.sort();
            paths.extend(found);
        } else if input.contains(['*', '?', '[']) {
            let matches = glob::glob(input).map_err(|source| SourceError::Glob {
                pattern: input.clone(),
                source,
            })?;
            paths.extend(matches.filter_map(Result::ok).filter(|p| p.is_file()));
        } else {
            paths.push(path.to_path_buf());
        }
    }
    Ok(paths)
}

/// Blank fields if asked, then strip emojis from one file.
/// The file is rewritten only when its content changed.
pub fn strip_file(path: &Path, blanker: Option<&FieldBlanker>) -> Result<FileOutcome, StoreError> {
    let original = match read_document(path) {
        Ok(text) => text,
        Err(StoreError::NotFound(_)) => return Ok(FileOutcome::Missing),
        Err(err) => return Err(err),
    };

    // blank first: an emoji-only value would otherwise be empty already
    let blanked = match blanker {
        Some(blanker) => blanker.apply(&original),
        None => Cow::Borrowed(original.as_str()),
    };
    let cleaned = strip_emojis(&blanked);

    if write_if_changed(path, &original, &cleaned)? {
        Ok(FileOutcome::Changed)
    } else {
        Ok(FileOutcome::Unchanged)
    }
}

/// Run [`strip_file`] over every path. A file that fails to read or write is
/// reported as failed; the remaining files are still processed.
pub fn strip_files(paths: &[PathBuf], blanker: Option<&FieldBlanker>) -> StripReport {
    let mut report = StripReport::default();
    for path in paths {
        let outcome = match strip_file(path, blanker) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(path = %path.display(), "{err}");
                FileOutcome::Failed(err.to_string())
            }
        };
        if outcome == FileOutcome::Changed {
            info!(path = %path.display(), "rewrote file");
        }
        report.entries.push((path.clone(), outcome));
    }
    report
}
