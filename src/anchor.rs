use regex::Regex;
use std::ops::Range;
use tracing::debug;

use crate::normalize::{normalize, unescape};

// =============================================================================
// Record layout
// =============================================================================

/// Field names that shape a record inside the data file.
///
/// The defaults describe the guide entries of a content module:
///
/// ```text
///   {
///     id: 'shabbat-candles',
///     ...
///     summary: 'On Friday evening ...',
///     whenRelevant: 'Every Friday',
///   },
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    /// Field whose string value is the record id.
    pub id_field: String,
    /// Field after which new content goes.
    pub end_field: String,
    /// Field that must directly follow `end_field`, if any.
    pub follower_field: Option<String>,
    /// String literal delimiter.
    pub quote: char,
}

impl Default for RecordLayout {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            end_field: "summary".to_string(),
            follower_field: Some("whenRelevant".to_string()),
            quote: '\'',
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("layout field '{role}' must not be empty")]
    EmptyField { role: &'static str },

    #[error("layout field '{role}' is not a plain identifier: '{name}'")]
    InvalidField { role: &'static str, name: String },

    #[error("unsupported string delimiter {0:?} (expected ', \" or `)")]
    InvalidQuote(char),

    #[error("failed to compile record pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Outcome of a failed lookup. Both variants are per-record and never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    #[error("record '{0}' not found")]
    NotFound(String),

    #[error("record '{id}' is ambiguous: {reason}")]
    Ambiguous { id: String, reason: String },
}

impl LocateError {
    fn ambiguous(id: &str, reason: impl Into<String>) -> Self {
        Self::Ambiguous {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

pub(crate) fn check_identifier(role: &'static str, name: &str) -> Result<(), LayoutError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(LayoutError::EmptyField { role });
    };
    let valid = (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(LayoutError::InvalidField {
            role,
            name: name.to_string(),
        })
    }
}

// =============================================================================
// Anchors
// =============================================================================

/// How the text around an insertion point is laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineStyle {
    /// Fields share one line: `summary: 'hi', whenRelevant: true`.
    Inline,
    /// One field per line. `indent` is the end marker's own line indentation
    /// and `newline` the line ending found after it.
    Multiline {
        indent: String,
        newline: &'static str,
    },
}

/// The located insertion point of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Byte offset of the id field that opened the record.
    pub record_start: usize,
    /// Byte range of the end-marker field, trailing comma included.
    pub end_marker: Range<usize>,
    pub line_style: LineStyle,
}

impl Anchor {
    /// Zero-width insertion point, right after the end marker.
    pub fn insert_at(&self) -> usize {
        self.end_marker.end
    }
}

/// Byte span of one record: `body` runs from just after the id literal up to
/// the next id field or the end of the document.
struct Scope {
    record_start: usize,
    body: Range<usize>,
}

// =============================================================================
// Locator
// =============================================================================

/// Pattern-based record lookup over a semi-structured data file.
///
/// This is not a parser. Records are found by matching `id: '<value>'` and a
/// record's region ends where the next `id:` field begins, so reformatting the
/// file beyond what the patterns allow will make lookups fail as
/// [`LocateError::Ambiguous`] rather than edit the wrong place.
#[derive(Debug)]
pub struct Locator {
    layout: RecordLayout,
    id_pattern: Regex,
    end_pattern: Regex,
    follower_pattern: Option<Regex>,
    string_field_pattern: Regex,
}

impl Locator {
    pub fn new(layout: RecordLayout) -> Result<Self, LayoutError> {
        check_identifier("id_field", &layout.id_field)?;
        check_identifier("end_field", &layout.end_field)?;
        if let Some(follower) = &layout.follower_field {
            check_identifier("follower_field", follower)?;
        }
        if !matches!(layout.quote, '\'' | '"' | '`') {
            return Err(LayoutError::InvalidQuote(layout.quote));
        }

        let q = regex::escape(&layout.quote.to_string());
        let literal = format!(r"{q}((?:[^{q}\\]|\\(?s:.))*){q}");

        let id_pattern = Regex::new(&format!(
            r"\b{}\s*:\s*{literal}",
            regex::escape(&layout.id_field)
        ))?;
        let end_pattern = Regex::new(&format!(
            r"\b{}\s*:\s*{literal}\s*,",
            regex::escape(&layout.end_field)
        ))?;
        let follower_pattern = layout
            .follower_field
            .as_deref()
            .map(|name| Regex::new(&format!(r"\A{}\s*:", regex::escape(name))))
            .transpose()?;
        let string_field_pattern =
            Regex::new(&format!(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*:\s*{literal}"))?;

        Ok(Self {
            layout,
            id_pattern,
            end_pattern,
            follower_pattern,
            string_field_pattern,
        })
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Find where new content for `record_id` goes.
    /// Role: `NotFound` when no record carries the id, `Ambiguous` when the id
    /// repeats or the end marker does not resolve to exactly one position.
    pub fn locate(&self, document: &str, record_id: &str) -> Result<Anchor, LocateError> {
        let scope = self.scope(document, record_id)?;
        let body = &document[scope.body.clone()];

        let markers: Vec<Range<usize>> = self
            .end_pattern
            .find_iter(body)
            .map(|m| m.range())
            .collect();
        let end_field = &self.layout.end_field;
        let marker = match markers.as_slice() {
            [] => {
                return Err(LocateError::ambiguous(
                    record_id,
                    format!("no '{end_field}' field inside the record"),
                ))
            }
            [only] => only.start + scope.body.start..only.end + scope.body.start,
            many => {
                return Err(LocateError::ambiguous(
                    record_id,
                    format!("'{end_field}' appears {} times inside the record", many.len()),
                ))
            }
        };

        let rest = &document[marker.end..scope.body.end];
        let next_token = rest.trim_start();
        let gap = &rest[..rest.len() - next_token.len()];

        if let (Some(pattern), Some(follower)) =
            (&self.follower_pattern, &self.layout.follower_field)
        {
            if !pattern.is_match(next_token) {
                return Err(LocateError::ambiguous(
                    record_id,
                    format!("expected '{follower}' right after '{end_field}'"),
                ));
            }
        }

        let line_style = if gap.contains('\n') {
            let line_start = document[..marker.start].rfind('\n').map_or(0, |nl| nl + 1);
            let line = &document[line_start..marker.start];
            let indent = &line[..line.len() - line.trim_start().len()];
            LineStyle::Multiline {
                indent: indent.to_string(),
                newline: if gap.contains("\r\n") { "\r\n" } else { "\n" },
            }
        } else {
            LineStyle::Inline
        };

        debug!(
            record = record_id,
            offset = marker.end,
            "located insertion point"
        );
        Ok(Anchor {
            record_start: scope.record_start,
            end_marker: marker,
            line_style,
        })
    }

    /// Read back the unescaped value of a string field inside a record.
    /// Returns `Ok(None)` when the record has no such field.
    pub fn read_field(
        &self,
        document: &str,
        record_id: &str,
        field: &str,
    ) -> Result<Option<String>, LocateError> {
        let scope = self.scope(document, record_id)?;
        let body = &document[scope.body];

        let values: Vec<&str> = self
            .string_field_pattern
            .captures_iter(body)
            .filter(|caps| &caps[1] == field)
            .filter_map(|caps| caps.get(2).map(|m| m.as_str()))
            .collect();
        match values.as_slice() {
            [] => Ok(None),
            [value] => Ok(Some(unescape(value, self.layout.quote))),
            many => Err(LocateError::ambiguous(
                record_id,
                format!("'{field}' appears {} times inside the record", many.len()),
            )),
        }
    }

    fn scope(&self, document: &str, record_id: &str) -> Result<Scope, LocateError> {
        if record_id.is_empty() {
            return Err(LocateError::NotFound(String::new()));
        }
        let wanted = normalize(record_id, self.layout.quote);

        // (start of the id field, end of the id literal, is this our record)
        let ids: Vec<(usize, usize, bool)> = self
            .id_pattern
            .captures_iter(document)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let value = caps.get(1)?;
                Some((whole.start(), whole.end(), value.as_str() == wanted))
            })
            .collect();

        let hits: Vec<usize> = ids
            .iter()
            .enumerate()
            .filter(|(_, (_, _, ours))| *ours)
            .map(|(idx, _)| idx)
            .collect();
        let idx = match hits.as_slice() {
            [] => return Err(LocateError::NotFound(record_id.to_string())),
            [idx] => *idx,
            many => {
                return Err(LocateError::ambiguous(
                    record_id,
                    format!("record id occurs {} times", many.len()),
                ))
            }
        };

        let (record_start, body_start, _) = ids[idx];
        let body_end = ids
            .get(idx + 1)
            .map_or(document.len(), |(next_start, _, _)| *next_start);
        Ok(Scope {
            record_start,
            body: body_start..body_end,
        })
    }
}
