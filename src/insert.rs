use std::fmt;

use crate::anchor::{Anchor, LineStyle};
use crate::normalize::normalize;

// =============================================================================
// Content payloads
// =============================================================================

/// Named text fields supplied by the operator for one record.
/// Field order is kept as given and drives the rendered order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPayload {
    fields: Vec<(String, String)>,
}

impl ContentPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.fields.push((name.into(), text.into()));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, t)| (n.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<N: Into<String>, T: Into<String>> FromIterator<(N, T)> for ContentPayload {
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(n, t)| (n.into(), t.into()))
                .collect(),
        }
    }
}

// =============================================================================
// Formatted blocks
// =============================================================================

/// Insertion-ready text for one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedBlock(String);

impl FormattedBlock {
    /// Render `payload` to sit right after the anchor's end marker.
    /// Role: Each value is normalized here, once.
    ///
    /// Inline anchors get ` name: 'value',` per field. Multi-line anchors get
    /// the name on its own line at the end marker's indentation and the value
    /// on the next line, two spaces deeper, using the document's line ending.
    pub fn render(payload: &ContentPayload, anchor: &Anchor, quote: char) -> Self {
        let mut out = String::new();
        for (name, text) in payload.fields() {
            let value = normalize(text, quote);
            match &anchor.line_style {
                LineStyle::Inline => {
                    out.push_str(&format!(" {name}: {quote}{value}{quote},"));
                }
                LineStyle::Multiline { indent, newline } => {
                    out.push_str(&format!(
                        "{newline}{indent}{name}:{newline}{indent}  {quote}{value}{quote},"
                    ));
                }
            }
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FormattedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Splicing
// =============================================================================

/// Splice `block` in at the anchor's insertion point.
/// Everything outside that zero-width point is copied unchanged, so the result
/// is exactly `block.len()` bytes longer than `document`.
pub fn insert(document: &str, anchor: &Anchor, block: &FormattedBlock) -> String {
    let at = anchor.insert_at();
    let mut out = String::with_capacity(document.len() + block.len());
    out.push_str(&document[..at]);
    out.push_str(block.as_str());
    out.push_str(&document[at..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{Locator, RecordLayout};

    fn payload() -> ContentPayload {
        ContentPayload::new()
            .with_field("a", "foo")
            .with_field("b", "bar's")
            .with_field("c", "baz")
    }

    #[test]
    fn inline_insertion_lands_before_follower() {
        let doc = "id: 'x', summary: 'hi', whenRelevant: true";
        let locator = Locator::new(RecordLayout::default()).unwrap();
        let anchor = locator.locate(doc, "x").unwrap();
        let block = FormattedBlock::render(&payload(), &anchor, '\'');
        assert_eq!(block.as_str(), r" a: 'foo', b: 'bar\'s', c: 'baz',");

        let out = insert(doc, &anchor, &block);
        assert_eq!(
            out,
            r"id: 'x', summary: 'hi', a: 'foo', b: 'bar\'s', c: 'baz', whenRelevant: true"
        );
        assert_eq!(out.len(), doc.len() + block.len());
    }

    #[test]
    fn multiline_insertion_follows_indentation() {
        let doc = "  {\n    id: 'x',\n    summary: 'hi',\n    whenRelevant: true,\n  },\n";
        let locator = Locator::new(RecordLayout::default()).unwrap();
        let anchor = locator.locate(doc, "x").unwrap();
        let block = FormattedBlock::render(
            &ContentPayload::new().with_field("beginnerWhy", "Because it's holy."),
            &anchor,
            '\'',
        );

        let out = insert(doc, &anchor, &block);
        assert_eq!(
            out,
            "  {\n    id: 'x',\n    summary: 'hi',\n    beginnerWhy:\n      'Because it\\'s holy.',\n    whenRelevant: true,\n  },\n"
        );
    }

    #[test]
    fn surrounding_bytes_are_untouched() {
        let doc = "id: 'x', summary: 'hi', whenRelevant: true // tail";
        let locator = Locator::new(RecordLayout::default()).unwrap();
        let anchor = locator.locate(doc, "x").unwrap();
        let block = FormattedBlock::render(&payload(), &anchor, '\'');
        let out = insert(doc, &anchor, &block);

        let at = anchor.insert_at();
        assert_eq!(&out[..at], &doc[..at]);
        assert_eq!(&out[at + block.len()..], &doc[at..]);
    }

    #[test]
    fn empty_payload_renders_nothing() {
        let doc = "id: 'x', summary: 'hi', whenRelevant: true";
        let locator = Locator::new(RecordLayout::default()).unwrap();
        let anchor = locator.locate(doc, "x").unwrap();
        let block = FormattedBlock::render(&ContentPayload::new(), &anchor, '\'');
        assert!(block.is_empty());
        assert_eq!(insert(doc, &anchor, &block), doc);
    }

    #[test]
    fn payload_collects_in_order() {
        let payload: ContentPayload = [("z", "1"), ("a", "2")].into_iter().collect();
        let names: Vec<&str> = payload.fields().map(|(n, _)| n).collect();
        assert_eq!(names, ["z", "a"]);
        assert_eq!(payload.len(), 2);
    }
}
