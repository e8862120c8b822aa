use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::anchor::RecordLayout;
use crate::insert::ContentPayload;

// =============================================================================
// Job files
// =============================================================================

/// Everything one insertion run needs besides the document itself.
/// Records keep the order they have in the job file.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub layout: RecordLayout,
    pub records: Vec<(String, ContentPayload)>,
}

impl Job {
    pub fn payloads(&self) -> impl Iterator<Item = (&str, &ContentPayload)> {
        self.records.iter().map(|(id, p)| (id.as_str(), p))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job file not found: {0}")]
    Missing(String),

    #[error("failed to read job file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse job file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("record ids must not be empty")]
    EmptyRecordId,

    #[error("record '{0}' must be a table of text fields")]
    NotATable(String),

    #[error("field '{field}' of record '{record}' must be a string")]
    NotText { record: String, field: String },

    #[error("record '{0}' has no fields")]
    NoFields(String),

    #[error("'quote' must be a single character, got '{0}'")]
    BadQuote(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JobFile {
    #[serde(default)]
    layout: LayoutSection,
    #[serde(default)]
    records: toml::Table,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutSection {
    id_field: Option<String>,
    end_field: Option<String>,
    follower_field: Option<String>,
    quote: Option<String>,
}

impl LayoutSection {
    fn into_layout(self) -> Result<RecordLayout, JobError> {
        let defaults = RecordLayout::default();
        let quote = match self.quote {
            None => defaults.quote,
            Some(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(q), None) => q,
                    _ => return Err(JobError::BadQuote(text)),
                }
            }
        };
        // an empty follower disables the check
        let follower_field = match self.follower_field {
            None => defaults.follower_field,
            Some(name) if name.is_empty() => None,
            Some(name) => Some(name),
        };
        Ok(RecordLayout {
            id_field: self.id_field.unwrap_or(defaults.id_field),
            end_field: self.end_field.unwrap_or(defaults.end_field),
            follower_field,
            quote,
        })
    }
}

/// Parse a job from TOML text.
///
/// ```toml
/// [layout]
/// end_field = "summary"
///
/// [records.kiddush-guide]
/// beginnerSummary = "Kiddush is a blessing said over wine."
/// ```
pub fn parse_job(text: &str) -> Result<Job, JobError> {
    let file: JobFile = toml::from_str(text)?;
    let layout = file.layout.into_layout()?;

    let mut records = Vec::with_capacity(file.records.len());
    for (id, value) in file.records {
        if id.trim().is_empty() {
            return Err(JobError::EmptyRecordId);
        }
        let toml::Value::Table(table) = value else {
            return Err(JobError::NotATable(id));
        };
        if table.is_empty() {
            return Err(JobError::NoFields(id));
        }
        let mut payload = ContentPayload::new();
        for (field, text) in table {
            let toml::Value::String(text) = text else {
                return Err(JobError::NotText { record: id, field });
            };
            payload = payload.with_field(field, text);
        }
        records.push((id, payload));
    }

    Ok(Job { layout, records })
}

/// Load a job file from disk.
pub fn load_job(path: &Path) -> Result<Job, JobError> {
    if !path.is_file() {
        return Err(JobError::Missing(path.display().to_string()));
    }
    let text = fs::read_to_string(path)?;
    parse_job(&text)
}

/// Record ids that appear in the job more than once, in first-seen order.
/// TOML already rejects duplicate keys, so this only matters for jobs built
/// in code.
pub fn duplicate_ids(job: &Job) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();
    for (id, _) in &job.records {
        if !seen.insert(id.as_str()) && !dups.contains(&id.as_str()) {
            dups.push(id.as_str());
        }
    }
    dups
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const JOB: &str = r#"
[records.shabbat-candles]
beginnerSummary = "On Friday evening, Jews light candles to welcome Shabbat."
beginnerWhy = "It's one of the most beautiful Jewish rituals."
beginnerHow = 'Say the blessing: "Thank you God for the mitzvah of Shabbat candles".'

[records.kiddush-guide]
beginnerSummary = "Kiddush is a blessing said over wine or grape juice."
"#;

    #[test]
    fn parses_records_in_file_order() {
        let job = parse_job(JOB).unwrap();
        let ids: Vec<&str> = job.payloads().map(|(id, _)| id).collect();
        assert_eq!(ids, ["shabbat-candles", "kiddush-guide"]);

        let fields: Vec<&str> = job.records[0].1.fields().map(|(n, _)| n).collect();
        assert_eq!(fields, ["beginnerSummary", "beginnerWhy", "beginnerHow"]);
        assert_eq!(job.layout, RecordLayout::default());
    }

    #[test]
    fn layout_overrides() {
        let job = parse_job(
            r#"
[layout]
end_field = "title"
follower_field = ""
quote = '"'

[records.a]
note = "x"
"#,
        )
        .unwrap();
        assert_eq!(job.layout.end_field, "title");
        assert_eq!(job.layout.follower_field, None);
        assert_eq!(job.layout.quote, '"');
        assert_eq!(job.layout.id_field, "id");
    }

    #[test]
    fn rejects_malformed_records() {
        assert!(matches!(
            parse_job("[records]\na = 'flat'"),
            Err(JobError::NotATable(id)) if id == "a"
        ));
        assert!(matches!(
            parse_job("[records.a]\ncount = 3"),
            Err(JobError::NotText { .. })
        ));
        assert!(matches!(
            parse_job("[records.a]\n"),
            Err(JobError::NoFields(_))
        ));
        assert!(matches!(
            parse_job("[records.\"\"]\nx = 'y'"),
            Err(JobError::EmptyRecordId)
        ));
        assert!(matches!(
            parse_job("[layout]\nquote = \"''\""),
            Err(JobError::BadQuote(_))
        ));
        assert!(matches!(
            parse_job("[layuot]\nquote = \"'\""),
            Err(JobError::Parse(_))
        ));
    }

    #[test]
    fn load_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(JOB.as_bytes()).unwrap();
        let job = load_job(file.path()).unwrap();
        assert_eq!(job.records.len(), 2);

        let missing = file.path().with_extension("absent");
        assert!(matches!(load_job(&missing), Err(JobError::Missing(_))));
    }

    #[test]
    fn finds_duplicate_ids() {
        let p = ContentPayload::new().with_field("a", "b");
        let job = Job {
            layout: RecordLayout::default(),
            records: vec![
                ("x".into(), p.clone()),
                ("y".into(), p.clone()),
                ("x".into(), p.clone()),
                ("x".into(), p),
            ],
        };
        assert_eq!(duplicate_ids(&job), ["x"]);
    }
}
