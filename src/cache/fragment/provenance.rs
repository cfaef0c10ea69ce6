use std::sync::Arc;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc2822;

/// Source of "now" for provenance timestamps.
pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(OffsetDateTime::now_utc)
}

/// Who generated a fragment, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub name: String,
    pub fragment_type: &'static str,
    pub generated_at: OffsetDateTime,
}

impl Provenance {
    pub fn new(name: impl Into<String>, fragment_type: &'static str, generated_at: OffsetDateTime) -> Self {
        Self {
            name: name.into(),
            fragment_type,
            generated_at,
        }
    }

    /// HTML comment appended to the stored markup.
    pub fn comment(&self) -> String {
        // Out-of-range years cannot be rendered as RFC 2822; fall back to the unix timestamp.
        let timestamp = self
            .generated_at
            .format(&Rfc2822)
            .unwrap_or_else(|_| self.generated_at.unix_timestamp().to_string());
        format!(
            "<!-- {} {} cached on {} -->",
            escape_html(&self.name),
            escape_html(self.fragment_type),
            timestamp
        )
    }
}

/// Rendered output together with its provenance marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRecord {
    pub output: String,
    pub provenance_comment: String,
}

impl FragmentRecord {
    pub fn new(output: String, provenance: &Provenance) -> Self {
        Self {
            output,
            provenance_comment: provenance.comment(),
        }
    }

    /// The markup exactly as stored and served on later hits.
    pub fn markup(&self) -> String {
        let mut markup = String::with_capacity(self.output.len() + self.provenance_comment.len());
        markup.push_str(&self.output);
        markup.push_str(&self.provenance_comment);
        markup
    }
}

pub(crate) fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
