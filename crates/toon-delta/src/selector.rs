//! Batch policy: compare every accepted input, pick a format per input,
//! and collect a report line plus a payload entry.
//!
//! A failing input only costs its own report line; the batch always runs to
//! the end.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::comparator::Comparator;
use crate::encoding::FormatLabel;
use crate::error::{DeltaError, Result};
use crate::tokenizer::TokenCounter;

/// Where an input's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Text(String),
    /// Read only once the input has passed the filter.
    File(PathBuf),
}

impl ContentSource {
    /// Load the text. Invalid UTF-8 is replaced and a leading BOM dropped.
    pub fn load(&self) -> Result<Cow<'_, str>> {
        let text = match self {
            ContentSource::Text(text) => Cow::Borrowed(text.as_str()),
            ContentSource::File(path) => {
                let bytes = std::fs::read(path).map_err(|source| DeltaError::Read {
                    path: path.clone(),
                    source,
                })?;
                Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
            }
        };
        Ok(match text {
            Cow::Borrowed(s) => Cow::Borrowed(s.strip_prefix('\u{feff}').unwrap_or(s)),
            Cow::Owned(s) => match s.strip_prefix('\u{feff}') {
                Some(rest) => Cow::Owned(rest.to_string()),
                None => Cow::Owned(s),
            },
        })
    }
}

/// One input of a batch: a display name and its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedInput {
    pub name: String,
    pub content: ContentSource,
}

impl NamedInput {
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: ContentSource::Text(text.into()),
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            content: ContentSource::File(path.into()),
        }
    }
}

/// Case-insensitive file extension allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFilter {
    extensions: Vec<String>,
}

impl InputFilter {
    /// Extensions may be given with or without the leading dot.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn accepts(&self, name: &str) -> bool {
        match name.rsplit_once('.') {
            Some((_, ext)) => self
                .extensions
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}

impl Default for InputFilter {
    fn default() -> Self {
        Self::new(["json"])
    }
}

/// Text forwarded when the baseline format wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaselinePayload {
    /// The input's own text.
    #[default]
    Source,
    /// The baseline encoder's output.
    Reencoded,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorConfig {
    pub filter: InputFilter,
    pub baseline_payload: BaselinePayload,
}

/// Result of one processed input, for presentation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    Selected { delta: i64, format: FormatLabel },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub display_name: String,
    #[serde(flatten)]
    pub outcome: ReportOutcome,
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            ReportOutcome::Selected { delta, format } => write!(
                f,
                "- {}: delta = {} (format {})",
                self.display_name, delta, format
            ),
            ReportOutcome::Failed { message } => write!(
                f,
                "- {}: error calculating delta ({})",
                self.display_name, message
            ),
        }
    }
}

/// Content chosen for forwarding to the model, already trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadEntry {
    pub name: String,
    pub label: FormatLabel,
    pub content: String,
}

impl PayloadEntry {
    /// The entry framed as a user message: a header line and a fenced block.
    pub fn to_message(&self) -> String {
        format!(
            "File content {} ({}):\n\n```\n{}\n```",
            self.name, self.label, self.content
        )
    }

    pub fn summary_line(&self) -> String {
        format!("- {} ({})", self.name, self.label)
    }
}

/// Everything a batch produced, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BatchOutcome {
    pub reports: Vec<FileReport>,
    pub payload: Vec<PayloadEntry>,
}

impl BatchOutcome {
    /// Report block, or `None` when nothing was processed.
    pub fn render_report(&self) -> Option<String> {
        if self.reports.is_empty() {
            return None;
        }
        let lines: Vec<String> = self.reports.iter().map(ToString::to_string).collect();
        Some(format!("**Delta TOON vs JSON**\n{}\n\n", lines.join("\n")))
    }

    /// Listing of forwarded files, or `None` when nothing is forwarded.
    pub fn render_payload_summary(&self) -> Option<String> {
        if self.payload.is_empty() {
            return None;
        }
        let mut out = String::from("**Files sent to the LLM**\n");
        for entry in &self.payload {
            out.push_str(&entry.summary_line());
            out.push('\n');
        }
        out.push('\n');
        Some(out)
    }

    pub fn messages(&self) -> Vec<String> {
        self.payload.iter().map(PayloadEntry::to_message).collect()
    }

    pub fn failures(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, ReportOutcome::Failed { .. }))
            .count()
    }
}

/// Parse an input's text as a single JSON value.
pub fn parse_input(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Applies the selection rule across a batch of inputs.
pub struct Selector<'a> {
    comparator: Comparator<'a>,
    config: SelectorConfig,
}

impl<'a> Selector<'a> {
    pub fn new(counter: &'a dyn TokenCounter, config: SelectorConfig) -> Self {
        Self::with_comparator(Comparator::new(counter), config)
    }

    pub fn with_comparator(comparator: Comparator<'a>, config: SelectorConfig) -> Self {
        Self { comparator, config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Process `inputs` in order. Filtered-out inputs leave no trace; every
    /// other input yields exactly one report line and, on success, one
    /// payload entry.
    pub fn run<I>(&self, inputs: I) -> BatchOutcome
    where
        I: IntoIterator<Item = NamedInput>,
    {
        let mut outcome = BatchOutcome::default();
        for input in inputs {
            if !self.config.filter.accepts(&input.name) {
                debug!(name = %input.name, "skipping input with unaccepted extension");
                continue;
            }
            match self.select(&input) {
                Ok((delta, entry)) => {
                    debug!(name = %input.name, delta, format = %entry.label, "selected format");
                    outcome.reports.push(FileReport {
                        display_name: input.name,
                        outcome: ReportOutcome::Selected {
                            delta,
                            format: entry.label,
                        },
                    });
                    outcome.payload.push(entry);
                }
                Err(err) => {
                    warn!(name = %input.name, error = %err, "could not compare input");
                    outcome.reports.push(FileReport {
                        display_name: input.name,
                        outcome: ReportOutcome::Failed {
                            message: err.to_string(),
                        },
                    });
                }
            }
        }
        outcome
    }

    fn select(&self, input: &NamedInput) -> Result<(i64, PayloadEntry)> {
        let text = input.content.load()?;
        let value = parse_input(&text)?;
        let result = self.comparator.compare(&value)?;
        let label = result.chosen_label();

        let content = match (label, self.config.baseline_payload) {
            (FormatLabel::Toon, _) => result.compact_text.trim().to_string(),
            (FormatLabel::Json, BaselinePayload::Source) => text.trim().to_string(),
            (FormatLabel::Json, BaselinePayload::Reencoded) => {
                self.comparator.encode_baseline(&value)?.trim().to_string()
            }
        };

        Ok((
            result.delta,
            PayloadEntry {
                name: input.name.clone(),
                label,
                content,
            },
        ))
    }
}
