//! Token-cost comparison between the baseline and compact serializations.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::encoding::{FormatLabel, JsonEncoder, ValueEncoder};
use crate::error::Result;
use crate::tokenizer::TokenCounter;
use crate::toon::ToonEncoder;

/// Outcome of one comparison.
///
/// `delta = baseline_tokens - compact_tokens`; a positive delta means the
/// compact form is cheaper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub delta: i64,
    pub compact_text: String,
    pub baseline_tokens: usize,
    pub compact_tokens: usize,
}

impl ComparisonResult {
    /// Compact wins only when it is strictly cheaper; a tie keeps the baseline.
    pub fn prefers_compact(&self) -> bool {
        self.delta > 0
    }

    pub fn chosen_label(&self) -> FormatLabel {
        if self.prefers_compact() {
            FormatLabel::Toon
        } else {
            FormatLabel::Json
        }
    }
}

/// Runs both encoders on a value and counts their output with one tokenizer.
pub struct Comparator<'a> {
    counter: &'a dyn TokenCounter,
    compact: &'a dyn ValueEncoder,
    baseline: &'a dyn ValueEncoder,
}

impl<'a> Comparator<'a> {
    /// Default encoders: TOON as compact, JSON as baseline.
    pub fn new(counter: &'a dyn TokenCounter) -> Self {
        static TOON: ToonEncoder = ToonEncoder::DEFAULT;
        Self::with_encoders(counter, &TOON, &JsonEncoder)
    }

    pub fn with_encoders(
        counter: &'a dyn TokenCounter,
        compact: &'a dyn ValueEncoder,
        baseline: &'a dyn ValueEncoder,
    ) -> Self {
        Self {
            counter,
            compact,
            baseline,
        }
    }

    /// Compare the compact encoding of `value` with its re-encoded baseline.
    pub fn compare(&self, value: &Value) -> Result<ComparisonResult> {
        let compact_text = self.compact.encode(value)?;
        let baseline_text = self.baseline.encode(value)?;
        self.measure(compact_text, &baseline_text)
    }

    /// Like [`compare`](Self::compare), but counts `source_text` as the
    /// baseline instead of re-encoding. `source_text` must be the text
    /// `value` was decoded from.
    pub fn compare_with_source(&self, value: &Value, source_text: &str) -> Result<ComparisonResult> {
        let compact_text = self.compact.encode(value)?;
        self.measure(compact_text, source_text)
    }

    /// Baseline serialization of `value`, as counted by [`compare`](Self::compare).
    pub fn encode_baseline(&self, value: &Value) -> Result<String> {
        self.baseline.encode(value)
    }

    fn measure(&self, compact_text: String, baseline_text: &str) -> Result<ComparisonResult> {
        let compact_tokens = self.counter.count(&compact_text)?;
        let baseline_tokens = self.counter.count(baseline_text)?;
        let delta = baseline_tokens as i64 - compact_tokens as i64;
        debug!(
            baseline = %self.baseline.label(),
            compact = %self.compact.label(),
            baseline_tokens,
            compact_tokens,
            delta,
            "measured token cost"
        );
        Ok(ComparisonResult {
            delta,
            compact_text,
            baseline_tokens,
            compact_tokens,
        })
    }
}
