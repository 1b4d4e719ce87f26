//! Clone record and analysis result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::config::DraupnirConfig;
use crate::core::tree::SourceSpan;

/// Where a clone record's matched function lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRef {
    /// Function or method name
    pub name: String,
    /// Path of the file the function was parsed from
    pub file: String,
}

impl FunctionRef {
    /// `file::name`, the display form used in reports and logs.
    pub fn qualified(&self) -> String {
        format!("{}::{}", self.file, self.name)
    }
}

/// One detected run of duplicated statements between two functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneRecord {
    /// Function contributing the first side of the run
    pub function_a: FunctionRef,
    /// Function contributing the second side of the run
    pub function_b: FunctionRef,
    /// Span of the first matched statement on the A side
    pub anchor_a: SourceSpan,
    /// Span of the first matched statement on the B side
    pub anchor_b: SourceSpan,
    /// Span covering every matched statement on the A side
    pub span_a: SourceSpan,
    /// Span covering every matched statement on the B side
    pub span_b: SourceSpan,
    /// Number of consecutive matched statements
    pub run_length: usize,
    /// Sum of the matched A-side statement weights
    pub total_weight: u64,
}

impl CloneRecord {
    /// Start a record from the first matched statement pair. The anchor
    /// statement's weight seeds `total_weight`; later statements fold in
    /// through [`CloneRecord::fold_matched`].
    pub fn anchored(
        function_a: FunctionRef,
        function_b: FunctionRef,
        anchor_a: SourceSpan,
        anchor_b: SourceSpan,
        run_length: usize,
        anchor_weight: u64,
    ) -> Self {
        Self {
            function_a,
            function_b,
            anchor_a,
            anchor_b,
            span_a: anchor_a,
            span_b: anchor_b,
            run_length,
            total_weight: anchor_weight,
        }
    }

    /// Fold one more matched statement pair into the record.
    pub fn fold_matched(&mut self, weight: u64, span_a: SourceSpan, span_b: SourceSpan) {
        self.total_weight += weight;
        self.span_a = self.span_a.widen(span_a);
        self.span_b = self.span_b.widen(span_b);
    }

    /// Compound ranking score: run length dominates, weight breaks ties.
    pub fn score(&self) -> u64 {
        self.run_length as u64 * 100 + self.total_weight
    }
}

/// Corpus-level counters for the report header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Files that parsed successfully
    pub files_analyzed: usize,
    /// Functions that survived preparation
    pub functions_analyzed: usize,
    /// Function pairs the finder compared
    pub pairs_compared: usize,
    /// Records surviving filtering
    pub clones_found: usize,
}

/// Full result of one detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneAnalysis {
    /// Detected clones, ranked
    pub records: Vec<CloneRecord>,
    /// Corpus counters
    pub stats: AnalysisStats,
    /// Per-file parse and preparation failures, in discovery order
    pub diagnostics: Vec<String>,
    /// True when the deadline cut the comparison phase short
    pub truncated: bool,
    /// When the run finished
    pub generated_at: DateTime<Utc>,
    /// Engine version that produced the report
    pub engine_version: String,
    /// Configuration the run used
    pub config: DraupnirConfig,
}

impl CloneAnalysis {
    /// Assemble a result, stamping time and version.
    pub fn new(
        records: Vec<CloneRecord>,
        stats: AnalysisStats,
        diagnostics: Vec<String>,
        truncated: bool,
        config: DraupnirConfig,
    ) -> Self {
        Self {
            records,
            stats,
            diagnostics,
            truncated,
            generated_at: Utc::now(),
            engine_version: crate::VERSION.to_string(),
            config,
        }
    }

    /// True when no clones survived filtering.
    pub fn is_clean(&self) -> bool {
        self.records.is_empty()
    }
}
