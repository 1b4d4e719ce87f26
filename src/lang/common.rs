//! Shared front-end contracts.

use crate::core::errors::Result;
use crate::core::tree::FunctionUnit;

/// A parser turning source text into neutral function trees.
///
/// A front-end owns the bucketing of source constructs into node kinds,
/// positional children and named child groups, and must attach byte spans
/// to every node that can anchor a clone record. The core never touches
/// source text again after this step.
pub trait TreeFrontend {
    /// Language name used in logs and diagnostics.
    fn language(&self) -> &'static str;

    /// Extract one [`FunctionUnit`] per function or method in `source`.
    ///
    /// Fails on unparseable source; the caller records the failure as a
    /// per-file diagnostic and moves on.
    fn parse_source(&mut self, source: &str, file: &str) -> Result<Vec<FunctionUnit>>;
}
