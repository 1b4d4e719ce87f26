//! Copy-paste detection over Python source trees.
//!
//! The detector wires the whole run together: discover files, parse them
//! into neutral trees, push every function through the preparation passes,
//! then compare all pairs and rank what the finder reports.

pub mod finder;
pub mod matcher;
pub mod records;

pub use finder::CloneFinder;
pub use matcher::{find_matching_runs, MatchRun};
pub use records::{AnalysisStats, CloneAnalysis, CloneRecord, FunctionRef};

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use crate::core::config::DraupnirConfig;
use crate::core::errors::Result;
use crate::core::prepare::{prepare_corpus, PreparedFunction};
use crate::core::tree::FunctionUnit;
use crate::io::walk::discover_files;
use crate::lang::common::TreeFrontend;
use crate::lang::python::PythonFrontend;

/// End-to-end clone detection over a set of root paths.
pub struct CloneDetector {
    config: DraupnirConfig,
}

impl CloneDetector {
    /// Build a detector, validating the configuration eagerly.
    pub fn new(config: DraupnirConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this detector runs with.
    pub fn config(&self) -> &DraupnirConfig {
        &self.config
    }

    /// Scan the given roots and report every clone found.
    pub fn analyze_paths(&self, roots: &[PathBuf]) -> Result<CloneAnalysis> {
        let started = Instant::now();
        let files = discover_files(roots, &self.config.files)?;
        info!(files = files.len(), "discovered source files");

        let mut frontend = PythonFrontend::new()?;
        let mut units = Vec::new();
        let mut diagnostics = Vec::new();
        let mut files_analyzed = 0usize;
        for file in &files {
            let display_path = file.display().to_string();
            let source = match std::fs::read_to_string(file) {
                Ok(source) => source,
                Err(err) => {
                    warn!("skipping {display_path}: {err}");
                    diagnostics.push(format!("{display_path}: {err}"));
                    continue;
                }
            };
            match frontend.parse_source(&source, &display_path) {
                Ok(parsed) => {
                    units.extend(parsed);
                    files_analyzed += 1;
                }
                Err(err) => {
                    warn!("skipping {display_path}: {err}");
                    diagnostics.push(format!("{display_path}: {err}"));
                }
            }
        }

        let mut analysis = self.analyze_units(units, diagnostics);
        analysis.stats.files_analyzed = files_analyzed;
        info!(
            functions = analysis.stats.functions_analyzed,
            clones = analysis.stats.clones_found,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );
        Ok(analysis)
    }

    /// Run preparation and comparison over already-parsed functions.
    pub fn analyze_units(
        &self,
        units: Vec<FunctionUnit>,
        mut diagnostics: Vec<String>,
    ) -> CloneAnalysis {
        let (prepared, prepare_diagnostics) = prepare_corpus(units);
        diagnostics.extend(prepare_diagnostics);
        self.analyze_prepared(prepared, diagnostics)
    }

    fn analyze_prepared(
        &self,
        functions: Vec<PreparedFunction>,
        diagnostics: Vec<String>,
    ) -> CloneAnalysis {
        let finder = CloneFinder::new(&self.config.detection);
        let (records, truncated) = finder.find_all(&functions);
        let stats = AnalysisStats {
            files_analyzed: 0,
            functions_analyzed: functions.len(),
            pairs_compared: functions.len() * functions.len().saturating_sub(1) / 2,
            clones_found: records.len(),
        };
        CloneAnalysis::new(records, stats, diagnostics, truncated, self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DraupnirConfig;

    fn detector() -> CloneDetector {
        CloneDetector::new(DraupnirConfig::default()).unwrap()
    }

    fn parse(source: &str, file: &str) -> Vec<FunctionUnit> {
        let mut frontend = PythonFrontend::new().unwrap();
        frontend.parse_source(source, file).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let mut config = DraupnirConfig::default();
        config.detection.min_run_length = 0;
        assert!(CloneDetector::new(config).is_err());
    }

    #[test]
    fn renamed_copies_are_reported_across_units() {
        let mut units = parse(
            "def build_a(size):\n    out = []\n    n = size\n    return out\n",
            "a.py",
        );
        units.extend(parse(
            "def build_b(count):\n    result = []\n    m = count\n    return result\n",
            "b.py",
        ));
        let analysis = detector().analyze_units(units, Vec::new());
        assert_eq!(analysis.stats.functions_analyzed, 2);
        assert_eq!(analysis.stats.pairs_compared, 1);
        assert_eq!(analysis.records.len(), 1);
        assert_eq!(analysis.records[0].run_length, 3);
        assert!(!analysis.truncated);
    }

    #[test]
    fn diagnostics_pass_through_to_the_analysis() {
        let analysis = detector().analyze_units(Vec::new(), vec!["a.py: syntax error".into()]);
        assert_eq!(analysis.diagnostics, vec!["a.py: syntax error"]);
        assert!(analysis.is_clean());
    }
}
