//! Function preparation pipeline.
//!
//! Runs the fixed pass order over a freshly parsed function: parameter
//! canonicalization, scope collection, weighting, hashing. The bundle type
//! exists so downstream code can never observe a function with the passes
//! half-applied or out of order.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::core::canonicalize::canonicalize_parameters;
use crate::core::errors::Result;
use crate::core::hashing::{dump_function, hash_tree, HashMode, TreeHashes};
use crate::core::metrics::{weigh_tree, TreeMetrics};
use crate::core::scopes::{collect_scopes, ScopeTable};
use crate::core::tree::FunctionUnit;

/// A function with every analysis pass applied.
#[derive(Debug)]
pub struct PreparedFunction {
    /// The canonicalized tree.
    pub unit: FunctionUnit,
    /// Block-local scope of every node.
    pub scopes: ScopeTable,
    /// Weight and depth of every node.
    pub metrics: TreeMetrics,
    /// Literal, index and usage hashes of every node.
    pub hashes: TreeHashes,
}

impl PreparedFunction {
    /// Human-readable canonical rendering of the function body.
    pub fn dump(&self, mode: HashMode) -> Result<String> {
        dump_function(&self.unit, &self.scopes, &self.metrics, &self.hashes, mode)
    }
}

/// Run all passes over one function. Fails only on malformed trees; the
/// caller decides whether that drops the function or aborts the run.
pub fn prepare(mut unit: FunctionUnit) -> Result<PreparedFunction> {
    canonicalize_parameters(&mut unit);
    let scopes = collect_scopes(&unit);
    let metrics = weigh_tree(&unit);
    let hashes = hash_tree(&unit, &scopes, &metrics)?;
    debug!(
        function = %unit.qualified_name(),
        nodes = unit.node_count(),
        "prepared function"
    );
    Ok(PreparedFunction {
        unit,
        scopes,
        metrics,
        hashes,
    })
}

/// Prepare a whole corpus in parallel, keeping the input order. Functions
/// whose trees turn out malformed are dropped with a warning and reported
/// back as diagnostics instead of failing the run.
pub fn prepare_corpus(units: Vec<FunctionUnit>) -> (Vec<PreparedFunction>, Vec<String>) {
    let outcomes: Vec<std::result::Result<PreparedFunction, String>> = units
        .into_par_iter()
        .map(|unit| {
            let name = unit.qualified_name();
            prepare(unit).map_err(|err| format!("{name}: {err}"))
        })
        .collect();

    let mut prepared = Vec::with_capacity(outcomes.len());
    let mut diagnostics = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(function) => prepared.push(function),
            Err(message) => {
                warn!("skipping function: {message}");
                diagnostics.push(message);
            }
        }
    }
    (prepared, diagnostics)
}
