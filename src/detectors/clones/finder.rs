//! Pairwise clone finder over prepared functions.
//!
//! Compares every unordered function pair, walking sibling statement lists
//! at matching nesting levels. Matching stays restricted to sibling lists
//! because duplication is a phenomenon of contiguous statement runs, not
//! of isolated expressions. Pairs are independent, so they shard across
//! rayon workers; the merge keeps pair order, which keeps output
//! deterministic.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::core::config::DetectionConfig;
use crate::core::prepare::PreparedFunction;
use crate::core::tree::NodeId;
use crate::detectors::clones::matcher::find_matching_runs;
use crate::detectors::clones::records::{CloneRecord, FunctionRef};

/// Record identity within one function pair; used to drop duplicates when
/// the nested-block recursion reaches the same sibling lists through two
/// different paths.
type RecordKey = (usize, usize, usize, usize, usize);

/// Clone finder configured with detection thresholds.
pub struct CloneFinder<'a> {
    config: &'a DetectionConfig,
}

impl<'a> CloneFinder<'a> {
    /// New finder over the given thresholds.
    pub fn new(config: &'a DetectionConfig) -> Self {
        Self { config }
    }

    /// Compare every unordered pair of functions, in input order, and
    /// return the filtered, ranked records. The second value is true when
    /// the deadline expired and later pairs were skipped.
    pub fn find_all(&self, functions: &[PreparedFunction]) -> (Vec<CloneRecord>, bool) {
        let deadline = self
            .config
            .deadline_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));

        let pairs: Vec<(usize, usize)> = (0..functions.len())
            .flat_map(|a| (a + 1..functions.len()).map(move |b| (a, b)))
            .collect();
        debug!(pairs = pairs.len(), "comparing function pairs");

        let outcomes: Vec<(Vec<CloneRecord>, bool)> = pairs
            .par_iter()
            .map(|&(a, b)| {
                // Deadline is only consulted between pairs; one pair's
                // cost is bounded, so mid-pair cancellation buys nothing.
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    return (Vec::new(), true);
                }
                (self.compare_pair(&functions[a], &functions[b]), false)
            })
            .collect();

        let mut records = Vec::new();
        let mut truncated = false;
        for (mut pair_records, skipped) in outcomes {
            truncated |= skipped;
            records.append(&mut pair_records);
        }
        if truncated {
            warn!(
                deadline_secs = self.config.deadline_secs,
                "comparison deadline expired; result is truncated"
            );
        }

        records.retain(|record| {
            record.run_length >= self.config.min_run_length
                && record.total_weight >= self.config.min_clone_weight
        });
        records.sort_by(|x, y| {
            y.score()
                .cmp(&x.score())
                .then_with(|| x.function_a.file.cmp(&y.function_a.file))
                .then_with(|| x.function_a.name.cmp(&y.function_a.name))
                .then_with(|| x.function_b.file.cmp(&y.function_b.file))
                .then_with(|| x.function_b.name.cmp(&y.function_b.name))
                .then_with(|| x.anchor_a.start.cmp(&y.anchor_a.start))
                .then_with(|| x.anchor_b.start.cmp(&y.anchor_b.start))
        });
        (records, truncated)
    }

    fn compare_pair(&self, fa: &PreparedFunction, fb: &PreparedFunction) -> Vec<CloneRecord> {
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        self.compare_lists(
            fa,
            fb,
            fa.unit.body(),
            fb.unit.body(),
            &mut records,
            &mut seen,
        );
        records
    }

    /// Match two sibling statement lists, then descend into nested blocks
    /// on both sides. The B-side descent is depth-gated: a nested block of
    /// `b` is only worth visiting when `b` is at least as deep as some
    /// statement in `a_list`, which prunes re-exploring the same subtree
    /// pair from both directions. Statements consumed by a materialized
    /// run do not recurse: equal usage hashes certify their whole
    /// subtrees already match, so descending would re-report the interior
    /// of an already-recorded clone one level down.
    fn compare_lists(
        &self,
        fa: &PreparedFunction,
        fb: &PreparedFunction,
        a_list: &[NodeId],
        b_list: &[NodeId],
        records: &mut Vec<CloneRecord>,
        seen: &mut HashSet<RecordKey>,
    ) {
        let runs = find_matching_runs(a_list, b_list, |&a, &b| {
            fa.hashes.usage(a) == fb.hashes.usage(b)
        });
        let mut consumed_a = HashSet::new();
        let mut consumed_b = HashSet::new();
        for run in runs {
            if run.len < 2 {
                continue;
            }
            consumed_a.extend(run.start_a..run.start_a + run.len);
            consumed_b.extend(run.start_b..run.start_b + run.len);
            let record = self.materialize(fa, fb, a_list, b_list, run.start_a, run.start_b, run.len);
            let key = (
                record.anchor_a.start,
                record.anchor_a.end,
                record.anchor_b.start,
                record.anchor_b.end,
                record.run_length,
            );
            if seen.insert(key) {
                records.push(record);
            }
        }

        let min_a_depth = a_list.iter().map(|&a| fa.metrics.depth(a)).min();
        if let Some(min_a_depth) = min_a_depth {
            for (idx, &b) in b_list.iter().enumerate() {
                if consumed_b.contains(&idx) || fb.metrics.depth(b) < min_a_depth {
                    continue;
                }
                if let Some(block) = fb.unit.node(b).block() {
                    self.compare_lists(fa, fb, a_list, block, records, seen);
                }
            }
        }
        for (idx, &a) in a_list.iter().enumerate() {
            if consumed_a.contains(&idx) {
                continue;
            }
            if let Some(block) = fa.unit.node(a).block() {
                self.compare_lists(fa, fb, block, b_list, records, seen);
            }
        }
    }

    fn materialize(
        &self,
        fa: &PreparedFunction,
        fb: &PreparedFunction,
        a_list: &[NodeId],
        b_list: &[NodeId],
        start_a: usize,
        start_b: usize,
        len: usize,
    ) -> CloneRecord {
        let head_a = a_list[start_a];
        let head_b = b_list[start_b];
        let mut record = CloneRecord::anchored(
            FunctionRef {
                name: fa.unit.name.clone(),
                file: fa.unit.file.clone(),
            },
            FunctionRef {
                name: fb.unit.name.clone(),
                file: fb.unit.file.clone(),
            },
            fa.unit.node(head_a).span,
            fb.unit.node(head_b).span,
            len,
            fa.metrics.weight(head_a),
        );
        for offset in 1..len {
            let a = a_list[start_a + offset];
            let b = b_list[start_b + offset];
            record.fold_matched(
                fa.metrics.weight(a),
                fa.unit.node(a).span,
                fb.unit.node(b).span,
            );
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::prepare::prepare;
    use crate::core::tree::{FunctionUnit, Node, NodeKind, Role, SourceSpan};

    fn assign_stmt(unit: &mut FunctionUnit, target: &str, value: &str, span: SourceSpan) -> NodeId {
        let value = unit.add_node(Node::new(NodeKind::Num, span).with_identifier(value));
        let target = unit.add_node(Node::new(NodeKind::Ident, span).with_identifier(target));
        unit.add_node(
            Node::new(NodeKind::Assign, span)
                .with_role(Role::Value, vec![value])
                .with_arg(target),
        )
    }

    /// Flat function of `target = literal` statements, spans 10 bytes apart.
    fn flat_unit(name: &str, file: &str, stmts: &[(&str, &str)]) -> PreparedFunction {
        let mut unit = FunctionUnit::new(name, file, SourceSpan::new(0, stmts.len() * 10));
        for (i, (target, value)) in stmts.iter().enumerate() {
            let span = SourceSpan::new(i * 10, i * 10 + 5);
            let stmt = assign_stmt(&mut unit, target, value, span);
            unit.push_statement(stmt);
        }
        prepare(unit).unwrap()
    }

    /// Function whose single statement is a while loop wrapping `stmts`.
    fn looped_unit(name: &str, file: &str, stmts: &[(&str, &str)]) -> PreparedFunction {
        let mut unit = FunctionUnit::new(name, file, SourceSpan::new(0, 100));
        let mut block = Vec::new();
        for (i, (target, value)) in stmts.iter().enumerate() {
            let span = SourceSpan::new(20 + i * 10, 20 + i * 10 + 5);
            block.push(assign_stmt(&mut unit, target, value, span));
        }
        let test = unit.add_node(
            Node::new(NodeKind::Ident, SourceSpan::new(6, 10)).with_identifier("cond"),
        );
        let while_loop = unit.add_node(
            Node::new(NodeKind::While, SourceSpan::new(0, 90))
                .with_role(Role::Test, vec![test])
                .with_role(Role::Block, block),
        );
        unit.push_statement(while_loop);
        prepare(unit).unwrap()
    }

    /// Function whose single statement is a while loop wrapping another
    /// while loop wrapping `stmts`.
    fn double_looped_unit(name: &str, file: &str, stmts: &[(&str, &str)]) -> PreparedFunction {
        let mut unit = FunctionUnit::new(name, file, SourceSpan::new(0, 200));
        let mut block = Vec::new();
        for (i, (target, value)) in stmts.iter().enumerate() {
            let span = SourceSpan::new(40 + i * 10, 40 + i * 10 + 5);
            block.push(assign_stmt(&mut unit, target, value, span));
        }
        let inner_test = unit.add_node(
            Node::new(NodeKind::Ident, SourceSpan::new(26, 30)).with_identifier("inner"),
        );
        let inner = unit.add_node(
            Node::new(NodeKind::While, SourceSpan::new(20, 120))
                .with_role(Role::Test, vec![inner_test])
                .with_role(Role::Block, block),
        );
        let outer_test = unit.add_node(
            Node::new(NodeKind::Ident, SourceSpan::new(6, 10)).with_identifier("outer"),
        );
        let outer = unit.add_node(
            Node::new(NodeKind::While, SourceSpan::new(0, 150))
                .with_role(Role::Test, vec![outer_test])
                .with_role(Role::Block, vec![inner]),
        );
        unit.push_statement(outer);
        prepare(unit).unwrap()
    }

    /// Function of flat `lead` assignments followed by a while loop
    /// wrapping `body` assignments.
    fn lead_and_loop_unit(
        name: &str,
        file: &str,
        lead: &[(&str, &str)],
        body: &[(&str, &str)],
    ) -> PreparedFunction {
        let mut unit = FunctionUnit::new(name, file, SourceSpan::new(0, 200));
        for (i, (target, value)) in lead.iter().enumerate() {
            let span = SourceSpan::new(i * 10, i * 10 + 5);
            let stmt = assign_stmt(&mut unit, target, value, span);
            unit.push_statement(stmt);
        }
        let base = lead.len() * 10;
        let mut block = Vec::new();
        for (i, (target, value)) in body.iter().enumerate() {
            let span = SourceSpan::new(base + 20 + i * 10, base + 25 + i * 10);
            block.push(assign_stmt(&mut unit, target, value, span));
        }
        let test = unit.add_node(
            Node::new(NodeKind::Ident, SourceSpan::new(base + 6, base + 10))
                .with_identifier("cond"),
        );
        let while_loop = unit.add_node(
            Node::new(NodeKind::While, SourceSpan::new(base, base + 90))
                .with_role(Role::Test, vec![test])
                .with_role(Role::Block, block),
        );
        unit.push_statement(while_loop);
        prepare(unit).unwrap()
    }

    fn find(config: &DetectionConfig, functions: &[PreparedFunction]) -> Vec<CloneRecord> {
        CloneFinder::new(config).find_all(functions).0
    }

    #[test]
    fn renamed_flat_bodies_produce_one_full_record() {
        let fa = flat_unit("fa", "a.py", &[("a", "1"), ("b", "2"), ("c", "3")]);
        let fb = flat_unit("fb", "b.py", &[("x", "1"), ("y", "2"), ("z", "3")]);
        let records = find(&DetectionConfig::default(), &[fa, fb]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].run_length, 3);
        assert_eq!(records[0].total_weight, 36);
        assert_eq!(records[0].score(), 336);
        assert_eq!(records[0].anchor_a, SourceSpan::new(0, 5));
        assert_eq!(records[0].span_a, SourceSpan::new(0, 25));
    }

    #[test]
    fn below_weight_records_are_filtered() {
        let fa = flat_unit("fa", "a.py", &[("a", "1"), ("b", "2")]);
        let fb = flat_unit("fb", "b.py", &[("x", "1"), ("y", "2")]);
        let default = find(&DetectionConfig::default(), &[fa, fb]);
        assert_eq!(default.len(), 1);
        assert_eq!(default[0].total_weight, 24);

        let fa = flat_unit("fa", "a.py", &[("a", "1"), ("b", "2")]);
        let fb = flat_unit("fb", "b.py", &[("x", "1"), ("y", "2")]);
        let strict = DetectionConfig {
            min_clone_weight: 25,
            ..DetectionConfig::default()
        };
        assert!(find(&strict, &[fa, fb]).is_empty());
    }

    #[test]
    fn single_statement_runs_never_materialize() {
        let fa = flat_unit("fa", "a.py", &[("a", "1"), ("q", "7")]);
        let fb = flat_unit("fb", "b.py", &[("x", "1"), ("r", "9")]);
        let permissive = DetectionConfig {
            min_run_length: 1,
            min_clone_weight: 1,
            ..DetectionConfig::default()
        };
        assert!(find(&permissive, &[fa, fb]).is_empty());
    }

    #[test]
    fn nested_block_matches_a_flat_body() {
        let fa = looped_unit("fa", "a.py", &[("a", "1"), ("b", "2")]);
        let fb = flat_unit("fb", "b.py", &[("x", "1"), ("y", "2")]);
        let records = find(&DetectionConfig::default(), &[fa, fb]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].run_length, 2);
        assert_eq!(records[0].anchor_a, SourceSpan::new(20, 25));
        assert_eq!(records[0].anchor_b, SourceSpan::new(0, 5));
    }

    #[test]
    fn flat_body_matches_a_nested_block() {
        let fa = flat_unit("fa", "a.py", &[("a", "1"), ("b", "2")]);
        let fb = looped_unit("fb", "b.py", &[("x", "1"), ("y", "2")]);
        let records = find(&DetectionConfig::default(), &[fa, fb]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].anchor_a, SourceSpan::new(0, 5));
        assert_eq!(records[0].anchor_b, SourceSpan::new(20, 25));
    }

    #[test]
    fn twin_loops_report_their_blocks_once() {
        // Both recursion paths reach the (block, block) comparison; the
        // record must still come out once.
        let fa = looped_unit("fa", "a.py", &[("a", "1"), ("b", "2")]);
        let fb = looped_unit("fb", "b.py", &[("x", "1"), ("y", "2")]);
        let records = find(&DetectionConfig::default(), &[fa, fb]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].run_length, 2);
    }

    #[test]
    fn a_run_covering_a_loop_reports_the_loop_interior_only_once() {
        // The whiles match as part of the top-level run; their blocks
        // must not come back as a second nested record.
        let fa = lead_and_loop_unit(
            "fa",
            "a.py",
            &[("s", "1"), ("a", "2")],
            &[("t", "5"), ("u", "6")],
        );
        let fb = lead_and_loop_unit(
            "fb",
            "b.py",
            &[("p", "1"), ("q", "2")],
            &[("v", "5"), ("w", "6")],
        );
        let records = find(&DetectionConfig::default(), &[fa, fb]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].run_length, 3);
        assert_eq!(records[0].total_weight, 59);
        assert_eq!(records[0].anchor_a, SourceSpan::new(0, 5));
    }

    #[test]
    fn ranking_prefers_longer_runs_and_breaks_ties_by_file() {
        let f0 = flat_unit("f0", "a.py", &[("a", "1"), ("b", "2"), ("c", "3")]);
        let f1 = flat_unit("f1", "b.py", &[("x", "1"), ("y", "2"), ("q", "9")]);
        let f2 = flat_unit("f2", "c.py", &[("u", "1"), ("v", "2"), ("w", "3")]);
        let records = find(&DetectionConfig::default(), &[f0, f1, f2]);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].run_length, 3);
        assert_eq!(records[0].function_b.file, "c.py");
        assert_eq!(records[1].run_length, 2);
        assert_eq!(records[1].function_a.file, "a.py");
        assert_eq!(records[2].function_a.file, "b.py");
    }

    #[test]
    fn output_is_deterministic_across_runs() {
        let functions = vec![
            flat_unit("f0", "a.py", &[("a", "1"), ("b", "2"), ("c", "3")]),
            flat_unit("f1", "b.py", &[("x", "1"), ("y", "2"), ("z", "3")]),
            flat_unit("f2", "c.py", &[("u", "1"), ("v", "2"), ("w", "3")]),
        ];
        let config = DetectionConfig::default();
        let first = serde_json::to_string(&find(&config, &functions)).unwrap();
        let second = serde_json::to_string(&find(&config, &functions)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn generous_deadline_does_not_truncate() {
        let functions = vec![
            flat_unit("fa", "a.py", &[("a", "1"), ("b", "2")]),
            flat_unit("fb", "b.py", &[("x", "1"), ("y", "2")]),
        ];
        let config = DetectionConfig {
            deadline_secs: Some(3600),
            ..DetectionConfig::default()
        };
        let (records, truncated) = CloneFinder::new(&config).find_all(&functions);
        assert!(!truncated);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn expired_deadline_skips_pairs_and_reports_truncation() {
        let functions = vec![
            flat_unit("fa", "a.py", &[("a", "1"), ("b", "2")]),
            flat_unit("fb", "b.py", &[("x", "1"), ("y", "2")]),
        ];
        // Zero seconds is rejected by config validation but is the only
        // deterministic way to expire the clock, so drive the finder raw.
        let config = DetectionConfig {
            deadline_secs: Some(0),
            ..DetectionConfig::default()
        };
        let (records, truncated) = CloneFinder::new(&config).find_all(&functions);
        assert!(truncated);
        assert!(records.is_empty());
    }

    #[test]
    fn a_match_two_levels_down_is_reached_by_chained_recursion() {
        let functions = vec![
            flat_unit("fa", "a.py", &[("a", "1"), ("b", "2")]),
            double_looped_unit("fb", "b.py", &[("x", "1"), ("y", "2")]),
        ];
        let config = DetectionConfig::default();
        let records = find(&config, &functions);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].run_length, 2);
        assert_eq!(records[0].anchor_a, SourceSpan::new(0, 5));
        assert_eq!(records[0].anchor_b, SourceSpan::new(40, 45));
    }

    /// Reference comparer: identical materialization, dedup and
    /// run-consumption, but recursing into every block on both sides with
    /// no depth gate.
    fn compare_ungated(
        finder: &CloneFinder,
        fa: &PreparedFunction,
        fb: &PreparedFunction,
        a_list: &[NodeId],
        b_list: &[NodeId],
        records: &mut Vec<CloneRecord>,
        seen: &mut HashSet<RecordKey>,
    ) {
        let runs = find_matching_runs(a_list, b_list, |&a, &b| {
            fa.hashes.usage(a) == fb.hashes.usage(b)
        });
        let mut consumed_a = HashSet::new();
        let mut consumed_b = HashSet::new();
        for run in runs {
            if run.len < 2 {
                continue;
            }
            consumed_a.extend(run.start_a..run.start_a + run.len);
            consumed_b.extend(run.start_b..run.start_b + run.len);
            let record =
                finder.materialize(fa, fb, a_list, b_list, run.start_a, run.start_b, run.len);
            let key = (
                record.anchor_a.start,
                record.anchor_a.end,
                record.anchor_b.start,
                record.anchor_b.end,
                record.run_length,
            );
            if seen.insert(key) {
                records.push(record);
            }
        }
        for (idx, &b) in b_list.iter().enumerate() {
            if consumed_b.contains(&idx) {
                continue;
            }
            if let Some(block) = fb.unit.node(b).block() {
                compare_ungated(finder, fa, fb, a_list, block, records, seen);
            }
        }
        for (idx, &a) in a_list.iter().enumerate() {
            if consumed_a.contains(&idx) {
                continue;
            }
            if let Some(block) = fa.unit.node(a).block() {
                compare_ungated(finder, fa, fb, block, b_list, records, seen);
            }
        }
    }

    #[test]
    fn depth_gate_agrees_with_an_ungated_reference() {
        let shapes = vec![
            flat_unit("flat", "a.py", &[("a", "1"), ("b", "2"), ("c", "3")]),
            looped_unit("looped", "b.py", &[("x", "1"), ("y", "2")]),
            double_looped_unit("deep", "c.py", &[("u", "1"), ("v", "2")]),
            lead_and_loop_unit(
                "mixed",
                "d.py",
                &[("s", "1"), ("t", "2")],
                &[("m", "3"), ("n", "4")],
            ),
        ];
        let config = DetectionConfig::default();
        let finder = CloneFinder::new(&config);
        for a in 0..shapes.len() {
            for b in a + 1..shapes.len() {
                let (fa, fb) = (&shapes[a], &shapes[b]);

                let mut gated = Vec::new();
                let mut seen = HashSet::new();
                finder.compare_lists(fa, fb, fa.unit.body(), fb.unit.body(), &mut gated, &mut seen);

                let mut reference = Vec::new();
                let mut seen = HashSet::new();
                compare_ungated(
                    &finder,
                    fa,
                    fb,
                    fa.unit.body(),
                    fb.unit.body(),
                    &mut reference,
                    &mut seen,
                );

                assert_eq!(
                    serde_json::to_string(&gated).unwrap(),
                    serde_json::to_string(&reference).unwrap(),
                    "gate lost or invented records for {} vs {}",
                    fa.unit.name,
                    fb.unit.name
                );
            }
        }
    }
}
