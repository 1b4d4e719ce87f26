//! Report generation over clone analyses.
//!
//! Renders a [`CloneAnalysis`] as JSON, Markdown or a standalone HTML
//! page. The non-JSON formats work from a view model that groups records
//! by file, rolls counts up per directory, and maps byte spans back to
//! source lines by re-reading the analyzed files (records only carry byte
//! offsets).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;

use crate::core::config::ReportFormat;
use crate::core::errors::{DraupnirError, Result};
use crate::detectors::clones::{CloneAnalysis, CloneRecord};

const MARKDOWN_TEMPLATE_NAME: &str = "markdown";
const HTML_TEMPLATE_NAME: &str = "html";

const MARKDOWN_TEMPLATE: &str = "\
# Clone report

Generated {{generated_at}} by draupnir {{engine_version}}.

{{#if truncated}}> **Warning**: the comparison deadline expired; this report is incomplete.

{{/if}}\
- Files analyzed: {{stats.files_analyzed}}
- Functions analyzed: {{stats.functions_analyzed}}
- Pairs compared: {{stats.pairs_compared}}
- Clones found: {{stats.clones_found}}

{{#each files}}\
## {{{file}}}

{{clone_count}} clone(s), longest run {{max_run_length}}

{{#each records}}\
- `{{{location_a}}}` duplicates `{{{location_b}}}` (run {{run_length}}, weight {{total_weight}})
{{/each}}

{{/each}}\
{{#if directories}}\
## Directory overview

| Directory | Clones | Longest run |
|-----------|--------|-------------|
{{#each directories}}\
| {{{directory}}} | {{clone_count}} | {{max_run_length}} |
{{/each}}

{{/if}}\
{{#if diagnostics}}\
## Diagnostics

{{#each diagnostics}}\
- {{{this}}}
{{/each}}
{{/if}}";

const HTML_TEMPLATE: &str = "\
<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"utf-8\">
<title>Clone report</title>
<style>
body { font-family: system-ui, sans-serif; margin: 2rem; color: #1b1b1b; }
table { border-collapse: collapse; margin: 1rem 0; }
th, td { border: 1px solid #c9c9c9; padding: 0.3rem 0.6rem; text-align: left; }
th { background: #f0f0f0; }
.warn { background: #fff3cd; border: 1px solid #ffe08a; padding: 0.6rem; }
code { background: #f5f5f5; padding: 0 0.2rem; }
</style>
</head>
<body>
<h1>Clone report</h1>
<p>Generated {{generated_at}} by draupnir {{engine_version}}.</p>
{{#if truncated}}<p class=\"warn\">The comparison deadline expired; this report is incomplete.</p>
{{/if}}\
<table>
<tr><th>Files</th><th>Functions</th><th>Pairs</th><th>Clones</th></tr>
<tr><td>{{stats.files_analyzed}}</td><td>{{stats.functions_analyzed}}</td><td>{{stats.pairs_compared}}</td><td>{{stats.clones_found}}</td></tr>
</table>
{{#each files}}\
<h2><code>{{file}}</code></h2>
<p>{{clone_count}} clone(s), longest run {{max_run_length}}</p>
<table>
<tr><th>Location</th><th>Duplicates</th><th>Run</th><th>Weight</th></tr>
{{#each records}}\
<tr><td><code>{{location_a}}</code></td><td><code>{{location_b}}</code></td><td>{{run_length}}</td><td>{{total_weight}}</td></tr>
{{/each}}\
</table>
{{/each}}\
{{#if directories}}\
<h2>Directory overview</h2>
<table>
<tr><th>Directory</th><th>Clones</th><th>Longest run</th></tr>
{{#each directories}}\
<tr><td><code>{{directory}}</code></td><td>{{clone_count}}</td><td>{{max_run_length}}</td></tr>
{{/each}}\
</table>
{{/if}}\
{{#if diagnostics}}\
<h2>Diagnostics</h2>
<ul>
{{#each diagnostics}}<li>{{this}}</li>
{{/each}}</ul>
{{/if}}\
</body>
</html>
";

/// Byte offset to 1-based line number mapping for one source file.
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Index every line start in `text`.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line containing the byte offset.
    pub fn line(&self, byte: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= byte)
    }
}

#[derive(Debug, Serialize)]
struct RecordView {
    location_a: String,
    location_b: String,
    run_length: usize,
    total_weight: u64,
    score: u64,
}

#[derive(Debug, Serialize)]
struct FileGroup {
    file: String,
    clone_count: usize,
    max_run_length: usize,
    records: Vec<RecordView>,
}

#[derive(Debug, Serialize)]
struct DirectoryRollup {
    directory: String,
    clone_count: usize,
    max_run_length: usize,
}

#[derive(Debug, Serialize)]
struct ReportData {
    generated_at: String,
    engine_version: String,
    truncated: bool,
    stats: crate::detectors::clones::AnalysisStats,
    files: Vec<FileGroup>,
    directories: Vec<DirectoryRollup>,
    diagnostics: Vec<String>,
}

/// Renders analyses into the configured output format.
pub struct ReportGenerator {
    handlebars: Handlebars<'static>,
}

impl ReportGenerator {
    /// Generator with the built-in templates registered.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        for (name, template) in [
            (MARKDOWN_TEMPLATE_NAME, MARKDOWN_TEMPLATE),
            (HTML_TEMPLATE_NAME, HTML_TEMPLATE),
        ] {
            handlebars
                .register_template_string(name, template)
                .map_err(|e| DraupnirError::Serialization {
                    message: format!("failed to register {name} template"),
                    format: Some("handlebars".to_string()),
                    source: Some(Box::new(e)),
                })?;
        }
        Ok(Self { handlebars })
    }

    /// Render the analysis in the requested format.
    pub fn render(&self, analysis: &CloneAnalysis, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => serde_json::to_string_pretty(analysis).map_err(Into::into),
            ReportFormat::Markdown => {
                let data = build_report_data(analysis);
                self.handlebars
                    .render(MARKDOWN_TEMPLATE_NAME, &data)
                    .map_err(Into::into)
            }
            ReportFormat::Html => {
                let data = build_report_data(analysis);
                self.handlebars
                    .render(HTML_TEMPLATE_NAME, &data)
                    .map_err(Into::into)
            }
        }
    }

    /// Render and write to `path`.
    pub fn write_report(
        &self,
        analysis: &CloneAnalysis,
        format: ReportFormat,
        path: &Path,
    ) -> Result<()> {
        let rendered = self.render(analysis, format)?;
        fs::write(path, rendered).map_err(|e| {
            DraupnirError::io(format!("failed to write report to {}", path.display()), e)
        })
    }
}

fn location(record_file: &str, name: &str, lines: Option<(usize, usize)>) -> String {
    match lines {
        Some((start, end)) if start == end => format!("{record_file}:{start} {name}"),
        Some((start, end)) => format!("{record_file}:{start}-{end} {name}"),
        None => format!("{record_file} {name}"),
    }
}

fn span_lines(
    indexes: &mut BTreeMap<String, Option<LineIndex>>,
    file: &str,
    start: usize,
    end: usize,
) -> Option<(usize, usize)> {
    let index = indexes
        .entry(file.to_string())
        .or_insert_with(|| fs::read_to_string(file).ok().map(|text| LineIndex::new(&text)));
    index.as_ref().map(|index| {
        let last = end.saturating_sub(1).max(start);
        (index.line(start), index.line(last))
    })
}

fn build_report_data(analysis: &CloneAnalysis) -> ReportData {
    let mut indexes: BTreeMap<String, Option<LineIndex>> = BTreeMap::new();
    let mut groups: BTreeMap<String, Vec<RecordView>> = BTreeMap::new();
    let mut group_max: BTreeMap<String, usize> = BTreeMap::new();

    for record in &analysis.records {
        let view = record_view(record, &mut indexes);
        let file = record.function_a.file.clone();
        let max = group_max.entry(file.clone()).or_insert(0);
        *max = (*max).max(record.run_length);
        groups.entry(file).or_default().push(view);
    }

    let files: Vec<FileGroup> = groups
        .into_iter()
        .map(|(file, records)| FileGroup {
            max_run_length: group_max.get(&file).copied().unwrap_or(0),
            clone_count: records.len(),
            records,
            file,
        })
        .collect();

    let mut rollup: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for group in &files {
        let directory = parent_directory(&group.file);
        let entry = rollup.entry(directory).or_insert((0, 0));
        entry.0 += group.clone_count;
        entry.1 = entry.1.max(group.max_run_length);
    }
    let directories: Vec<DirectoryRollup> = rollup
        .into_iter()
        .map(|(directory, (clone_count, max_run_length))| DirectoryRollup {
            directory,
            clone_count,
            max_run_length,
        })
        .collect();

    ReportData {
        generated_at: analysis.generated_at.to_rfc3339(),
        engine_version: analysis.engine_version.clone(),
        truncated: analysis.truncated,
        stats: analysis.stats.clone(),
        files,
        directories,
        diagnostics: if analysis.config.report.include_diagnostics {
            analysis.diagnostics.clone()
        } else {
            Vec::new()
        },
    }
}

fn record_view(
    record: &CloneRecord,
    indexes: &mut BTreeMap<String, Option<LineIndex>>,
) -> RecordView {
    let lines_a = span_lines(
        indexes,
        &record.function_a.file,
        record.span_a.start,
        record.span_a.end,
    );
    let lines_b = span_lines(
        indexes,
        &record.function_b.file,
        record.span_b.start,
        record.span_b.end,
    );
    RecordView {
        location_a: location(&record.function_a.file, &record.function_a.name, lines_a),
        location_b: location(&record.function_b.file, &record.function_b.name, lines_b),
        run_length: record.run_length,
        total_weight: record.total_weight,
        score: record.score(),
    }
}

fn parent_directory(file: &str) -> String {
    PathBuf::from(file)
        .parent()
        .map(|p| p.display().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| ".".to_string())
}
