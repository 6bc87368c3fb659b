use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::filesystem::{collect_note_files, relative_from_root};
use crate::pattern::DailyLinkPattern;
use crate::runtime::ResolvedPaths;

#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineChange {
    pub relative_path: String,
    pub line_number: usize,
    pub new_line: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RewriteReport {
    pub dry_run: bool,
    pub files_scanned: usize,
    pub files_changed: usize,
    pub lines_changed: usize,
    pub changes: Vec<LineChange>,
}

/// One traversal for both modes: enumerate, rewrite line by line, collect
/// changes. Dry mode never writes; live mode writes every enumerated file
/// back through an atomic replace, changed or not. Any read or write failure
/// aborts the run; files already replaced stay replaced.
pub fn rewrite_graph(
    paths: &ResolvedPaths,
    pattern: &DailyLinkPattern,
    options: &RewriteOptions,
) -> Result<RewriteReport> {
    let files = collect_note_files(paths)?;
    let mut report = RewriteReport {
        dry_run: options.dry_run,
        files_scanned: files.len(),
        files_changed: 0,
        lines_changed: 0,
        changes: Vec::new(),
    };

    for path in &files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let rewritten = rewrite_content(pattern, &content);

        if !rewritten.changes.is_empty() {
            let relative = relative_from_root(paths, path);
            report.files_changed += 1;
            report.lines_changed += rewritten.changes.len();
            for (line_number, new_line) in rewritten.changes {
                report.changes.push(LineChange {
                    relative_path: relative.clone(),
                    line_number,
                    new_line,
                });
            }
        }

        if !options.dry_run {
            replace_file(path, &rewritten.content)?;
        }
    }

    Ok(report)
}

#[derive(Debug, Clone)]
pub struct RewrittenContent {
    pub content: String,
    /// (1-based line number, rewritten line without its terminator)
    pub changes: Vec<(usize, String)>,
}

/// Pure per-file transform. Lines keep their own terminators, so everything
/// outside a link match round-trips byte for byte, CRLF included.
pub fn rewrite_content(pattern: &DailyLinkPattern, content: &str) -> RewrittenContent {
    let mut output = String::with_capacity(content.len());
    let mut changes = Vec::new();
    for (index, line) in content.split_inclusive('\n').enumerate() {
        let (rewritten, changed) = pattern.rewrite_line(line);
        if changed {
            changes.push((index + 1, strip_terminator(&rewritten).to_string()));
        }
        output.push_str(&rewritten);
    }
    RewrittenContent { content: output, changes }
}

fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Write through a sibling temp file and rename over the original, so an
/// interrupted run leaves each file either fully old or fully new.
fn replace_file(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("invalid file name: {}", path.display()))?;
    let temp_path = path.with_file_name(format!("{file_name}.tmp"));
    fs::write(&temp_path, content)
        .with_context(|| format!("failed to write {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}
