//! C# analysis: tree-sitter parsing, invocation walking, and the parallel
//! multi-file driver.

mod literals;
pub mod semantic;
mod symbols;
pub mod validator;

pub use literals::string_literal_value;
pub use semantic::CSharpSemanticModel;
pub use validator::{validate_json, AnalysisContext, CallSiteValidator, SemanticModel, GENERIC_PARSE_FAILURE};

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use ignore::WalkBuilder;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::catalog::CATALOG;
use crate::diagnostic::{sort_diagnostics, Diagnostic, JSON_SYNTAX_RULE};
use crate::{clean_path, read_file_lossy, CheckError};

// ─── Options & report ────────────────────────────────────────────────

/// What to check and how to walk it.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Files or directories to check
    pub paths: Vec<PathBuf>,
    /// Lowercase extensions without the dot
    pub extensions: Vec<String>,
    /// Worker threads (0 = available parallelism)
    pub threads: usize,
    /// Include hidden files and directories
    pub hidden: bool,
    /// Ignore .gitignore / .ignore rules
    pub no_ignore: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            paths: vec![PathBuf::from(".")],
            extensions: vec!["cs".to_string()],
            threads: 0,
            hidden: false,
            no_ignore: false,
        }
    }
}

/// Outcome of a multi-file run.
#[derive(Serialize, Debug, Default)]
pub struct CheckReport {
    pub files_checked: usize,
    /// Files that could not be read or parsed
    pub skipped_files: usize,
    /// Files decoded with lossy UTF-8 conversion
    pub lossy_files: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Split a comma-separated extension list (`"cs, CSX"` → `["cs", "csx"]`).
pub fn parse_extensions(ext: &str) -> Vec<String> {
    ext.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

// ─── Single source ───────────────────────────────────────────────────

/// A tree-sitter parser loaded with the C# grammar.
pub fn new_csharp_parser() -> Result<tree_sitter::Parser, CheckError> {
    let mut parser = tree_sitter::Parser::new();
    parser.set_language(&tree_sitter_c_sharp::LANGUAGE.into())?;
    Ok(parser)
}

/// Check one C# source text. Diagnostics come back sorted by position.
pub fn analyze_source(
    parser: &mut tree_sitter::Parser,
    source: &str,
    path: &str,
    cancel: &CancellationToken,
) -> Result<Vec<Diagnostic>, CheckError> {
    let tree = parser.parse(source, None)
        .ok_or_else(|| CheckError::SourceParse { path: path.to_string() })?;
    let root = tree.root_node();
    if root.has_error() {
        debug!(path = %path, "source contains syntax errors; checking the recovered tree");
    }

    let source_bytes = source.as_bytes();
    let model = CSharpSemanticModel::build(root, source_bytes);
    let ctx = AnalysisContext { path, source: source_bytes, model: &model, cancel };
    let validator = CallSiteValidator::new(CATALOG, &JSON_SYNTAX_RULE);

    let mut diagnostics = Vec::new();
    walk_for_invocations(root, &mut |invocation: tree_sitter::Node| {
        validator.check_invocation(invocation, &ctx, &mut diagnostics);
    });

    sort_diagnostics(&mut diagnostics);
    Ok(diagnostics)
}

/// Visit every `invocation_expression`, including ones nested in receivers
/// and arguments (`a.B(c.D("x"))`).
fn walk_for_invocations<'t>(node: tree_sitter::Node<'t>, visit: &mut dyn FnMut(tree_sitter::Node<'t>)) {
    if node.kind() == "invocation_expression" {
        visit(node);
    }
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            walk_for_invocations(child, visit);
        }
    }
}

// ─── Multi-file driver ───────────────────────────────────────────────

#[derive(Default)]
struct ChunkResult {
    files_checked: usize,
    skipped_files: usize,
    lossy_files: usize,
    diagnostics: Vec<Diagnostic>,
}

/// Walk `options.paths`, check every matching file in parallel, and merge results.
pub fn check_paths(options: &CheckOptions, cancel: &CancellationToken) -> Result<CheckReport, CheckError> {
    let start = Instant::now();
    let files = collect_files(options)?;
    let total_files = files.len();

    let num_threads = if options.threads > 0 {
        options.threads
    } else {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    };
    let chunk_size = total_files.div_ceil(num_threads).max(1);
    info!(files = total_files, threads = num_threads, "checking files");

    let results: Vec<Result<ChunkResult, CheckError>> = std::thread::scope(|s| {
        let handles: Vec<_> = files.chunks(chunk_size).map(|chunk| {
            s.spawn(move || check_chunk(chunk, cancel))
        }).collect();

        handles.into_iter()
            .map(|h| h.join().unwrap_or(Err(CheckError::WorkerPanicked)))
            .collect()
    });

    if cancel.is_cancelled() {
        return Err(CheckError::Cancelled);
    }

    let mut report = CheckReport::default();
    for result in results {
        let chunk = result?;
        report.files_checked += chunk.files_checked;
        report.skipped_files += chunk.skipped_files;
        report.lossy_files += chunk.lossy_files;
        report.diagnostics.extend(chunk.diagnostics);
    }
    sort_diagnostics(&mut report.diagnostics);

    info!(
        elapsed_ms = format_args!("{:.1}", start.elapsed().as_secs_f64() * 1000.0),
        files = report.files_checked,
        skipped = report.skipped_files,
        diagnostics = report.diagnostics.len(),
        "check finished"
    );
    Ok(report)
}

fn check_chunk(chunk: &[String], cancel: &CancellationToken) -> Result<ChunkResult, CheckError> {
    let mut parser = new_csharp_parser()?;
    let mut result = ChunkResult::default();

    for file_path in chunk {
        if cancel.is_cancelled() {
            break;
        }
        let (content, was_lossy) = match read_file_lossy(Path::new(file_path)) {
            Ok(r) => r,
            Err(e) => {
                warn!(path = %file_path, error = %e, "failed to read file");
                result.skipped_files += 1;
                continue;
            }
        };
        if was_lossy {
            warn!(path = %file_path, "file is not valid UTF-8, decoded lossily");
            result.lossy_files += 1;
        }

        match analyze_source(&mut parser, &content, file_path, cancel) {
            Ok(diagnostics) => {
                result.files_checked += 1;
                result.diagnostics.extend(diagnostics);
            }
            Err(e) => {
                warn!(path = %file_path, error = %e, "failed to analyze file");
                result.skipped_files += 1;
            }
        }
    }

    Ok(result)
}

/// Files under `options.paths` with a matching extension, sorted and deduplicated.
fn collect_files(options: &CheckOptions) -> Result<Vec<String>, CheckError> {
    let (first, rest) = options.paths.split_first()
        .ok_or_else(|| CheckError::InvalidArgs("no paths to check".to_string()))?;
    for path in &options.paths {
        if !path.exists() {
            return Err(CheckError::PathNotFound(path.display().to_string()));
        }
    }

    let mut walker = WalkBuilder::new(first);
    for path in rest {
        walker.add(path);
    }
    walker
        .hidden(!options.hidden)
        .git_ignore(!options.no_ignore)
        .git_exclude(!options.no_ignore)
        .ignore(!options.no_ignore)
        .parents(!options.no_ignore)
        .require_git(false);
    if options.threads > 0 {
        walker.threads(options.threads);
    }

    let extensions = &options.extensions;
    let all_files: Mutex<Vec<String>> = Mutex::new(Vec::new());

    walker.build_parallel().run(|| {
        Box::new(|entry| {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "walk error");
                    return ignore::WalkState::Continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return ignore::WalkState::Continue;
            }
            let path = entry.path();
            let ext_match = path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)));
            if ext_match {
                let clean = clean_path(&path.to_string_lossy());
                all_files.lock().unwrap_or_else(|e| e.into_inner()).push(clean);
            }
            ignore::WalkState::Continue
        })
    });

    let mut files = all_files.into_inner().unwrap_or_else(|e| e.into_inner());
    files.sort();
    files.dedup();
    Ok(files)
}

// ─── Syntax helpers ──────────────────────────────────────────────────

pub(crate) fn node_text<'a>(node: tree_sitter::Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

pub(crate) fn find_child_by_kind<'a>(node: tree_sitter::Node<'a>, kind: &str) -> Option<tree_sitter::Node<'a>> {
    (0..node.child_count())
        .filter_map(|i| node.child(i))
        .find(|c| c.kind() == kind)
}

pub(crate) fn find_child_by_field<'a>(node: tree_sitter::Node<'a>, field: &str) -> Option<tree_sitter::Node<'a>> {
    node.child_by_field_name(field)
}

/// Method name from a name node, with type arguments stripped
/// (`DeserializeObject<Foo>` → `DeserializeObject`).
pub(crate) fn method_name_of(name_node: tree_sitter::Node, source: &[u8]) -> String {
    if name_node.kind() == "generic_name" {
        if let Some(id_node) = name_node.child(0) {
            if id_node.kind() == "identifier" {
                return node_text(id_node, source).to_string();
            }
        }
        let text = node_text(name_node, source);
        text.split('<').next().unwrap_or(text).trim().to_string()
    } else {
        node_text(name_node, source).to_string()
    }
}

/// Number of explicit type arguments on a name node (`Foo<A, B>` → 2).
pub(crate) fn type_argument_count(name_node: tree_sitter::Node) -> usize {
    if name_node.kind() != "generic_name" {
        return 0;
    }
    find_child_by_kind(name_node, "type_argument_list")
        .map(|list| {
            (0..list.named_child_count())
                .filter_map(|i| list.named_child(i))
                .filter(|c| c.kind() != "comment")
                .count()
        })
        .unwrap_or(0)
}

/// Expressions of an invocation's arguments, in order. Named arguments
/// (`Parse(json: "...")`) yield their value expression.
pub(crate) fn argument_expressions(invocation: tree_sitter::Node) -> Vec<tree_sitter::Node> {
    let Some(list) = find_child_by_field(invocation, "arguments")
        .or_else(|| find_child_by_kind(invocation, "argument_list"))
    else {
        return Vec::new();
    };

    (0..list.named_child_count())
        .filter_map(|i| list.named_child(i))
        .filter(|arg| arg.kind() == "argument")
        .filter_map(|arg| {
            (0..arg.named_child_count())
                .rev()
                .filter_map(|i| arg.named_child(i))
                .find(|c| c.kind() != "comment")
        })
        .collect()
}

#[cfg(test)]
#[path = "analyzer_tests.rs"]
mod tests;
