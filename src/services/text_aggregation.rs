use crate::error::{SyncError, SyncResult};
use crate::models::{SummaryEntry, SummaryPlan};
use crate::services::text_sink::TextSink;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Build the summary, write it to `plan.output` and hand it to `sink`.
///
/// Any missing input aborts the run before anything is written. A sink
/// failure does not: the output file is already in place, so it is only
/// logged and reported.
pub fn run_summary(plan: &SummaryPlan, sink: Option<&mut dyn TextSink>) -> Result<SummaryReport> {
    info!("Building summary from {} sections", plan.sections.len());

    let text = build_summary(plan)?;
    write_summary(&plan.output, &text)?;
    info!("Summary written to {}", plan.output.display());

    let published_to = match sink {
        Some(sink) => match sink.publish(&text) {
            Ok(()) => {
                info!("Summary copied to {}", sink.name());
                Some(sink.name().to_string())
            }
            Err(e) => {
                warn!("Failed to publish summary to {}: {:#}", sink.name(), e);
                None
            }
        },
        None => None,
    };

    Ok(SummaryReport {
        output: plan.output.clone(),
        sections: plan.sections.len(),
        characters: text.chars().count(),
        published_to,
    })
}

/// Assemble the whole document: each section header followed by its text,
/// then the closing block, joined by newlines
pub fn build_summary(plan: &SummaryPlan) -> SyncResult<String> {
    let mut pieces = Vec::with_capacity(plan.sections.len() * 2 + 1);

    for section in &plan.sections {
        let mut body = String::new();
        for entry in &section.entries {
            body.push_str(&read_entry(plan, entry)?);
        }
        debug!("Section '{}': {} bytes", section.header, body.len());
        pieces.push(section.header.clone());
        pieces.push(body);
    }
    pieces.push(plan.closing.clone());

    Ok(pieces.join("\n"))
}

/// Text contributed by a single entry
pub fn read_entry(plan: &SummaryPlan, entry: &SummaryEntry) -> SyncResult<String> {
    match entry {
        SummaryEntry::Document(path) => Ok(format!("{}\n", read_required(path)?)),
        SummaryEntry::Source(path) if path.is_dir() => collect_directory_text(plan, path),
        SummaryEntry::Source(path) => {
            let content = read_required(path)?;
            Ok(render_fenced(&display_path(&plan.root, path), &extension_of(path), &content))
        }
    }
}

/// Fenced blocks for the allow-listed files directly inside `dir`, ordered
/// by file name. Subdirectories are not descended into.
pub fn collect_directory_text(plan: &SummaryPlan, dir: &Path) -> SyncResult<String> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| SyncError::io(dir, e))? {
        let path = entry.map_err(|e| SyncError::io(dir, e))?.path();
        if path.is_file() && plan.accepts(&file_name_of(&path)) {
            files.push(path);
        }
    }
    files.sort();

    let mut text = String::new();
    for path in &files {
        let content = read_required(path)?;
        text.push_str(&render_fenced(&display_path(&plan.root, path), &extension_of(path), &content));
    }

    Ok(text)
}

/// ```` ```{ext}\n{path}\n{content}\n```\n ````
pub fn render_fenced(path: &str, extension: &str, content: &str) -> String {
    format!("```{}\n{}\n{}\n```\n", extension, path, content)
}

pub fn write_summary<P: AsRef<Path>>(output: P, text: &str) -> Result<()> {
    let output = output.as_ref();
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    fs::write(output, text).with_context(|| format!("Failed to write summary: {:?}", output))
}

fn read_required(path: &Path) -> SyncResult<String> {
    if !path.exists() {
        return Err(SyncError::MissingInput(path.to_path_buf()));
    }

    fs::read_to_string(path).map_err(|e| SyncError::io(path, e))
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Everything after the last dot of the file name; `.md` gives `md`
fn extension_of(path: &Path) -> String {
    file_name_of(path)
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_string())
        .unwrap_or_default()
}

/// Root-relative path with forward slashes, so the same tree renders the
/// same on every platform
fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub output: PathBuf,
    pub sections: usize,
    pub characters: usize,
    pub published_to: Option<String>,
}

impl SummaryReport {
    pub fn is_published(&self) -> bool {
        self.published_to.is_some()
    }
}
