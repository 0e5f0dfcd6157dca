use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::{AiError, Optimizer};
use crate::model::mandala::Mandala;
use crate::model::settings::Settings;
use crate::parse::{ParseError, parse_outline_with_report};

/// Error type for import operations. Any error leaves the current tree alone.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Result of an import
#[derive(Debug)]
pub struct ImportResult {
    /// The replacement tree
    pub mandala: Mandala,
    /// Heading lines that didn't fit the 8 x 8 shape
    pub dropped: Vec<String>,
    /// Whether the text went through the AI rewrite first
    pub rewritten: bool,
}

pub fn read_import_file(path: &Path) -> Result<String, ImportError> {
    fs::read_to_string(path).map_err(|e| ImportError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parse outline text into a replacement tree
pub fn parse_import(text: &str, rewritten: bool) -> Result<ImportResult, ImportError> {
    let report = parse_outline_with_report(text)?;
    for line in &report.dropped {
        tracing::warn!(heading = %line, "dropped heading beyond the 8 x 8 shape");
    }
    tracing::info!(
        cells = report.mandala.cell_count(),
        dropped = report.dropped.len(),
        rewritten,
        "parsed import"
    );
    Ok(ImportResult {
        mandala: report.mandala,
        dropped: report.dropped,
        rewritten,
    })
}

/// Run the import pipeline synchronously: AI rewrite when `settings`
/// enables it and an optimizer is given, then parse.
pub fn import_text(
    text: &str,
    settings: &Settings,
    optimizer: Option<&dyn Optimizer>,
) -> Result<ImportResult, ImportError> {
    match optimizer {
        Some(optimizer) if settings.ai_enabled => {
            let rewritten = optimizer.optimize(text, settings)?;
            parse_import(&rewritten, true)
        }
        _ => parse_import(text, false),
    }
}
