//! Input collection - files, directories and ZIP archives
//!
//! Turns command-line inputs into named documents for the core. Anything that
//! cannot be read becomes a `Failed` entry instead of aborting the run, so one
//! corrupt archive never hides the results for the rest of the batch.

use anyhow::{Context, Result};
use dmnlint_core::{DocumentProcessor, SourceDocument, ValidationResult};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectedEntry {
    Document(SourceDocument),
    Failed { name: String, reason: String },
}

impl CollectedEntry {
    pub fn name(&self) -> &str {
        match self {
            CollectedEntry::Document(doc) => &doc.name,
            CollectedEntry::Failed { name, .. } => name,
        }
    }
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

pub struct SourceCollector {
    extension: String,
}

impl SourceCollector {
    /// `extension` with or without the leading dot, matched case-insensitively.
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.trim().trim_start_matches('.').to_ascii_lowercase(),
        }
    }

    /// Whether a file or archive entry name carries the document extension.
    pub fn matches(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }

    /// Collect every input in order. Directory contents are sorted by file name.
    pub fn collect(&self, inputs: &[PathBuf]) -> Vec<CollectedEntry> {
        let mut entries = Vec::new();
        for input in inputs {
            entries.extend(self.collect_input(input));
        }
        debug!("Collected {} entries from {} input(s)", entries.len(), inputs.len());
        entries
    }

    fn collect_input(&self, path: &Path) -> Vec<CollectedEntry> {
        if path.is_dir() {
            self.collect_dir(path)
        } else if is_zip(path) {
            self.read_zip_file(path).unwrap_or_else(|e| {
                warn!("Skipping archive {}: {:#}", path.display(), e);
                vec![CollectedEntry::Failed {
                    name: path.display().to_string(),
                    reason: format!("{e:#}"),
                }]
            })
        } else {
            // explicitly named files are read whatever their extension
            vec![read_file(path)]
        }
    }

    fn collect_dir(&self, root: &Path) -> Vec<CollectedEntry> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    let path = entry.path();
                    if is_zip(path) {
                        entries.extend(self.collect_input(path));
                    } else if self.matches(&path.to_string_lossy()) {
                        entries.push(read_file(path));
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    let name = e
                        .path()
                        .unwrap_or(root)
                        .display()
                        .to_string();
                    warn!("Cannot walk {}: {}", name, e);
                    entries.push(CollectedEntry::Failed {
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }
        entries
    }

    fn read_zip_file(&self, path: &Path) -> Result<Vec<CollectedEntry>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open archive: {}", path.display()))?;
        self.read_archive(&path.display().to_string(), BufReader::new(file))
    }

    /// Read matching entries of a ZIP archive. Entry names become `<label>!/<entry>`.
    pub fn read_archive<R: Read + Seek>(&self, label: &str, reader: R) -> Result<Vec<CollectedEntry>> {
        let mut archive = zip::ZipArchive::new(reader)
            .with_context(|| format!("Failed to read zip archive {label}"))?;

        let mut entries = Vec::new();
        for index in 0..archive.len() {
            let mut file = match archive.by_index(index) {
                Ok(file) => file,
                Err(e) => {
                    entries.push(CollectedEntry::Failed {
                        name: format!("{label}!/#{index}"),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            if file.is_dir() || !self.matches(file.name()) {
                continue;
            }

            let name = format!("{label}!/{}", file.name());
            let mut bytes = Vec::new();
            match file.read_to_end(&mut bytes) {
                Ok(_) => entries.push(CollectedEntry::Document(SourceDocument::new(name, bytes))),
                Err(e) => entries.push(CollectedEntry::Failed {
                    name,
                    reason: e.to_string(),
                }),
            }
        }
        Ok(entries)
    }
}

fn read_file(path: &Path) -> CollectedEntry {
    let name = path.display().to_string();
    match std::fs::read(path) {
        Ok(bytes) => CollectedEntry::Document(SourceDocument::new(name, bytes)),
        Err(e) => CollectedEntry::Failed {
            name,
            reason: e.to_string(),
        },
    }
}

/// Validate the readable entries as one batch and slot the unreadable ones
/// back in as failed results, keeping collection order.
pub fn validate_collected(processor: &DocumentProcessor, entries: Vec<CollectedEntry>) -> Vec<ValidationResult> {
    let mut documents = Vec::new();
    let mut slots = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            CollectedEntry::Document(doc) => {
                slots.push(None);
                documents.push(doc);
            }
            CollectedEntry::Failed { name, reason } => slots.push(Some(ValidationResult::failed(
                &name,
                format!("Could not read {name}: {reason}"),
            ))),
        }
    }

    let mut validated = processor.validate_batch(&documents).into_iter();
    slots
        .into_iter()
        .filter_map(|slot| slot.or_else(|| validated.next()))
        .collect()
}
