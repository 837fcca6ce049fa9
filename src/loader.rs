//! This module provides the `MachineLoader` struct, responsible for loading machines from files
//! and strings, either as serialized diagrams (`.json`) or as {a,b} encodings (`.ab`).

use crate::encoder::decode;
use crate::store::MachineRecord;
use crate::types::TuringMachineError;
use std::fs;
use std::path::{Path, PathBuf};

/// The formats a machine file can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineFormat {
    /// A serialized machine record: `{"id": ..., "states": [...], "edges": [...]}`.
    Json,
    /// An {a,b} encoding.
    Encoding,
}

impl MachineFormat {
    /// Picks the format from a file extension: `.json` or `.ab`.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(MachineFormat::Json),
            "ab" => Some(MachineFormat::Encoding),
            _ => None,
        }
    }
}

/// `MachineLoader` loads machines from individual files, from string content, and from every
/// machine file within a directory.
pub struct MachineLoader;

impl MachineLoader {
    /// Loads a single machine from the specified file path.
    ///
    /// The format follows the file extension. A machine without an id is named after the file
    /// stem.
    ///
    /// # Returns
    ///
    /// * `Ok(MachineRecord)` if the file is read and parsed.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or has an unknown
    ///   extension.
    /// * `Err(TuringMachineError::Json)` or `Err(TuringMachineError::Decode)` if the content is
    ///   not a valid machine.
    pub fn load_machine(path: &Path) -> Result<MachineRecord, TuringMachineError> {
        let format = MachineFormat::from_path(path).ok_or_else(|| {
            TuringMachineError::FileError(format!(
                "Unsupported machine file {}: expected .json or .ab",
                path.display()
            ))
        })?;

        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::load_machine_from_str(&content, format, &name)
    }

    /// Loads a single machine from string content.
    ///
    /// Decoded machines have no start state, so the first decoded state is made the start to
    /// keep them runnable. `id` is used when the content does not carry one.
    pub fn load_machine_from_str(
        content: &str,
        format: MachineFormat,
        id: &str,
    ) -> Result<MachineRecord, TuringMachineError> {
        let mut record = match format {
            MachineFormat::Json => serde_json::from_str::<MachineRecord>(content)?,
            MachineFormat::Encoding => {
                let mut diagram = decode(content)?;
                if let Some(first) = diagram.states.first().map(|s| s.id.clone()) {
                    diagram.make_sole_start(&first)?;
                }
                MachineRecord {
                    id: String::new(),
                    diagram,
                }
            }
        };

        if record.id.is_empty() {
            record.id = id.to_string();
        }

        Ok(record)
    }

    /// Loads every machine file (`.json` or `.ab`) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Results are ordered by path.
    ///
    /// # Returns
    ///
    /// * `Vec<Result<(PathBuf, MachineRecord), TuringMachineError>>` - one entry per machine
    ///   file, holding either the loaded machine and its path or the error that prevented
    ///   loading it.
    pub fn load_machines(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, MachineRecord), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => results.push(Err(TuringMachineError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }
        paths.sort();

        for path in paths {
            if path.is_dir() || MachineFormat::from_path(&path).is_none() {
                continue;
            }

            results.push(match Self::load_machine(&path) {
                Ok(machine) => Ok((path, machine)),
                Err(e) => Err(TuringMachineError::FileError(format!(
                    "Failed to load machine from {}: {}",
                    path.display(),
                    e
                ))),
            });
        }

        results
    }
}
