//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Error types for the export pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an export run.
///
/// Nothing is recovered at the application level; the first error ends the
/// run before any output is written.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The source directory could not be listed.
    #[error("Failed to read directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A definition file could not be opened or read.
    #[error("Failed to read definition file {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A definition file is not valid YAML.
    #[error("Failed to parse definition file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document root is something other than a mapping of entities.
    #[error("Definition file {path:?} must contain a mapping of entities, found {found}")]
    NotAMapping { path: PathBuf, found: &'static str },

    /// An entity record has a shape the table cannot be built from.
    #[error("Malformed entity '{name}' in {path:?}: {reason}")]
    MalformedEntity {
        path: PathBuf,
        name: String,
        reason: String,
    },

    /// The output file could not be created.
    #[error("Failed to create output file {path:?}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Any other I/O failure, typically while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Names the kind of a YAML node for diagnostics.
pub(crate) fn value_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}
