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

use crate::error::{ExportError, ExportResult};
use clap::Parser;
use serde::Deserialize;
use serde_env_field::EnvField;
use std::path::PathBuf;

pub const DEFAULT_SOURCE_DIR: &str = ".";
pub const DEFAULT_OUTPUT: &str = "entities.csv";
pub const DEFAULT_PLACEHOLDER: &str = "-";
pub const DEFAULT_STATIC_COLUMNS: [&str; 2] = ["min_level", "spawn_chance"];
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[arg(
        short = 'd',
        long = "source_dir",
        alias = "source-dir",
        env = "ENTITY_TABULATOR_SOURCE_DIR",
        help = "Directory to scan for entity definition files",
        default_value = DEFAULT_SOURCE_DIR
    )]
    pub source_dir: PathBuf,

    #[arg(
        short = 'o',
        long = "output",
        env = "ENTITY_TABULATOR_OUTPUT",
        help = "Path of the CSV file to write",
        default_value = DEFAULT_OUTPUT
    )]
    pub output: PathBuf,

    #[arg(short = 'c', long = "config", help = "Path to configuration file")]
    pub config_file: Option<String>,

    #[arg(
        short = 'e',
        long = "env",
        help = "Path to environment file, defaults to the nearest .env"
    )]
    pub env_file: Option<String>,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT),
            config_file: None,
            env_file: None,
        }
    }
}

/// Optional export configuration, read from YAML.
///
/// Every field falls back to the built-in default when absent. The
/// placeholder supports `${VAR}` environment substitution.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub static_columns: Option<Vec<String>>,
    pub placeholder: Option<EnvField<String>>,
    pub extensions: Option<Vec<String>>,
}

impl Configuration {
    pub fn load(path: &str) -> ExportResult<Configuration> {
        let conf = serde_yaml::from_reader(std::fs::File::open(path).map_err(|e| {
            ExportError::Config(format!("Failed to open config file {}: {}", path, e))
        })?)
        .map_err(|e| ExportError::Config(format!("Failed to parse config file {}: {}", path, e)))?;

        Ok(conf)
    }
}

/// Fully resolved settings for one export run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSettings {
    pub source_dir: PathBuf,
    pub output: PathBuf,
    /// Top-level entity fields exported ahead of the component columns.
    pub static_columns: Vec<String>,
    /// Cell text for a field or component the entity does not define.
    pub placeholder: String,
    /// File extensions, without the dot, that mark definition files.
    pub extensions: Vec<String>,
}

impl ExportSettings {
    pub fn new(arguments: &Arguments, configuration: Configuration) -> Self {
        let defaults = Self::default();
        Self {
            source_dir: arguments.source_dir.clone(),
            output: arguments.output.clone(),
            static_columns: configuration
                .static_columns
                .unwrap_or(defaults.static_columns),
            placeholder: configuration
                .placeholder
                .map(EnvField::into_inner)
                .unwrap_or(defaults.placeholder),
            extensions: configuration
                .extensions
                .map(|extensions| {
                    extensions
                        .into_iter()
                        .map(|extension| extension.trim_start_matches('.').to_string())
                        .collect()
                })
                .unwrap_or(defaults.extensions),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT),
            static_columns: DEFAULT_STATIC_COLUMNS.iter().map(|s| s.to_string()).collect(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
