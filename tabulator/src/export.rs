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

//! End-to-end export pipeline.

use crate::config::ExportSettings;
use crate::corpus::load_corpus;
use crate::error::ExportResult;
use crate::schema::component_names;
use crate::table::build_table;
use crate::writer::write_table_to_path;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Outcome of a completed export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    pub files: usize,
    pub entities: usize,
    pub components: usize,
    pub output: PathBuf,
}

/// Loads every definition file, flattens the entities and writes the CSV.
///
/// The output file is only touched once the whole corpus has loaded, so a
/// failing input never leaves a partial export behind.
#[instrument(skip_all, fields(source_dir = ?settings.source_dir, output = ?settings.output))]
pub fn run(settings: &ExportSettings) -> ExportResult<ExportSummary> {
    let (corpus, files) = load_corpus(&settings.source_dir, &settings.extensions)?;
    info!("Loaded {} entities from {} files", corpus.len(), files);

    let components = component_names(&corpus);
    info!("Discovered {} component columns", components.len());

    let table = build_table(&corpus, &components, settings);
    write_table_to_path(&table, &settings.output)?;
    info!("Exported {} rows to {:?}", table.rows.len(), settings.output);

    Ok(ExportSummary {
        files,
        entities: corpus.len(),
        components: components.len(),
        output: settings.output.clone(),
    })
}
