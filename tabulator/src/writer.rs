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

//! CSV output.

use crate::error::{ExportError, ExportResult};
use crate::table::Table;
use std::io;
use std::path::Path;
use tracing::debug;

/// Writes the header and rows of `table` as CSV.
///
/// The header is one cell shorter than the rows, so records are written with
/// flexible lengths. Fields are quoted only when they must be.
pub fn write_table<W: io::Write>(table: &Table, writer: W) -> ExportResult<()> {
    let mut csv = csv::WriterBuilder::new()
        .flexible(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    csv.write_record(&table.header)?;
    for row in &table.rows {
        csv.write_record(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Creates (or truncates) `path` and writes `table` to it.
pub fn write_table_to_path(table: &Table, path: &Path) -> ExportResult<()> {
    let file = std::fs::File::create(path).map_err(|source| ExportError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;
    write_table(table, io::BufWriter::new(file))?;
    debug!("Wrote {} rows to {:?}", table.rows.len(), path);
    Ok(())
}
