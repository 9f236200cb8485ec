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

//! Flattening of the entity corpus into rows and columns.

use crate::config::ExportSettings;
use crate::corpus::{EntityCorpus, key_text};
use crate::tags::scalar_text;
use serde_yaml::Value;
use std::collections::BTreeSet;

/// Header and data rows of an export, ready to be written.
///
/// The header lists the static columns and then the component columns; it has
/// no cell for the entity name, which leads every data row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Builds the export table.
///
/// Rows follow corpus order. Every row is the entity name, one cell per
/// static column, then one cell per component column in header order. Missing
/// values are filled with the configured placeholder.
pub fn build_table(
    corpus: &EntityCorpus,
    components: &BTreeSet<String>,
    settings: &ExportSettings,
) -> Table {
    let header = settings
        .static_columns
        .iter()
        .chain(components.iter())
        .cloned()
        .collect();

    let rows = corpus
        .iter()
        .map(|(name, record)| {
            let statics = settings
                .static_columns
                .iter()
                .map(|column| record.field(column));
            let dynamics = components.iter().map(|column| record.component(column));

            std::iter::once(name.to_string())
                .chain(statics.chain(dynamics).map(|value| match value {
                    Some(value) => render_cell(value),
                    None => settings.placeholder.clone(),
                }))
                .collect()
        })
        .collect();

    Table { header, rows }
}

/// Text of a single cell.
///
/// Scalars print as they read in YAML (null prints empty). Sequences and
/// mappings print in compact flow style.
pub fn render_cell(value: &Value) -> String {
    let mut out = String::new();
    render_into(value, &mut out);
    out
}

fn render_into(value: &Value, out: &mut String) {
    match value {
        Value::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_into(item, out);
            }
            out.push(']');
        }
        Value::Mapping(entries) => {
            out.push('{');
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&key_text(key));
                out.push_str(": ");
                render_into(value, out);
            }
            out.push('}');
        }
        Value::Tagged(tagged) => {
            out.push_str(&tagged.tag.to_string());
            out.push(' ');
            render_into(&tagged.value, out);
        }
        scalar => out.push_str(&scalar_text(scalar).unwrap_or_default()),
    }
}
