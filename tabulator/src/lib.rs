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

//! Entity Tabulator Library
//!
//! Flattens a directory of YAML entity definitions into one CSV table:
//! - Loading and merging definition files into an entity corpus
//! - Permissive decoding of custom YAML tags
//! - Discovery of the component columns
//! - Building and writing the table

pub mod config;
pub mod corpus;
pub mod error;
pub mod export;
pub mod schema;
pub mod table;
pub mod tags;
pub mod writer;

// Re-export commonly used types
pub use config::{Arguments, Configuration, ExportSettings};
pub use corpus::{EntityCorpus, EntityRecord};
pub use error::{ExportError, ExportResult};
pub use export::{ExportSummary, run};
pub use table::Table;
