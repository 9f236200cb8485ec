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

//! Entity corpus loading and merging.
//!
//! Every definition file in a source directory holds a top-level mapping of
//! entity name to entity record. Files are merged into one [`EntityCorpus`]
//! in file-name order; a later record for the same name replaces the earlier
//! one wholesale.

use crate::error::{ExportError, ExportResult, value_kind};
use crate::table::render_cell;
use crate::tags::{parse_document, scalar_text};
use serde_yaml::{Mapping, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Key of the nested component mapping inside an entity record.
pub const COMPONENTS_KEY: &str = "components";

/// One entity definition: its top-level fields, components included.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityRecord {
    fields: Mapping,
}

impl EntityRecord {
    pub fn new(fields: Mapping) -> Self {
        Self { fields }
    }

    /// Top-level field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The component mapping, if the record declares one.
    ///
    /// A `components:` key with a null value counts as no components.
    pub fn components(&self) -> Option<&Mapping> {
        self.fields.get(COMPONENTS_KEY).and_then(Value::as_mapping)
    }

    /// Value of a single component, matched against the key's text.
    pub fn component(&self, name: &str) -> Option<&Value> {
        let components = self.components()?;
        components.get(name).or_else(|| {
            components
                .iter()
                .find(|(key, _)| key_text(key) == name)
                .map(|(_, value)| value)
        })
    }

    /// Names of the components this record declares, in declaration order.
    pub fn component_names(&self) -> impl Iterator<Item = String> + '_ {
        self.components()
            .into_iter()
            .flat_map(|components| components.keys().map(key_text))
    }
}

/// Insertion-ordered collection of entity records keyed by name.
#[derive(Clone, Debug, Default)]
pub struct EntityCorpus {
    entries: Vec<(String, EntityRecord)>,
    index: HashMap<String, usize>,
}

impl EntityCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `record` under `name`, returning the record it replaced.
    ///
    /// A replaced name keeps its original position in iteration order.
    pub fn insert(&mut self, name: String, record: EntityRecord) -> Option<EntityRecord> {
        match self.index.get(&name) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, record)),
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, record));
                None
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&EntityRecord> {
        self.index.get(name).map(|&position| &self.entries[position].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityRecord)> {
        self.entries.iter().map(|(name, record)| (name.as_str(), record))
    }

    #[cfg(test)]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Merges a parsed definition document into the corpus.
    ///
    /// `source` only labels errors and log lines. Returns the names the
    /// document defined, in document order.
    pub fn merge_document(&mut self, source: &Path, document: Value) -> ExportResult<Vec<String>> {
        let entities = match document {
            Value::Mapping(entities) => entities,
            other => {
                return Err(ExportError::NotAMapping {
                    path: source.to_path_buf(),
                    found: value_kind(&other),
                });
            }
        };

        let mut inserted = Vec::with_capacity(entities.len());
        let mut seen = HashSet::with_capacity(entities.len());
        for (key, value) in entities {
            let name = entity_name(source, &key)?;
            let record = entity_record(source, &name, value)?;
            let collides = !seen.insert(name.clone());
            if collides {
                warn!(
                    "Entity key {:?} in {:?} has the same name '{}' as an earlier key, replacing its record",
                    key,
                    source,
                    name
                );
            }
            if self.insert(name.clone(), record).is_some() && !collides {
                warn!("Entity '{}' redefined by {:?}, replacing earlier record", name, source);
            }
            if !collides {
                inserted.push(name);
            }
        }
        Ok(inserted)
    }
}

/// Text of a mapping key. Non-scalar keys use their flow-style cell text.
pub(crate) fn key_text(key: &Value) -> String {
    scalar_text(key).unwrap_or_else(|| render_cell(key))
}

fn entity_name(source: &Path, key: &Value) -> ExportResult<String> {
    scalar_text(key).ok_or_else(|| ExportError::MalformedEntity {
        path: source.to_path_buf(),
        name: format!("{:?}", key),
        reason: format!("entity name must be a scalar, found {}", value_kind(key)),
    })
}

fn entity_record(source: &Path, name: &str, value: Value) -> ExportResult<EntityRecord> {
    let malformed = |reason: String| ExportError::MalformedEntity {
        path: source.to_path_buf(),
        name: name.to_string(),
        reason,
    };

    let fields = match value {
        Value::Mapping(fields) => fields,
        other => {
            return Err(malformed(format!(
                "record must be a mapping, found {}",
                value_kind(&other)
            )));
        }
    };

    match fields.get(COMPONENTS_KEY) {
        Some(Value::Mapping(components)) => {
            let mut seen = HashSet::with_capacity(components.len());
            for key in components.keys() {
                let text = key_text(key);
                if !seen.insert(text.clone()) {
                    warn!(
                        "Entity '{}' in {:?} has several components named '{}', only one is exported",
                        name, source, text
                    );
                }
            }
            Ok(EntityRecord::new(fields))
        }
        None | Some(Value::Null) => Ok(EntityRecord::new(fields)),
        Some(other) => Err(malformed(format!(
            "'{}' must be a mapping, found {}",
            COMPONENTS_KEY,
            value_kind(other)
        ))),
    }
}

/// Lists the definition files directly inside `dir`, sorted by file name.
///
/// Only regular files whose extension is in `extensions` are kept. The sort
/// fixes which record wins when two files define the same entity.
pub fn definition_files(dir: &Path, extensions: &[String]) -> ExportResult<Vec<PathBuf>> {
    let read_dir_error = |source| ExportError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        let path = entry.path();
        if !has_extension(&path, extensions) {
            continue;
        }
        if !path.is_file() {
            debug!("Skipping non-file entry {:?}", path);
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extensions.iter().any(|allowed| allowed == extension))
}

/// Reads and parses one definition file.
pub fn load_file(path: &Path) -> ExportResult<Value> {
    let text = std::fs::read_to_string(path).map_err(|source| ExportError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&text).map_err(|source| ExportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads every definition file in `dir` into a single corpus.
///
/// Returns the corpus and the number of files read. The first unreadable or
/// malformed file aborts the load.
pub fn load_corpus(dir: &Path, extensions: &[String]) -> ExportResult<(EntityCorpus, usize)> {
    let files = definition_files(dir, extensions)?;
    info!("Found {} definition files in {:?}", files.len(), dir);

    let mut corpus = EntityCorpus::new();
    for path in &files {
        let document = load_file(path)?;
        let names = corpus.merge_document(path, document)?;
        debug!("Loaded {} entities from {:?}", names.len(), path);
    }
    Ok((corpus, files.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn record(text: &str) -> EntityRecord {
        match serde_yaml::from_str::<Value>(text).unwrap() {
            Value::Mapping(fields) => EntityRecord::new(fields),
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    fn default_extensions() -> Vec<String> {
        vec!["yaml".to_string(), "yml".to_string()]
    }

    #[test]
    fn test_record_accessors() {
        let goblin = record("min_level: 2\ncomponents:\n  ai: basic\n");
        assert_eq!(goblin.field("min_level"), Some(&Value::from(2)));
        assert_eq!(goblin.field("spawn_chance"), None);
        assert_eq!(goblin.component("ai"), Some(&Value::from("basic")));
        assert_eq!(goblin.component("loot"), None);
    }

    #[test]
    fn test_component_lookup_by_key_text() {
        let golem = record("components:\n  1: core\n  true: armored\n  ai: guard\n");
        assert_eq!(golem.component("1"), Some(&Value::from("core")));
        assert_eq!(golem.component("true"), Some(&Value::from("armored")));
        assert_eq!(
            golem.component_names().collect::<Vec<_>>(),
            vec!["1", "true", "ai"]
        );
    }

    #[test]
    fn test_null_components_count_as_empty() {
        let rat = record("components:\n");
        assert!(rat.components().is_none());
        assert_eq!(rat.component("ai"), None);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut corpus = EntityCorpus::new();
        assert!(corpus.insert("goblin".into(), record("min_level: 2")).is_none());
        assert!(corpus.insert("orc".into(), record("min_level: 4")).is_none());

        let replaced = corpus.insert("goblin".into(), record("spawn_chance: 0.5"));
        assert_eq!(replaced, Some(record("min_level: 2")));

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.names().collect::<Vec<_>>(), vec!["goblin", "orc"]);
        let goblin = corpus.get("goblin").unwrap();
        assert_eq!(goblin.field("min_level"), None);
        assert_eq!(goblin.field("spawn_chance"), Some(&Value::from(0.5)));
    }

    #[test]
    fn test_merge_document_returns_names_in_order() {
        let mut corpus = EntityCorpus::new();
        let document = parse_document("wolf: {min_level: 1}\nbear: {min_level: 5}\n").unwrap();
        let names = corpus.merge_document(Path::new("beasts.yaml"), document).unwrap();
        assert_eq!(names, vec!["wolf", "bear"]);
        assert_eq!(corpus.len(), 2);
    }

    #[traced_test]
    #[test]
    fn test_merge_document_warns_on_redefinition() {
        let mut corpus = EntityCorpus::new();
        corpus
            .merge_document(Path::new("a.yaml"), parse_document("imp: {min_level: 1}\n").unwrap())
            .unwrap();
        assert!(!logs_contain("redefined"));
        corpus
            .merge_document(Path::new("b.yaml"), parse_document("imp: {min_level: 3}\n").unwrap())
            .unwrap();
        assert!(logs_contain("Entity 'imp' redefined"));
        assert_eq!(corpus.len(), 1);
    }

    #[traced_test]
    #[test]
    fn test_merge_document_warns_on_colliding_entity_keys() {
        let mut corpus = EntityCorpus::new();
        let document = parse_document("1: {min_level: 1}\n\"1\": {min_level: 2}\n").unwrap();
        let names = corpus.merge_document(Path::new("numbers.yaml"), document).unwrap();
        assert_eq!(names, vec!["1"]);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.get("1").unwrap().field("min_level"), Some(&Value::from(2)));
        assert!(logs_contain("has the same name '1' as an earlier key"));
        assert!(!logs_contain("redefined"));
    }

    #[traced_test]
    #[test]
    fn test_merge_document_warns_on_colliding_component_keys() {
        let mut corpus = EntityCorpus::new();
        let document = parse_document("golem:\n  components:\n    1: core\n    \"1\": shell\n").unwrap();
        corpus.merge_document(Path::new("golems.yaml"), document).unwrap();
        assert!(logs_contain("has several components named '1'"));
    }

    #[test]
    fn test_non_scalar_component_key_uses_flow_text() {
        let golem = record("components:\n  ? [fire, ice]\n  : resist\n");
        assert_eq!(golem.component_names().collect::<Vec<_>>(), vec!["[fire, ice]"]);
        assert_eq!(golem.component("[fire, ice]"), Some(&Value::from("resist")));
    }

    #[test]
    fn test_merge_document_numeric_key() {
        let mut corpus = EntityCorpus::new();
        let document = parse_document("42: {min_level: 1}\n").unwrap();
        corpus.merge_document(Path::new("numbers.yaml"), document).unwrap();
        assert!(corpus.get("42").is_some());
    }

    #[test]
    fn test_merge_document_rejects_non_mapping_root() {
        let mut corpus = EntityCorpus::new();
        let err = corpus
            .merge_document(Path::new("list.yaml"), parse_document("- goblin\n").unwrap())
            .unwrap_err();
        assert!(matches!(err, ExportError::NotAMapping { found: "a sequence", .. }));
    }

    #[test]
    fn test_merge_document_rejects_empty_document() {
        let mut corpus = EntityCorpus::new();
        let err = corpus
            .merge_document(Path::new("empty.yaml"), parse_document("").unwrap())
            .unwrap_err();
        assert!(matches!(err, ExportError::NotAMapping { found: "null", .. }));
    }

    #[test]
    fn test_merge_document_rejects_scalar_record() {
        let mut corpus = EntityCorpus::new();
        let err = corpus
            .merge_document(Path::new("bad.yaml"), parse_document("goblin: 3\n").unwrap())
            .unwrap_err();
        match err {
            ExportError::MalformedEntity { name, .. } => assert_eq!(name, "goblin"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_merge_document_rejects_list_components() {
        let mut corpus = EntityCorpus::new();
        let document = parse_document("goblin:\n  components: [ai, loot]\n").unwrap();
        let err = corpus.merge_document(Path::new("bad.yaml"), document).unwrap_err();
        assert!(matches!(err, ExportError::MalformedEntity { .. }));
    }

    #[test]
    fn test_definition_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.yml", "a.yaml", "notes.txt", "c.YAML", "README"] {
            std::fs::write(dir.path().join(name), "x: {}\n").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.yaml")).unwrap();

        let files = definition_files(dir.path(), &default_extensions()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|path| path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.yaml", "b.yml"]);
    }

    #[test]
    fn test_definition_files_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = definition_files(&missing, &default_extensions()).unwrap_err();
        assert!(matches!(err, ExportError::ReadDir { .. }));
    }

    #[test]
    fn test_load_corpus_last_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.yaml"),
            "goblin: {min_level: 2, components: {ai: basic}}\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b.yaml"),
            "goblin: {spawn_chance: 0.5, components: {loot: table1}}\n",
        )
        .unwrap();

        let (corpus, files) = load_corpus(dir.path(), &default_extensions()).unwrap();
        assert_eq!(files, 2);
        assert_eq!(corpus.len(), 1);
        let goblin = corpus.get("goblin").unwrap();
        assert_eq!(goblin.field("min_level"), None);
        assert_eq!(goblin.component("ai"), None);
        assert_eq!(goblin.component("loot"), Some(&Value::from("table1")));
    }

    #[test]
    fn test_load_corpus_fails_on_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.yaml"), "goblin: {min_level: 2}\n").unwrap();
        std::fs::write(dir.path().join("b.yaml"), "goblin: [oops\n").unwrap();

        let err = load_corpus(dir.path(), &default_extensions()).unwrap_err();
        assert!(matches!(err, ExportError::Parse { .. }));
    }
}
