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

//! Permissive YAML decoding.
//!
//! Entity definitions are authored with custom tags (`!behaviour melee`,
//! `!loot goblin_table`) that no deserializer knows about. Rather than
//! failing, every tagged scalar is collapsed into a plain string made of the
//! tag followed by a single space and the scalar exactly as written, so
//! `!dice 1.50` stays `"!dice 1.50"` rather than a re-printed float.
//!
//! The deserializer only reveals whether a tagged node is a scalar or a
//! collection once it has consumed it, so documents are read twice: once
//! into a plain [`Value`] that records the shape, then again with a seed
//! that follows that shape and asks for raw text at every tagged scalar.

use serde::de::{self, DeserializeSeed, Deserializer, EnumAccess, IgnoredAny, MapAccess};
use serde::de::{SeqAccess, Unexpected, VariantAccess, Visitor};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::fmt;

/// Parses a YAML document, resolving unknown tags and `<<` merge keys.
pub fn parse_document(text: &str) -> Result<Value, serde_yaml::Error> {
    let shape: Value = serde_yaml::from_str(text)?;
    let mut value = if has_tags(&shape) {
        Literal(&shape).deserialize(serde_yaml::Deserializer::from_str(text))?
    } else {
        shape
    };
    value.apply_merge()?;
    Ok(value)
}

fn has_tags(value: &Value) -> bool {
    match value {
        Value::Tagged(_) => true,
        Value::Sequence(items) => items.iter().any(has_tags),
        Value::Mapping(entries) => entries
            .iter()
            .any(|(key, value)| has_tags(key) || has_tags(value)),
        _ => false,
    }
}

fn is_collection(value: &Value) -> bool {
    matches!(value, Value::Sequence(_) | Value::Mapping(_))
}

/// Re-reads a node whose shape is already known from a first parse.
///
/// Tagged scalars come back as `"<tag> <raw text>"`. Tagged sequences and
/// mappings cannot be joined with their tag and keep their resolved contents.
#[derive(Clone, Copy)]
struct Literal<'a>(&'a Value);

impl<'de> DeserializeSeed<'de> for Literal<'_> {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        if has_tags(self.0) {
            deserializer.deserialize_any(self)
        } else {
            Value::deserialize(deserializer)
        }
    }
}

impl<'de> Visitor<'de> for Literal<'_> {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a node shaped like {:?}", self.0)
    }

    fn visit_enum<A>(self, data: A) -> Result<Value, A::Error>
    where
        A: EnumAccess<'de>,
    {
        let Value::Tagged(tagged) = self.0 else {
            return Err(de::Error::invalid_type(Unexpected::Enum, &self));
        };
        let (_, contents) = data.variant::<IgnoredAny>()?;
        if is_collection(&tagged.value) {
            contents.newtype_variant_seed(Literal(&tagged.value))
        } else {
            let text: String = contents.newtype_variant()?;
            Ok(Value::String(format!("{} {}", tagged.tag, text)))
        }
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let Value::Sequence(shape) = self.0 else {
            return Err(de::Error::invalid_type(Unexpected::Seq, &self));
        };
        let mut items = Vec::with_capacity(shape.len());
        for item in shape {
            match seq.next_element_seed(Literal(item))? {
                Some(value) => items.push(value),
                None => return Err(de::Error::invalid_length(items.len(), &self)),
            }
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let Value::Mapping(shape) = self.0 else {
            return Err(de::Error::invalid_type(Unexpected::Map, &self));
        };
        let mut entries = Mapping::with_capacity(shape.len());
        for (key, value) in shape {
            let Some(key) = map.next_key_seed(Literal(key))? else {
                return Err(de::Error::invalid_length(entries.len(), &self));
            };
            let value = map.next_value_seed(Literal(value))?;
            entries.insert(key, value);
        }
        Ok(Value::Mapping(entries))
    }
}

/// Text of a resolved scalar value; `None` for collections.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}
