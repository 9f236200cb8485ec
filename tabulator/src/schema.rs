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

//! Component column discovery.

use crate::corpus::EntityCorpus;
use std::collections::BTreeSet;

/// Union of every component name declared anywhere in the corpus.
///
/// Names are ordered lexicographically so the exported columns are stable
/// between runs.
pub fn component_names(corpus: &EntityCorpus) -> BTreeSet<String> {
    corpus
        .iter()
        .flat_map(|(_, record)| record.component_names())
        .collect()
}
