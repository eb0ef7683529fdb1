// Rewind - Time-Travel Debugger Client
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use std::{
    collections::HashMap,
    hash::Hash,
    ops::{Deref, DerefMut},
};

/// A cache map that tracks three states for each key:
/// 1. Key not in map = Not fetched
/// 2. Key maps to Some(V) = Fetched with valid value
/// 3. Key maps to None = Fetched but no valid value
#[derive(Debug, Clone)]
pub struct FetchCache<K, V> {
    data: HashMap<K, Option<V>>,
}

impl<K, V> Deref for FetchCache<K, V> {
    type Target = HashMap<K, Option<V>>;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<K, V> DerefMut for FetchCache<K, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl<K, V> FetchCache<K, V>
where
    K: Eq + Hash,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self { data: HashMap::new() }
    }

    /// Check if the cache has an entry for the given key
    pub fn has_cached(&self, key: &K) -> bool {
        self.data.contains_key(key)
    }

    /// Returns `None` when the key was never fetched, `Some(None)` when it was
    /// fetched without a valid value.
    pub fn get_cached(&self, key: &K) -> Option<Option<&V>> {
        self.data.get(key).map(Option::as_ref)
    }

    /// Records a fetch result.
    pub fn record(&mut self, key: K, value: Option<V>) {
        self.data.insert(key, value);
    }
}

impl<K, V> Default for FetchCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
