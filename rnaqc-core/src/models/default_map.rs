use fxhash::FxHashMap;

///
/// String keyed map where an absent key reads as `V::default()`.
///
/// Reads never insert; writes go through [`DefaultMap::entry_or_default`], which
/// creates the zero value on first touch.
///
#[derive(Debug, Clone)]
pub struct DefaultMap<V> {
    inner: FxHashMap<String, V>,
}

impl<V> Default for DefaultMap<V> {
    fn default() -> Self {
        DefaultMap {
            inner: FxHashMap::default(),
        }
    }
}

impl<V: Default> DefaultMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable slot for `key`, inserting the default value if absent.
    pub fn entry_or_default(&mut self, key: &str) -> &mut V {
        self.inner.entry(key.to_string()).or_default()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.inner.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.inner.remove(key)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in lexicographic order, for reproducible reports.
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.inner.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl<V: Default + Clone> DefaultMap<V> {
    /// Value stored under `key`, or the default when absent.
    pub fn value(&self, key: &str) -> V {
        self.inner.get(key).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_absent_key_reads_default_without_inserting() {
        let map: DefaultMap<f64> = DefaultMap::new();
        assert_eq!(map.value("missing"), 0.0);
        assert!(map.is_empty());
    }

    #[rstest]
    fn test_entry_or_default_accumulates() {
        let mut map: DefaultMap<u64> = DefaultMap::new();
        *map.entry_or_default("a") += 2;
        *map.entry_or_default("a") += 3;
        *map.entry_or_default("b") += 1;
        assert_eq!(map.value("a"), 5);
        assert_eq!(map.sorted_keys(), vec!["a", "b"]);
    }

    #[rstest]
    fn test_vec_values() {
        let mut map: DefaultMap<Vec<u32>> = DefaultMap::new();
        map.entry_or_default("g").push(1);
        map.entry_or_default("g").push(2);
        assert_eq!(map.value("g"), vec![1, 2]);
        assert_eq!(map.remove("g"), Some(vec![1, 2]));
        assert_eq!(map.value("g"), Vec::<u32>::new());
    }
}
