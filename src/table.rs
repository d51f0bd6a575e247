use std::collections::HashMap;

use crate::{object::ObjRef, string::ObjString, value::Value};

#[derive(Debug, Clone, Copy)]
struct Entry {
    key: ObjRef,
    value: Value,
}

/// Hash table keyed by interned strings.
///
/// Keys are grouped by their precomputed string hash. Distinct contents
/// that collide share a bucket and are told apart by comparing bytes, which
/// is what [`Table::find_string`] needs to run before a string object exists.
#[derive(Debug, Default)]
pub struct Table {
    buckets: HashMap<u32, Vec<Entry>>,
    count: usize,
}

impl Table {
    pub fn new() -> Self {
        Table::default()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns `true` if `key` was not in the table yet.
    pub fn set(&mut self, key: ObjRef, hash: u32, value: Value) -> bool {
        let bucket = self.buckets.entry(hash).or_default();

        if let Some(entry) = bucket.iter_mut().find(|e| e.key == key) {
            entry.value = value;
            false
        } else {
            bucket.push(Entry { key, value });
            self.count += 1;
            true
        }
    }

    pub fn get(&self, key: ObjRef, hash: u32) -> Option<Value> {
        self.buckets
            .get(&hash)?
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value)
    }

    /// Looks a string up by contents.
    ///
    /// `resolve` maps a key back to its string object; keys it cannot
    /// resolve are skipped.
    pub fn find_string<'a>(
        &self,
        chars: &[u8],
        hash: u32,
        resolve: impl Fn(ObjRef) -> Option<&'a ObjString>,
    ) -> Option<ObjRef> {
        self.buckets.get(&hash)?.iter().find_map(|e| {
            let s = resolve(e.key)?;
            (s.hash() == hash && s.as_bytes() == chars).then(|| e.key)
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{heap::Heap, string::hash_string};

    #[test]
    fn set_reports_new_keys() {
        let mut table = Table::new();
        let key = ObjRef::new(0, 0);

        assert!(table.set(key, 1, Value::Nil));
        assert!(!table.set(key, 1, Value::from(2.0)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(key, 1), Some(Value::Number(2.0)));
    }

    #[test]
    fn get_misses_unknown_keys() {
        let mut table = Table::new();
        table.set(ObjRef::new(0, 0), 1, Value::Nil);

        assert_eq!(table.get(ObjRef::new(0, 1), 1), None);
        assert_eq!(table.get(ObjRef::new(0, 0), 2), None);
        assert!(Table::new().is_empty());
    }

    #[test]
    fn find_string_compares_contents() {
        let mut heap = Heap::new();
        let key = ObjString::copy(b"key", &mut heap);
        let hash = hash_string(b"key");

        let mut table = Table::new();
        table.set(key, hash, Value::Nil);

        let resolve = |r: ObjRef| heap.get_as::<ObjString>(r).ok();
        assert_eq!(table.find_string(b"key", hash, resolve), Some(key));
        assert_eq!(table.find_string(b"kez", hash, resolve), None);
        assert_eq!(table.find_string(b"key", hash ^ 1, resolve), None);
    }

    #[test]
    fn colliding_hashes_stay_distinct() {
        let mut heap = Heap::new();
        // Known FNV-1a 32-bit collision.
        assert_eq!(hash_string(b"costarring"), hash_string(b"liquid"));

        let a = ObjString::copy(b"costarring", &mut heap);
        let b = ObjString::copy(b"liquid", &mut heap);

        assert_ne!(a, b);
        assert_eq!(ObjString::copy(b"costarring", &mut heap), a);
        assert_eq!(ObjString::copy(b"liquid", &mut heap), b);
        assert_eq!(heap.len(), 2);
    }
}
