//! Process-wide schema cache
//!
//! Schemas are built once per record type and shared through this cache,
//! keyed by type name. Entries are never mutated after insertion; concurrent
//! builders racing on the same type converge on whichever entry was inserted
//! first and the loser's build result is discarded.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::schema::{RecordDescription, RecordSchema, SchemaOptions};
use crate::SchemaResult;

static GLOBAL: Lazy<SchemaCache> = Lazy::new(SchemaCache::new);

/// Read-mostly cache of compiled schemas keyed by type name
pub struct SchemaCache {
    inner: RwLock<FxHashMap<String, Arc<RecordSchema>>>,
}

impl SchemaCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(FxHashMap::default()),
        }
    }

    /// The process-wide cache used by the codec to resolve nested schemas
    pub fn global() -> &'static SchemaCache {
        &GLOBAL
    }

    /// Return the cached schema for the description's type, building and
    /// inserting it on first use
    ///
    /// Idempotent: a second call for the same type name returns the cached
    /// schema without rebuilding. The build runs outside the cache lock, so
    /// concurrent calls for the same type are safe; first insert wins.
    pub fn schema(
        &self,
        description: &RecordDescription,
        options: &SchemaOptions,
    ) -> SchemaResult<Arc<RecordSchema>> {
        if let Some(schema) = self.get(description.type_name()) {
            return Ok(schema);
        }
        let built = RecordSchema::build(description, options)?;
        Ok(self.insert(built))
    }

    /// Look up a schema by type name
    pub fn get(&self, type_name: &str) -> Option<Arc<RecordSchema>> {
        self.inner.read().get(type_name).cloned()
    }

    /// Whether a schema for the type name is cached
    pub fn contains(&self, type_name: &str) -> bool {
        self.inner.read().contains_key(type_name)
    }

    /// Insert a schema, first-insert-wins
    ///
    /// Returns the entry that ended up in the cache, which is the existing
    /// one if another insertion got there first.
    pub fn insert(&self, schema: RecordSchema) -> Arc<RecordSchema> {
        let mut map = self.inner.write();
        if let Some(existing) = map.get(schema.type_name()) {
            return Arc::clone(existing);
        }
        tracing::debug!(type_name = schema.type_name(), "caching schema");
        let arc = Arc::new(schema);
        map.insert(arc.type_name().to_string(), Arc::clone(&arc));
        arc
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;

    #[test]
    fn test_schema_is_cached() {
        let cache = SchemaCache::new();
        let desc = RecordDescription::new("cache_tests::Point")
            .property("x", FieldKind::Float)
            .property("y", FieldKind::Float);

        let first = cache.schema(&desc, &SchemaOptions::default()).unwrap();
        let second = cache.schema(&desc, &SchemaOptions::default()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_first_insert_wins() {
        let cache = SchemaCache::new();
        let desc_a = RecordDescription::new("cache_tests::Same").property("a", FieldKind::Bool);
        let desc_b = RecordDescription::new("cache_tests::Same").property("b", FieldKind::Bool);

        let a = RecordSchema::build(&desc_a, &SchemaOptions::default()).unwrap();
        let b = RecordSchema::build(&desc_b, &SchemaOptions::default()).unwrap();

        let won = cache.insert(a);
        let kept = cache.insert(b);
        assert!(Arc::ptr_eq(&won, &kept));
        assert_eq!(kept.fields()[0].name(), "a");
    }

    #[test]
    fn test_concurrent_builds_converge() {
        let cache = Arc::new(SchemaCache::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                let desc = RecordDescription::new("cache_tests::Shared")
                    .property("value", FieldKind::Decimal);
                cache.schema(&desc, &SchemaOptions::default()).unwrap()
            }));
        }
        let schemas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for schema in &schemas[1..] {
            assert!(Arc::ptr_eq(&schemas[0], schema));
        }
    }

    #[test]
    fn test_global_is_shared() {
        let desc = RecordDescription::new("cache_tests::GlobalEntry")
            .property("value", FieldKind::Text);
        let built = SchemaCache::global()
            .schema(&desc, &SchemaOptions::default())
            .unwrap();
        let fetched = SchemaCache::global().get("cache_tests::GlobalEntry").unwrap();
        assert!(Arc::ptr_eq(&built, &fetched));
    }
}
