use crate::core::contracts::BoxError;
use crate::core::error_capability::RelationError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

pub type RelationAccessor<C> =
    Arc<dyn Fn(&C, &Value) -> Result<Option<Value>, BoxError> + Send + Sync>;

/// Explicit table from a foreign-key field (`author_id`) to the accessor that
/// loads the related record. Filled at startup, read afterwards.
pub struct RelationResolver<C> {
    accessors: BTreeMap<String, RelationAccessor<C>>,
}

impl<C> RelationResolver<C> {
    pub fn new() -> Self {
        Self {
            accessors: BTreeMap::new(),
        }
    }

    /// Returns `true` when an accessor for `field` was replaced.
    pub fn register<F>(&mut self, field: impl Into<String>, accessor: F) -> bool
    where
        F: Fn(&C, &Value) -> Result<Option<Value>, BoxError> + Send + Sync + 'static,
    {
        self.accessors
            .insert(field.into(), Arc::new(accessor))
            .is_some()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.accessors.contains_key(field)
    }

    pub fn fields(&self) -> Vec<&str> {
        self.accessors.keys().map(String::as_str).collect()
    }

    pub fn resolve(&self, field: &str, ctx: &C, key: &Value) -> Result<Option<Value>, RelationError> {
        let accessor = self
            .accessors
            .get(field)
            .ok_or_else(|| RelationError::UnknownField(field.to_string()))?;
        accessor(ctx, key).map_err(|cause| RelationError::Accessor {
            field: field.to_string(),
            cause,
        })
    }

    /// Loads every registered relation present in `record` and returns them
    /// keyed by relation name (`author_id` becomes `author`). Null keys are
    /// skipped.
    pub fn expand(&self, ctx: &C, record: &Map<String, Value>) -> Result<Map<String, Value>, RelationError> {
        let mut related = Map::new();
        for (field, key) in record {
            if key.is_null() || !self.contains(field) {
                continue;
            }
            if let Some(value) = self.resolve(field, ctx, key)? {
                related.insert(relation_name(field).to_string(), value);
            }
        }
        Ok(related)
    }
}

impl<C> Default for RelationResolver<C> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn relation_name(field: &str) -> &str {
    field
        .strip_suffix("_id")
        .or_else(|| field.strip_suffix("Id"))
        .or_else(|| field.strip_suffix("ID"))
        .filter(|name| !name.is_empty())
        .unwrap_or(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    struct Store {
        users: HashMap<i64, Value>,
    }

    fn resolver() -> RelationResolver<Store> {
        let mut resolver = RelationResolver::new();
        resolver.register("author_id", |store: &Store, key: &Value| {
            let id = key.as_i64().ok_or("author_id must be an integer")?;
            Ok(store.users.get(&id).cloned())
        });
        resolver
    }

    fn store() -> Store {
        Store {
            users: HashMap::from([(1, json!({"id": 1, "name": "ada"}))]),
        }
    }

    #[test]
    fn test_resolve_registered_field() {
        let resolver = resolver();
        let found = resolver.resolve("author_id", &store(), &json!(1)).unwrap();
        assert_eq!(found, Some(json!({"id": 1, "name": "ada"})));
        assert_eq!(resolver.resolve("author_id", &store(), &json!(9)).unwrap(), None);
    }

    #[test]
    fn test_unknown_field_and_accessor_failure() {
        let resolver = resolver();
        assert!(matches!(
            resolver.resolve("scene_id", &store(), &json!(1)),
            Err(RelationError::UnknownField(f)) if f == "scene_id"
        ));
        assert!(matches!(
            resolver.resolve("author_id", &store(), &json!("x")),
            Err(RelationError::Accessor { field, .. }) if field == "author_id"
        ));
    }

    #[test]
    fn test_expand_record() {
        let resolver = resolver();
        let record = json!({"id": 5, "title": "hello", "author_id": 1, "editor_id": 2});
        let related = resolver
            .expand(&store(), record.as_object().unwrap())
            .unwrap();

        assert_eq!(related.len(), 1);
        assert_eq!(related["author"]["name"], "ada");
    }

    #[test]
    fn test_relation_name() {
        assert_eq!(relation_name("author_id"), "author");
        assert_eq!(relation_name("sceneId"), "scene");
        assert_eq!(relation_name("_id"), "_id");
        assert_eq!(relation_name("title"), "title");
    }

    #[test]
    fn test_register_reports_replacement() {
        let mut resolver = resolver();
        assert!(resolver.register("author_id", |_: &Store, _: &Value| Ok(None)));
        assert!(!resolver.register("scene_id", |_: &Store, _: &Value| Ok(None)));
        assert_eq!(resolver.fields(), vec!["author_id", "scene_id"]);
    }
}
