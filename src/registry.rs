//! Instance registry: a flat JSON store of access-scoped instance records.
//!
//! The registry is externally owned; the gateway mostly just reads it. Every
//! lookup re-reads the store from disk, so registry changes are visible on
//! the very next call. There is deliberately no caching.

use crate::error::ServerError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// A named, access-scoped view of the database.
///
/// `allowed_tables` entries take one of three forms: bare table name,
/// qualified `schema.table`, or bare schema name. An absent list means no
/// tables are visible, not all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tables: Option<Vec<String>>,
}

/// File-backed instance store.
pub struct InstanceRegistry {
    path: PathBuf,
}

impl InstanceRegistry {
    /// Create a registry over a store path. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole collection. A missing store file is an empty registry.
    pub fn list(&self) -> Result<Vec<Instance>, ServerError> {
        if !self.path.exists() {
            debug!("Registry store {} does not exist yet", self.path.display());
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| {
            ServerError::registry(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            ServerError::registry(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    /// Overwrite the whole collection.
    pub fn save(&self, instances: &[Instance]) -> Result<(), ServerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ServerError::registry(format!(
                        "Failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let raw = serde_json::to_string_pretty(instances)
            .map_err(|e| ServerError::registry(format!("Failed to serialize registry: {}", e)))?;

        fs::write(&self.path, raw).map_err(|e| {
            ServerError::registry(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }

    /// Look up one instance by exact id, reading the store fresh.
    pub fn find(&self, id: &str) -> Result<Option<Instance>, ServerError> {
        Ok(self.list()?.into_iter().find(|instance| instance.id == id))
    }

    /// Append a record, generating an id when the caller left it empty.
    pub fn create(&self, mut instance: Instance) -> Result<Instance, ServerError> {
        if instance.id.is_empty() {
            instance.id = Uuid::new_v4().to_string();
        }

        let mut instances = self.list()?;
        if instances.iter().any(|existing| existing.id == instance.id) {
            return Err(ServerError::registry(format!(
                "Instance id already exists: {}",
                instance.id
            )));
        }

        instances.push(instance.clone());
        self.save(&instances)?;
        Ok(instance)
    }

    /// Remove exactly one record by id, preserving the order of the rest.
    /// Unknown ids yield a not-found outcome.
    pub fn delete(&self, id: &str) -> Result<Instance, ServerError> {
        let mut instances = self.list()?;
        let position = instances
            .iter()
            .position(|instance| instance.id == id)
            .ok_or_else(|| ServerError::instance_not_found(id))?;

        let removed = instances.remove(position);
        self.save(&instances)?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    struct TempStore(PathBuf);

    impl TempStore {
        fn new() -> Self {
            let path = env::temp_dir().join(format!("registry-test-{}.json", Uuid::new_v4()));
            Self(path)
        }

        fn registry(&self) -> InstanceRegistry {
            InstanceRegistry::new(&self.0)
        }
    }

    impl Drop for TempStore {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
        }
    }

    fn instance(id: &str, allowed: Option<&[&str]>) -> Instance {
        Instance {
            id: id.to_string(),
            name: format!("instance {}", id),
            description: String::new(),
            url: String::new(),
            allowed_tables: allowed.map(|list| list.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn test_missing_store_is_empty() {
        let store = TempStore::new();
        assert_eq!(store.registry().list().unwrap(), Vec::new());
    }

    #[test]
    fn test_save_and_list_round_trip() {
        let store = TempStore::new();
        let registry = store.registry();
        let records = vec![
            instance("a", Some(&["sales"])),
            instance("b", None),
        ];

        registry.save(&records).unwrap();
        assert_eq!(registry.list().unwrap(), records);
    }

    #[test]
    fn test_corrupt_store_is_a_registry_error() {
        let store = TempStore::new();
        fs::write(&store.0, "not json").unwrap();

        let registry = store.registry();
        let err = registry.list().unwrap_err();
        assert!(matches!(err, ServerError::Registry(_)));
        assert!(err.to_string().contains("Failed to parse"));

        let err = registry.find("some-id").unwrap_err();
        assert!(matches!(err, ServerError::Registry(_)));
    }

    #[test]
    fn test_find_is_exact_match() {
        let store = TempStore::new();
        let registry = store.registry();
        registry.save(&[instance("abc", Some(&["sales"]))]).unwrap();

        assert!(registry.find("abc").unwrap().is_some());
        assert!(registry.find("ABC").unwrap().is_none());
        assert!(registry.find("ab").unwrap().is_none());
    }

    #[test]
    fn test_create_generates_id() {
        let store = TempStore::new();
        let registry = store.registry();

        let created = registry.create(instance("", None)).unwrap();
        assert!(!created.id.is_empty());
        assert!(registry.find(&created.id).unwrap().is_some());
    }

    #[test]
    fn test_delete_unknown_id_is_not_found() {
        let store = TempStore::new();
        let registry = store.registry();
        registry.save(&[instance("a", None)]).unwrap();

        let err = registry.delete("nope").unwrap_err();
        assert!(matches!(err, ServerError::InstanceNotFound(_)));
        assert_eq!(registry.list().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_removes_exactly_one_and_keeps_order() {
        let store = TempStore::new();
        let registry = store.registry();
        registry
            .save(&[instance("a", None), instance("b", None), instance("c", None)])
            .unwrap();

        let removed = registry.delete("b").unwrap();
        assert_eq!(removed.id, "b");

        let remaining: Vec<String> = registry
            .list()
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(remaining, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_allowed_tables_serde_shape() {
        let record = instance("x", Some(&["Sales.Customers"]));
        let raw = serde_json::to_string(&record).unwrap();
        assert!(raw.contains("\"allowedTables\""));

        let missing: Instance =
            serde_json::from_str(r#"{"id":"y","name":"Y"}"#).unwrap();
        assert_eq!(missing.allowed_tables, None);
    }
}
