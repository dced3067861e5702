//! JSON file store for the endpoint catalog.
//!
//! The [`CatalogStore`] holds one file, `api.json` by default, containing the whole
//! [`Catalog`] as a JSON object keyed by endpoint name.
//!
//! **Access rules:**
//! - Loading a missing or malformed file is a [`JirestError::Load`].
//! - Saving replaces the file in one rename; readers never see a partial catalog.

use std::io::Write;
use std::path::{Path, PathBuf};

use jirest_shared::{Catalog, JirestError, Result};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Handle to the persisted catalog file.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and parse the catalog.
    pub fn load(&self) -> Result<Catalog> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| JirestError::load(&self.path, e.to_string()))?;
        let catalog = deserialize(&content).map_err(|e| JirestError::load(&self.path, e))?;

        debug!(path = %self.path.display(), endpoints = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Overwrite the file with `catalog`.
    ///
    /// The JSON is written to a temporary file in the same directory and renamed over
    /// the target, so a failed write leaves the previous catalog intact.
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| JirestError::store(&self.path, e.to_string()))?;

        let json = serialize(catalog).map_err(|e| JirestError::store(&self.path, e))?;

        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|e| JirestError::store(&self.path, e.to_string()))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| JirestError::store(&self.path, e.to_string()))?;
        tmp.persist(&self.path)
            .map_err(|e| JirestError::store(&self.path, e.error.to_string()))?;

        info!(path = %self.path.display(), endpoints = catalog.len(), "catalog stored");
        Ok(())
    }
}

/// Render a catalog as the persisted JSON document.
pub fn serialize(catalog: &Catalog) -> std::result::Result<String, String> {
    let mut json = serde_json::to_string_pretty(catalog).map_err(|e| e.to_string())?;
    json.push('\n');
    Ok(json)
}

/// Parse the persisted JSON document.
pub fn deserialize(json: &str) -> std::result::Result<Catalog, String> {
    serde_json::from_str(json).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jirest_shared::{EndpointRecord, HttpMethod, Param};

    fn sample_catalog() -> Catalog {
        [
            EndpointRecord {
                name: "Get issue".into(),
                http_method: HttpMethod::Get,
                path: "/rest/api/3/issue/{issueIdOrKey}".into(),
                description: "Returns the details for an issue.".into(),
                params: vec![
                    Param {
                        param_type: Some("string".into()),
                        description: Some("The ID or key of the issue.".into()),
                        ..Param::named("issueIdOrKey")
                    },
                    Param {
                        default: Some("false".into()),
                        ..Param::named("updateHistory")
                    },
                    Param::named("fields"),
                ],
                command: "curl --url '/rest/api/3/issue/{issueIdOrKey}?fields={fields}'".into(),
                digest: "0".repeat(64),
            },
            EndpointRecord {
                name: "Create project".into(),
                http_method: HttpMethod::Post,
                path: "/rest/api/3/project".into(),
                description: String::new(),
                params: vec![],
                command: "curl --data '{\n  \"key\": \"{key}\"\n}'".into(),
                digest: "f".repeat(64),
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn roundtrip_is_lossless() {
        let catalog = sample_catalog();
        let json = serialize(&catalog).unwrap();
        let parsed = deserialize(&json).unwrap();

        assert_eq!(parsed, catalog);
        let params = &parsed.get("Get issue").unwrap().params;
        assert_eq!(params[1].param_type, None);
        assert_eq!(params[1].default.as_deref(), Some("false"));
        assert_eq!(params[2], Param::named("fields"));
    }

    #[test]
    fn persisted_layout_matches_store_format() {
        let json = serialize(&sample_catalog()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let record = &value["Get issue"];
        let keys: Vec<&str> = record.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["name", "http_method", "path", "description", "params", "command", "digest"]
        );
        assert_eq!(record["params"][0]["type"], "string");
        assert!(record["params"][2].get("type").is_none());
        assert!(record["params"][2].get("default").is_none());
    }

    #[test]
    fn reads_legacy_null_fields() {
        let json = r#"{"Get issue":{"name":"Get issue","http_method":"GET","path":"/x",
            "description":"d","params":[{"name":"a","type":null,"description":null,"default":null}],
            "command":"curl","digest":"ab"}}"#;
        let catalog = deserialize(json).unwrap();
        assert_eq!(catalog.get("Get issue").unwrap().params[0], Param::named("a"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(dir.path().join("nested").join("api.json"));
        assert!(!store.exists());

        let catalog = sample_catalog();
        store.save(&catalog).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), catalog);

        // Overwrite replaces the whole catalog
        store.save(&Catalog::new()).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn missing_store_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(dir.path().join("api.json"));
        assert!(matches!(store.load(), Err(JirestError::Load { .. })));
    }

    #[test]
    fn malformed_store_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = CatalogStore::new(&path).load().unwrap_err();
        assert!(matches!(err, JirestError::Load { .. }));
        assert!(err.to_string().contains("api.json"));
    }

    #[test]
    fn unwritable_store_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        // Parent "directory" is a regular file
        let store = CatalogStore::new(blocker.join("api.json"));
        assert!(matches!(store.save(&sample_catalog()), Err(JirestError::Store { .. })));
    }
}
