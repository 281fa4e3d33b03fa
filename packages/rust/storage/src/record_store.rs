//! JSON-file record store keyed by entry identifier.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use timeline_shared::{EntryId, Result, TimelineError};

use crate::fs::write_atomic;

/// Indentation of the persisted JSON, kept human-diffable.
const JSON_INDENT: &[u8] = b"    ";

/// Persisted mapping `EntryId → payload`, loaded whole and rewritten whole.
///
/// The store is the completion ledger of an enrichment pass: an id present
/// here is done. Keys are kept sorted so an unchanged store always
/// serializes to identical bytes.
#[derive(Debug)]
pub struct RecordStore<P> {
    path: PathBuf,
    entries: BTreeMap<EntryId, P>,
}

impl<P> RecordStore<P>
where
    P: Serialize + DeserializeOwned,
{
    /// Load the store at `path`. A missing file is an empty store.
    ///
    /// Keys that are not valid entry identifiers (left over from older
    /// row-index keyed files) are dropped with a warning.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no record store yet, starting empty");
                return Ok(Self {
                    path,
                    entries: BTreeMap::new(),
                });
            }
            Err(e) => return Err(TimelineError::io(&path, e)),
        };

        let raw: BTreeMap<String, P> = serde_json::from_str(&content).map_err(|e| {
            TimelineError::Storage(format!("invalid record store {}: {e}", path.display()))
        })?;

        let total = raw.len();
        let entries: BTreeMap<EntryId, P> = raw
            .into_iter()
            .filter_map(|(key, payload)| key.parse::<EntryId>().ok().map(|id| (id, payload)))
            .collect();

        if entries.len() < total {
            warn!(
                path = %path.display(),
                dropped = total - entries.len(),
                "ignoring keys that are not entry identifiers"
            );
        }

        info!(path = %path.display(), entries = entries.len(), "record store loaded");
        Ok(Self { path, entries })
    }

    /// Rewrite the whole store to disk.
    pub fn save(&self) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.entries.serialize(&mut serializer).map_err(|e| {
            TimelineError::Storage(format!("failed to serialize record store: {e}"))
        })?;

        write_atomic(&self.path, &buf)
    }

    /// Insert `payload` for `id` and persist immediately.
    pub fn put(&mut self, id: EntryId, payload: P) -> Result<()> {
        self.entries.insert(id, payload);
        self.save()
    }
}

impl<P> RecordStore<P> {
    pub fn has(&self, id: &EntryId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &EntryId) -> Option<&P> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntryId, &P)> {
        self.entries.iter()
    }

    /// Backing file location.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeline_shared::{SourceLinks, identify};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("timeline-store-test-{}", uuid::Uuid::now_v7()))
            .join(name)
    }

    #[test]
    fn missing_file_is_empty_store() {
        let path = temp_path("sources.json");
        let store: RecordStore<SourceLinks> = RecordStore::load(&path).unwrap();
        assert!(store.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn put_persists_immediately() {
        let path = temp_path("sources.json");
        let id = identify("01/01/2020", "Event A");

        let mut store: RecordStore<SourceLinks> = RecordStore::load(&path).unwrap();
        store
            .put(id.clone(), vec!["http://example.com/x".into()])
            .unwrap();

        let reloaded: RecordStore<SourceLinks> = RecordStore::load(&path).unwrap();
        assert!(reloaded.has(&id));
        assert_eq!(
            reloaded.get(&id),
            Some(&vec!["http://example.com/x".to_string()])
        );

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn file_format_is_indented_object() {
        let path = temp_path("sources.json");
        let mut store: RecordStore<SourceLinks> = RecordStore::load(&path).unwrap();
        store
            .put(identify("01/01/2020", "Event A"), vec!["http://example.com/x".into()])
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "{\n    \"3b395592\": [\n        \"http://example.com/x\"\n    ]\n}"
        );

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn save_is_byte_stable_regardless_of_insert_order() {
        let a = temp_path("a.json");
        let b = temp_path("b.json");
        let ids = [identify("1", "x"), identify("2", "y"), identify("3", "z")];

        let mut first: RecordStore<SourceLinks> = RecordStore::load(&a).unwrap();
        for id in &ids {
            first.put(id.clone(), vec![id.to_string()]).unwrap();
        }
        let mut second: RecordStore<SourceLinks> = RecordStore::load(&b).unwrap();
        for id in ids.iter().rev() {
            second.put(id.clone(), vec![id.to_string()]).unwrap();
        }

        assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());

        let _ = std::fs::remove_dir_all(a.parent().unwrap());
        let _ = std::fs::remove_dir_all(b.parent().unwrap());
    }

    #[test]
    fn legacy_keys_are_dropped() {
        let path = temp_path("sources.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{"1": ["http://old"], "3b395592": ["http://example.com/x"]}"#,
        )
        .unwrap();

        let store: RecordStore<SourceLinks> = RecordStore::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.has(&identify("01/01/2020", "Event A")));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_file_is_an_error_not_empty() {
        let path = temp_path("sources.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let result: Result<RecordStore<SourceLinks>> = RecordStore::load(&path);
        assert!(matches!(result, Err(TimelineError::Storage(_))));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
