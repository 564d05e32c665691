use once_cell::sync::OnceCell;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;

use super::cache::LoadCache;
use super::loader::{LoadError, RecordSet};
use crate::shared::config::{get_default_data_path, Config};

/// One dashboard session per server process
static SALES_STORE: OnceCell<RwLock<SalesDataStore>> = OnceCell::new();

pub fn initialize_store(config: &Config) {
    let store = SalesDataStore::new(config.sales.cache_capacity, get_default_data_path(config));
    if SALES_STORE.set(RwLock::new(store)).is_err() {
        tracing::warn!("Sales data store already initialized");
    }
}

pub fn get_store() -> &'static RwLock<SalesDataStore> {
    SALES_STORE
        .get()
        .expect("Sales data store has not been initialized")
}

/// Record set the dashboard currently works on
#[derive(Debug, Clone)]
pub struct ActiveDataset {
    pub source_name: String,
    pub source_key: String,
    pub records: Arc<RecordSet>,
}

struct DefaultSource {
    modified: SystemTime,
    dataset: ActiveDataset,
}

/// Session state: the uploaded dataset, the remembered default CSV and the
/// parse cache.
///
/// Record sets are shared read-only; replacing the upload never touches a
/// set that a running computation still holds.
pub struct SalesDataStore {
    cache: LoadCache,
    uploaded: Option<ActiveDataset>,
    default_source: Option<DefaultSource>,
    default_data_path: PathBuf,
}

impl SalesDataStore {
    pub fn new(cache_capacity: usize, default_data_path: PathBuf) -> Self {
        Self {
            cache: LoadCache::new(cache_capacity),
            uploaded: None,
            default_source: None,
            default_data_path,
        }
    }

    /// Parse an uploaded source and make it the active dataset.
    ///
    /// The previous upload's cache entry is invalidated. A failed upload
    /// leaves the previous dataset active.
    pub fn upload(&mut self, source_name: &str, bytes: &[u8]) -> Result<ActiveDataset, LoadError> {
        let (source_key, records) = self.cache.get_or_load(bytes)?;

        if let Some(previous) = self.uploaded.take() {
            if previous.source_key != source_key {
                self.cache.invalidate(&previous.source_key);
            }
        }

        let dataset = ActiveDataset {
            source_name: source_name.to_string(),
            source_key,
            records,
        };
        tracing::info!(
            "Sales dataset '{}' activated: {} records ({}), {} sources cached",
            dataset.source_name,
            dataset.records.len(),
            dataset.source_key,
            self.cache.len()
        );
        self.uploaded = Some(dataset.clone());
        Ok(dataset)
    }

    /// The uploaded dataset, or the remembered default CSV when nothing was
    /// uploaded. No I/O; see `default_is_stale` / `refresh_default`.
    pub fn active(&self) -> Option<ActiveDataset> {
        self.uploaded
            .as_ref()
            .or(self.default_source.as_ref().map(|d| &d.dataset))
            .cloned()
    }

    /// Whether the default CSV changed on disk since it was remembered.
    /// Always `false` while an upload is active.
    pub fn default_is_stale(&self) -> bool {
        if self.uploaded.is_some() {
            return false;
        }
        let on_disk = std::fs::metadata(&self.default_data_path)
            .and_then(|meta| meta.modified())
            .ok();
        on_disk != self.default_source.as_ref().map(|d| d.modified)
    }

    /// Load the default CSV if its modification time differs from the
    /// remembered one, or forget it when the file is gone.
    pub fn refresh_default(&mut self) -> Result<(), LoadError> {
        if self.uploaded.is_some() {
            return Ok(());
        }

        let modified = match std::fs::metadata(&self.default_data_path) {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if let Some(previous) = self.default_source.take() {
                    self.cache.invalidate(&previous.dataset.source_key);
                    tracing::warn!("Default sales CSV '{}' is gone", previous.dataset.source_name);
                }
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if self
            .default_source
            .as_ref()
            .is_some_and(|d| d.modified == modified)
        {
            return Ok(());
        }

        let bytes = std::fs::read(&self.default_data_path)?;
        let (source_key, records) = self.cache.get_or_load(&bytes)?;

        if let Some(previous) = self.default_source.take() {
            if previous.dataset.source_key != source_key {
                self.cache.invalidate(&previous.dataset.source_key);
            }
        }

        let dataset = ActiveDataset {
            source_name: self.default_data_path.display().to_string(),
            source_key,
            records,
        };
        tracing::info!(
            "Default sales CSV '{}' loaded: {} records",
            dataset.source_name,
            dataset.records.len()
        );
        self.default_source = Some(DefaultSource { modified, dataset });
        Ok(())
    }

    /// Forget the upload and its cache entry
    pub fn reset(&mut self) -> bool {
        match self.uploaded.take() {
            Some(previous) => {
                self.cache.invalidate(&previous.source_key);
                tracing::info!("Sales dataset '{}' dropped", previous.source_name);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    fn cached_sources(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const HEADER: &str =
        "data_venda,id_pedido,cidade,canal_venda,categoria_produto,produto,valor_total";

    fn source(rows: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    fn missing_default() -> PathBuf {
        std::env::temp_dir().join("d402_store_tests_no_such_file.csv")
    }

    #[test]
    fn test_nothing_available() {
        let mut store = SalesDataStore::new(4, missing_default());
        assert!(!store.default_is_stale());
        store.refresh_default().unwrap();
        assert!(store.active().is_none());
    }

    #[test]
    fn test_upload_becomes_active() {
        let mut store = SalesDataStore::new(4, missing_default());
        let uploaded = store
            .upload("vendas.csv", source(&["2023-01-15,1,Recife,Online,Livros,Romance,100"]).as_bytes())
            .unwrap();
        let active = store.active().unwrap();

        assert_eq!(active.source_name, "vendas.csv");
        assert_eq!(active.source_key, uploaded.source_key);
        assert!(Arc::ptr_eq(&active.records, &uploaded.records));
    }

    #[test]
    fn test_new_upload_invalidates_previous() {
        let mut store = SalesDataStore::new(4, missing_default());
        store
            .upload("a.csv", source(&["2023-01-15,1,Recife,Online,Livros,Romance,100"]).as_bytes())
            .unwrap();
        store
            .upload("b.csv", source(&["2023-01-15,1,Natal,Online,Livros,Romance,50"]).as_bytes())
            .unwrap();

        assert_eq!(store.cached_sources(), 1);
        assert_eq!(store.active().unwrap().source_name, "b.csv");
    }

    #[test]
    fn test_failed_upload_keeps_previous() {
        let mut store = SalesDataStore::new(4, missing_default());
        store
            .upload("a.csv", source(&["2023-01-15,1,Recife,Online,Livros,Romance,100"]).as_bytes())
            .unwrap();

        let err = store.upload("bad.csv", b"cidade\nRecife").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumns(_)));
        assert_eq!(store.active().unwrap().source_name, "a.csv");
    }

    #[test]
    fn test_reset_drops_upload() {
        let mut store = SalesDataStore::new(4, missing_default());
        store.upload("a.csv", source(&[]).as_bytes()).unwrap();

        assert!(store.reset());
        assert!(!store.reset());
        assert_eq!(store.cached_sources(), 0);
        assert!(store.active().is_none());
    }

    fn default_file(name: &str, rows: &[&str]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("d402_{}_{}.csv", name, std::process::id()));
        std::fs::write(&path, source(rows)).unwrap();
        path
    }

    #[test]
    fn test_default_source_fallback() {
        let path = default_file("fallback", &["2023-01-15,1,Recife,Online,Livros,Romance,100"]);

        let mut store = SalesDataStore::new(4, path.clone());
        assert!(store.active().is_none());
        assert!(store.default_is_stale());

        store.refresh_default().unwrap();
        assert!(!store.default_is_stale());
        let first = store.active().unwrap();
        store.refresh_default().unwrap();
        let second = store.active().unwrap();

        assert_eq!(first.records.len(), 1);
        assert!(Arc::ptr_eq(&first.records, &second.records));
        assert_eq!(store.cached_sources(), 1);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_default_reloaded_when_modified() {
        let path = default_file("modified", &["2023-01-15,1,Recife,Online,Livros,Romance,100"]);
        let mut store = SalesDataStore::new(4, path.clone());
        store.refresh_default().unwrap();
        let before = store.active().unwrap();

        std::fs::write(
            &path,
            source(&[
                "2023-01-15,1,Recife,Online,Livros,Romance,100",
                "2023-01-16,2,Natal,Loja,Livros,Poesia,40",
            ]),
        )
        .unwrap();
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();

        assert!(store.default_is_stale());
        store.refresh_default().unwrap();
        let after = store.active().unwrap();

        assert_eq!(after.records.len(), 2);
        assert_ne!(after.source_key, before.source_key);
        assert_eq!(store.cached_sources(), 1);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_default_forgotten_when_removed() {
        let path = default_file("removed", &["2023-01-15,1,Recife,Online,Livros,Romance,100"]);
        let mut store = SalesDataStore::new(4, path.clone());
        store.refresh_default().unwrap();

        std::fs::remove_file(&path).unwrap();
        assert!(store.default_is_stale());
        store.refresh_default().unwrap();

        assert!(store.active().is_none());
        assert_eq!(store.cached_sources(), 0);
    }

    #[test]
    fn test_upload_shadows_default() {
        let path = default_file("shadow", &["2023-01-15,1,Recife,Online,Livros,Romance,100"]);
        let mut store = SalesDataStore::new(4, path.clone());
        store.refresh_default().unwrap();

        store
            .upload("a.csv", source(&["2023-01-15,1,Natal,Online,Livros,Romance,50"]).as_bytes())
            .unwrap();
        assert!(!store.default_is_stale());
        assert_eq!(store.active().unwrap().source_name, "a.csv");

        assert!(store.reset());
        assert!(!store.default_is_stale());
        assert_eq!(store.active().unwrap().source_name, path.display().to_string());

        std::fs::remove_file(&path).unwrap();
    }
}
