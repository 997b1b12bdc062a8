use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::{Collection, PersistenceError, PersistencePort};

const FILE_NAME: &str = "ledger.json";

/// On-disk layout: both collections in one file, so one rename commits both.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    products: Vec<JsonValue>,
    #[serde(default)]
    documents: Vec<JsonValue>,
}

impl LedgerFile {
    fn collection(&self, collection: Collection) -> &Vec<JsonValue> {
        match collection {
            Collection::Products => &self.products,
            Collection::Documents => &self.documents,
        }
    }

    fn collection_mut(&mut self, collection: Collection) -> &mut Vec<JsonValue> {
        match collection {
            Collection::Products => &mut self.products,
            Collection::Documents => &mut self.documents,
        }
    }
}

/// JSON-file persistence in a data directory.
///
/// Commits serialize the whole file to `ledger.json.tmp`, sync it, then rename
/// it over `ledger.json`; a crash leaves either the old or the new file.
#[derive(Debug)]
pub struct JsonFilePersistence {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFilePersistence {
    /// Open (creating the directory if needed) the store under `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| PersistenceError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: dir.join(FILE_NAME),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<LedgerFile, PersistenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LedgerFile::default()),
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if raw.trim().is_empty() {
            return Ok(LedgerFile::default());
        }

        serde_json::from_str(&raw)
            .map_err(|e| PersistenceError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    fn store(&self, file: &LedgerFile) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec_pretty(file).map_err(|source| {
            PersistenceError::Serialization {
                collection: FILE_NAME,
                source,
            }
        })?;

        let tmp = self.path.with_extension("json.tmp");
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| PersistenceError::Io { path, source }
        };

        let mut handle = fs::File::create(&tmp).map_err(io_err(&tmp))?;
        handle.write_all(&bytes).map_err(io_err(&tmp))?;
        handle.sync_all().map_err(io_err(&tmp))?;
        drop(handle);

        fs::rename(&tmp, &self.path).map_err(io_err(&self.path))
    }
}

impl PersistencePort for JsonFilePersistence {
    fn read(&self, collection: Collection) -> Result<Vec<JsonValue>, PersistenceError> {
        Ok(self.load()?.collection(collection).clone())
    }

    fn commit(&self, batch: Vec<(Collection, Vec<JsonValue>)>) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().map_err(|_| PersistenceError::Poisoned)?;

        let mut file = self.load()?;
        for (collection, records) in batch {
            *file.collection_mut(collection) = records;
        }
        self.store(&file)
    }
}
