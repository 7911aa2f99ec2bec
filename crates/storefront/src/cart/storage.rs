//! Persistence port for the cart and its adapters.
//!
//! The store depends on [`CartStorage`] only. [`FileStorage`] keeps the cart
//! in a single JSON file on disk; [`MemoryStorage`] keeps it in a shared
//! in-process slot and is meant for tests and previews.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bookshelf_core::Cart;
use thiserror::Error;

/// Errors raised by a [`CartStorage`] adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Disk I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The slot holds data that is not a valid cart.
    #[error("corrupt cart data: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The backing store refused the operation (e.g. quota exceeded).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A single durable slot holding the serialized cart.
///
/// # Contract
///
/// - [`load`](CartStorage::load) returns `Ok(None)` when nothing has been
///   saved yet, and [`StorageError::Corrupt`] when the slot cannot be
///   parsed or breaks the cart invariants.
/// - [`save`](CartStorage::save) overwrites the previous value entirely.
pub trait CartStorage: Send {
    /// Read the cart from the slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot cannot be read or parsed.
    fn load(&self) -> Result<Option<Cart>, StorageError>;

    /// Replace the slot contents with `cart`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    fn save(&mut self, cart: &Cart) -> Result<(), StorageError>;
}

impl<S: CartStorage + ?Sized> CartStorage for Box<S> {
    fn load(&self) -> Result<Option<Cart>, StorageError> {
        (**self).load()
    }

    fn save(&mut self, cart: &Cart) -> Result<(), StorageError> {
        (**self).save(cart)
    }
}

// =============================================================================
// File Storage
// =============================================================================

/// Cart slot backed by `<dir>/<slot>.json`.
///
/// Writes go to a temporary sibling file which is then renamed over the
/// slot, so a crash mid-write leaves the previous cart intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl FileStorage {
    /// Create a file-backed slot named `slot` inside `dir`.
    ///
    /// Nothing touches the filesystem until the first load or save.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, slot: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            path: dir.join(format!("{slot}.json")),
            tmp_path: dir.join(format!("{slot}.json.tmp")),
        }
    }

    /// Path of the slot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for FileStorage {
    fn load(&self) -> Result<Option<Cart>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let cart = serde_json::from_str(&content)?;
        Ok(Some(cart))
    }

    fn save(&mut self, cart: &Cart) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string(cart)?;
        std::fs::write(&self.tmp_path, json)?;
        std::fs::rename(&self.tmp_path, &self.path)?;
        tracing::trace!(path = %self.path.display(), "cart slot written");
        Ok(())
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

#[derive(Debug, Default)]
struct MemorySlot {
    raw: Option<String>,
    fail_writes: bool,
    writes: usize,
}

/// In-process cart slot.
///
/// Clones share the same slot, so a test can keep one handle to inspect or
/// corrupt the stored JSON while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<MemorySlot>>,
}

impl MemoryStorage {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored JSON text, if any.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.lock().raw.clone()
    }

    /// Overwrite the stored JSON text directly.
    pub fn set_raw(&self, raw: impl Into<String>) {
        self.lock().raw = Some(raw.into());
    }

    /// Make subsequent saves fail with [`StorageError::Unavailable`].
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, MemorySlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Cart>, StorageError> {
        let slot = self.lock();
        match slot.raw.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, cart: &Cart) -> Result<(), StorageError> {
        let mut slot = self.lock();
        if slot.fail_writes {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        slot.raw = Some(serde_json::to_string(cart)?);
        slot.writes += 1;
        Ok(())
    }
}
