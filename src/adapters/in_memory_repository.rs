//! In-memory policy repository for testing.
//!
//! This adapter keeps encoded policies in a map keyed by path, so tests can
//! exercise save/load without touching the file system.

use std::{cell::RefCell, collections::HashMap, path::Path, rc::Rc};

use crate::{Result, error::Error, ports::PolicyRepository, q_learning::SavedPolicy};

/// In-memory repository for testing.
///
/// Policies go through the same MessagePack encoding as on disk. All clones
/// share the same underlying storage.
///
/// # Examples
///
/// ```
/// use qtictac::adapters::InMemoryRepository;
/// use qtictac::ports::PolicyRepository;
/// use qtictac::q_learning::{SavedPolicy, TrainedPolicy, TrainingMetadata};
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let saved = SavedPolicy::from_policy(&TrainedPolicy::default(), TrainingMetadata::default())?;
///
/// repo.save(&saved, Path::new("policy"))?;
/// let loaded = repo.load(Path::new("policy"))?;
/// assert_eq!(saved, loaded);
/// # Ok::<(), qtictac::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: Rc<RefCell<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of policies currently stored
    pub fn count(&self) -> usize {
        self.storage.borrow().len()
    }

    pub fn clear(&self) {
        self.storage.borrow_mut().clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.storage.borrow().contains_key(&key(path))
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl PolicyRepository for InMemoryRepository {
    fn save(&self, policy: &SavedPolicy, path: &Path) -> Result<()> {
        let bytes = policy.to_msgpack()?;
        self.storage.borrow_mut().insert(key(path), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedPolicy> {
        let storage = self.storage.borrow();
        let bytes = storage.get(&key(path)).ok_or_else(|| Error::Io {
            operation: format!("load policy from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;
        SavedPolicy::from_msgpack(bytes)
    }
}
