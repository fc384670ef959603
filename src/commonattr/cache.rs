//! File cache shared by every result of one search pass

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::case::AbstractFile;

/// Object id -> file record, filled on demand while nodes are generated.
/// Clones share the same map. Entries are written once and never evicted.
#[derive(Clone, Default)]
pub struct FileCache {
    files: Rc<RefCell<HashMap<i64, Arc<AbstractFile>>>>,
}

impl FileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, object_id: i64) -> Option<Arc<AbstractFile>> {
        self.files.borrow().get(&object_id).map(Arc::clone)
    }

    pub fn contains(&self, object_id: i64) -> bool {
        self.files.borrow().contains_key(&object_id)
    }

    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }

    /// Store a loaded file under its own object id. An existing entry wins
    /// and is returned instead.
    pub fn insert_loaded(&self, file: AbstractFile) -> Arc<AbstractFile> {
        let mut files = self.files.borrow_mut();
        Arc::clone(
            files
                .entry(file.object_id)
                .or_insert_with(|| Arc::new(file)),
        )
    }

    /// Return the cached file for `object_id`, or run `loader` and cache
    /// whatever it finds
    pub fn get_or_try_load<E, F>(&self, object_id: i64, loader: F) -> Result<Option<Arc<AbstractFile>>, E>
    where
        F: FnOnce() -> Result<Option<AbstractFile>, E>,
    {
        if let Some(file) = self.get(object_id) {
            return Ok(Some(file));
        }
        Ok(loader()?.map(|file| self.insert_loaded(file)))
    }

    /// Whether two handles point at the same underlying cache
    pub fn shares_with(&self, other: &FileCache) -> bool {
        Rc::ptr_eq(&self.files, &other.files)
    }
}

impl std::fmt::Debug for FileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCache").field("entries", &self.len()).finish()
    }
}
