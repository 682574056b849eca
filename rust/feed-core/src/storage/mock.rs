// rust/feed-core/src/storage/mock.rs

//! In-memory storage backend shared by unit tests.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::traits::{ObjectMeta, StorageBackend, StorageReader};
use crate::error::{FeedError, Result};

pub(crate) struct MockReader {
    data: Cursor<Vec<u8>>,
    size: u64,
}

impl Read for MockReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.data.read(buf)
    }
}

impl Seek for MockReader {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.data.seek(pos)
    }
}

impl StorageReader for MockReader {
    fn size(&self) -> u64 {
        self.size
    }
}

pub(crate) struct MockStorage {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    opens: Mutex<usize>,
}

impl MockStorage {
    pub(crate) fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            opens: Mutex::new(0),
        }
    }

    pub(crate) fn add_file(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.files.lock().unwrap().insert(path.into(), data.into());
    }

    /// Builds a newline-terminated file out of `lines`.
    pub(crate) fn add_lines<S: AsRef<str>>(&self, path: impl Into<PathBuf>, lines: &[S]) {
        let mut data = String::new();
        for line in lines {
            data.push_str(line.as_ref());
            data.push('\n');
        }
        self.add_file(path, data);
    }

    pub(crate) fn open_count(&self) -> usize {
        *self.opens.lock().unwrap()
    }
}

impl StorageBackend for MockStorage {
    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(path))
    }

    fn metadata(&self, path: &Path) -> Result<ObjectMeta> {
        let files = self.files.lock().unwrap();
        let data = files
            .get(path)
            .ok_or_else(|| FeedError::storage(path, "not found"))?;

        Ok(ObjectMeta {
            size: data.len() as u64,
            modified: None,
            is_dir: false,
        })
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn StorageReader>> {
        let files = self.files.lock().unwrap();
        let data = files
            .get(path)
            .ok_or_else(|| FeedError::storage(path, "not found"))?
            .clone();
        *self.opens.lock().unwrap() += 1;

        let size = data.len() as u64;
        Ok(Box::new(MockReader {
            data: Cursor::new(data),
            size,
        }))
    }
}
