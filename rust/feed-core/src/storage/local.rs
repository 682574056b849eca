// rust/feed-core/src/storage/local.rs

//! Local filesystem storage backend implementation.
//!
//! Files are read either through a buffered `File` or, above a size
//! threshold and when enabled, through a read-only memory map.

use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use super::traits::{ObjectMeta, StorageBackend, StorageReader};
use crate::config::StorageConfig;
use crate::error::{FeedError, Result};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    /// Base path that relative paths are resolved against.
    base_path: PathBuf,
    /// Buffer size for buffered reads.
    buffer_size: usize,
    /// Whether to use memory-mapped I/O.
    use_mmap: bool,
    /// File size threshold above which to use mmap.
    mmap_threshold: u64,
}

impl LocalStorage {
    /// Creates a new `LocalStorage` instance from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base path does not exist or is not a directory.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let base_path = config.base_path.clone();

        if !base_path.is_dir() {
            return Err(FeedError::storage(
                &base_path,
                "base path does not exist or is not a directory",
            ));
        }

        Ok(Self {
            base_path,
            buffer_size: config.buffer_size,
            use_mmap: config.use_mmap,
            mmap_threshold: config.mmap_threshold,
        })
    }

    /// Resolves a path relative to the base path.
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}

impl StorageBackend for LocalStorage {
    fn exists(&self, path: &Path) -> Result<bool> {
        let full_path = self.resolve_path(path);
        Ok(full_path.exists())
    }

    fn metadata(&self, path: &Path) -> Result<ObjectMeta> {
        let full_path = self.resolve_path(path);
        let meta = fs::metadata(&full_path).map_err(|e| {
            FeedError::storage_with_source(&full_path, "failed to read metadata", e)
        })?;

        Ok(ObjectMeta {
            size: meta.len(),
            modified: meta.modified().ok(),
            is_dir: meta.is_dir(),
        })
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn StorageReader>> {
        let full_path = self.resolve_path(path);
        let file = File::open(&full_path)
            .map_err(|e| FeedError::storage_with_source(&full_path, "failed to open file", e))?;

        let meta = file.metadata().map_err(|e| {
            FeedError::storage_with_source(&full_path, "failed to read file metadata", e)
        })?;
        if meta.is_dir() {
            return Err(FeedError::storage(&full_path, "path is a directory"));
        }
        let size = meta.len();

        // Zero-length files cannot be mapped on every platform.
        if self.use_mmap && size > 0 && size >= self.mmap_threshold {
            // SAFETY: The file is opened read-only and the Mmap lives as long
            // as the reader. Sample files are not rewritten while being fed.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| {
                FeedError::storage_with_source(&full_path, "failed to memory-map file", e)
            })?;

            Ok(Box::new(MmapReader::new(mmap)))
        } else {
            Ok(Box::new(LocalReader::new(file, size, self.buffer_size)))
        }
    }
}

/// Buffered file reader for local storage.
struct LocalReader {
    reader: BufReader<File>,
    size: u64,
}

impl LocalReader {
    fn new(file: File, size: u64, buffer_size: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(buffer_size, file),
            size,
        }
    }
}

impl Read for LocalReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Seek for LocalReader {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.reader.seek(pos)
    }
}

impl StorageReader for LocalReader {
    fn size(&self) -> u64 {
        self.size
    }
}

/// Memory-mapped file reader for local storage.
struct MmapReader {
    mmap: Mmap,
    position: u64,
}

impl MmapReader {
    fn new(mmap: Mmap) -> Self {
        Self { mmap, position: 0 }
    }
}

impl Read for MmapReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let pos = (self.position as usize).min(self.mmap.len());
        let remaining = &self.mmap[pos..];
        let to_read = buf.len().min(remaining.len());

        if to_read == 0 {
            return Ok(0);
        }

        buf[..to_read].copy_from_slice(&remaining[..to_read]);
        self.position = (pos + to_read) as u64;
        Ok(to_read)
    }
}

impl Seek for MmapReader {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::End(offset) => self.mmap.len() as i64 + offset,
            SeekFrom::Current(offset) => self.position as i64 + offset,
        };

        if new_pos < 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "seek to negative position",
            ));
        }

        self.position = new_pos as u64;
        Ok(self.position)
    }
}

impl StorageReader for MmapReader {
    fn size(&self) -> u64 {
        self.mmap.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage(use_mmap: bool) -> (LocalStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig {
            base_path: temp_dir.path().to_path_buf(),
            buffer_size: 4096,
            use_mmap,
            mmap_threshold: 1024, // Low threshold for testing
        };
        let storage = LocalStorage::new(&config).unwrap();
        (storage, temp_dir)
    }

    #[test]
    fn test_new_rejects_missing_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig {
            base_path: temp_dir.path().join("missing"),
            ..Default::default()
        };

        let err = LocalStorage::new(&config).unwrap_err();
        assert!(matches!(err, FeedError::Storage { .. }));
    }

    #[test]
    fn test_exists_and_metadata() {
        let (storage, temp) = create_test_storage(false);

        assert!(!storage.exists(Path::new("samples.jsonl")).unwrap());
        fs::write(temp.path().join("samples.jsonl"), b"{}\n{}\n").unwrap();
        assert!(storage.exists(Path::new("samples.jsonl")).unwrap());

        let meta = storage.metadata(Path::new("samples.jsonl")).unwrap();
        assert_eq!(meta.size, 6);
        assert!(!meta.is_dir);
        assert!(meta.modified.is_some());
    }

    #[test]
    fn test_open_missing_file() {
        let (storage, _temp) = create_test_storage(false);

        let result = storage.open_read(Path::new("nonexistent.jsonl"));
        assert!(matches!(result, Err(FeedError::Storage { .. })));
    }

    #[test]
    fn test_open_directory_fails() {
        let (storage, temp) = create_test_storage(false);
        fs::create_dir(temp.path().join("subdir")).unwrap();

        assert!(storage.open_read(Path::new("subdir")).is_err());
    }

    #[test]
    fn test_buffered_read_and_seek() {
        let (storage, temp) = create_test_storage(false);
        fs::write(temp.path().join("small.txt"), b"hello world").unwrap();

        let mut reader = storage.open_read(Path::new("small.txt")).unwrap();
        assert_eq!(reader.size(), 11);

        reader.seek(SeekFrom::Start(6)).unwrap();
        let mut buf = String::new();
        reader.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "world");
    }

    #[test]
    fn test_mmap_read_and_seek() {
        let (storage, temp) = create_test_storage(true);

        // Above the 1024 byte threshold, so this goes through the memory map.
        let data: Vec<u8> = (0..2048).map(|i| (i % 256) as u8).collect();
        fs::write(temp.path().join("large.bin"), &data).unwrap();

        let mut reader = storage.open_read(Path::new("large.bin")).unwrap();
        assert_eq!(reader.size(), 2048);

        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, data);

        reader.seek(SeekFrom::Start(1000)).unwrap();
        let mut chunk = [0u8; 4];
        reader.read_exact(&mut chunk).unwrap();
        assert_eq!(chunk, [232, 233, 234, 235]);

        // Reads past the end return nothing rather than failing.
        reader.seek(SeekFrom::End(10)).unwrap();
        assert_eq!(reader.read(&mut chunk).unwrap(), 0);
    }

    #[test]
    fn test_absolute_path_bypasses_base() {
        let (storage, _temp) = create_test_storage(false);
        let other = TempDir::new().unwrap();
        let path = other.path().join("abs.txt");
        fs::write(&path, b"abs").unwrap();

        let mut reader = storage.open_read(&path).unwrap();
        let mut buf = String::new();
        reader.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "abs");
    }
}
