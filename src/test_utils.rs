//! Shared test utilities for vsct-lsp.
//!
//! This module provides common helpers used across multiple test modules.
//! It is only compiled when running tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use tempfile::TempDir;

use crate::classify::XmlClassifier;
use crate::config::Settings;
use crate::document::IncludeCache;
use crate::engine::Engine;
use crate::fs::FileSystem;
use crate::registry::WellKnownRegistry;

/// Creates a temporary workspace directory for testing.
///
/// Returns a tuple of (TempDir, PathBuf) where:
/// - TempDir: The temp directory handle (must be kept alive for the test duration)
/// - PathBuf: The path to the workspace subdirectory
pub fn create_test_workspace_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let workspace_dir = temp_dir.path().join("workspace");
    fs::create_dir(&workspace_dir).expect("Failed to create workspace subdirectory");
    (temp_dir, workspace_dir)
}

/// In-memory [`FileSystem`] whose modification times are set by the test.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: DashMap<PathBuf, (String, SystemTime)>,
    reads: AtomicUsize,
}

impl MemoryFileSystem {
    /// A fixed timestamp, `tick` seconds after the epoch.
    pub fn time(tick: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(tick)
    }

    pub fn write(&self, path: impl AsRef<Path>, text: &str, tick: u64) {
        self.files.insert(
            path.as_ref().to_path_buf(),
            (text.to_string(), Self::time(tick)),
        );
    }

    /// Number of successful `read_to_string` calls so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let text = self
            .files
            .get(path)
            .map(|entry| entry.0.clone())
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;

        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(text)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        self.files
            .get(path)
            .map(|entry| entry.1)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

/// An engine over an in-memory file system, with its own cache and a small
/// well-known registry.
pub fn create_test_engine(settings: Settings) -> (Engine, Arc<MemoryFileSystem>) {
    let fs = Arc::new(MemoryFileSystem::default());
    let registry = Arc::new(WellKnownRegistry::new(
        &["Add", "Refresh", "StatusOK"],
        &["IDG_VS_MM_FILEMENU", "IDM_VS_MENU_FILE"],
    ));

    let engine = Engine::with_services(
        settings,
        registry,
        Arc::new(IncludeCache::default()),
        fs.clone(),
        Arc::new(XmlClassifier),
    );

    (engine, fs)
}
