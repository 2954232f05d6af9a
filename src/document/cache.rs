//! Process-wide cache of parsed include files.
//!
//! Entries are keyed by path and validated against the file's modification
//! time on every lookup. A changed timestamp means re-read, re-parse and
//! replace. Nothing is ever evicted; the working set is the handful of files
//! included by the documents opened in one session.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use super::SymbolTree;
use crate::error::{Result, VsctError};
use crate::fs::FileSystem;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub modified: SystemTime,
    pub tree: Arc<SymbolTree>,
}

#[derive(Debug, Default)]
pub struct IncludeCache {
    entries: DashMap<PathBuf, CacheEntry>,
}

static SHARED: Lazy<Arc<IncludeCache>> = Lazy::new(|| Arc::new(IncludeCache::default()));

impl IncludeCache {
    /// The cache shared by every engine in this process.
    pub fn shared() -> Arc<IncludeCache> {
        SHARED.clone()
    }

    /// Return the parsed tree for `path`, re-parsing it if the file changed
    /// since it was cached.
    pub fn get_or_parse(&self, path: &Path, fs: &dyn FileSystem) -> Result<Arc<SymbolTree>> {
        let unreadable = |source| VsctError::IncludeUnreadable {
            path: path.to_path_buf(),
            source,
        };

        let modified = fs.modified(path).map_err(unreadable)?;

        if let Some(entry) = self.entries.get(path) {
            if entry.modified == modified {
                debug!(path = %path.display(), "include cache hit");
                return Ok(entry.tree.clone());
            }
        }

        // Read and parse without holding a shard lock; a concurrent refresh of
        // the same file just replaces an equivalent entry.
        let text = fs.read_to_string(path).map_err(unreadable)?;
        let tree = Arc::new(SymbolTree::parse(&text)?.with_path(path));

        debug!(path = %path.display(), "include cache refreshed");
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                modified,
                tree: tree.clone(),
            },
        );

        Ok(tree)
    }

    pub fn get(&self, path: &Path) -> Option<CacheEntry> {
        self.entries.get(path).map(|entry| entry.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::test_utils::MemoryFileSystem;

    const GLOBALS: &str = r#"<CommandTable><Symbols><GuidSymbol name="guidA"/></Symbols></CommandTable>"#;

    #[test]
    fn unchanged_file_is_served_from_cache() {
        let fs = MemoryFileSystem::default();
        fs.write("/ws/globals.vsct", GLOBALS, 1);
        let cache = IncludeCache::default();

        let first = cache.get_or_parse(Path::new("/ws/globals.vsct"), &fs).unwrap();
        let second = cache.get_or_parse(Path::new("/ws/globals.vsct"), &fs).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fs.reads(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn newer_timestamp_replaces_entry() {
        let fs = MemoryFileSystem::default();
        fs.write("/ws/globals.vsct", GLOBALS, 1);
        let cache = IncludeCache::default();
        let path = Path::new("/ws/globals.vsct");

        let old = cache.get_or_parse(path, &fs).unwrap();
        fs.write(
            "/ws/globals.vsct",
            r#"<CommandTable><Symbols><GuidSymbol name="guidB"/></Symbols></CommandTable>"#,
            2,
        );
        let new = cache.get_or_parse(path, &fs).unwrap();

        assert!(!Arc::ptr_eq(&old, &new));
        assert_eq!(
            new.elements_named("GuidSymbol").next().and_then(|s| s.attribute("name")),
            Some("guidB")
        );
        assert_eq!(cache.get(path).map(|e| e.modified), Some(MemoryFileSystem::time(2)));
    }

    #[test]
    fn concurrent_lookups_share_one_entry() {
        let fs = Arc::new(MemoryFileSystem::default());
        fs.write("/ws/globals.vsct", GLOBALS, 1);
        let cache = Arc::new(IncludeCache::default());

        let handles = (0..8)
            .map(|_| {
                let (fs, cache) = (fs.clone(), cache.clone());
                thread::spawn(move || {
                    cache
                        .get_or_parse(Path::new("/ws/globals.vsct"), fs.as_ref())
                        .unwrap()
                })
            })
            .collect::<Vec<_>>();
        let trees = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(cache.len(), 1);
        assert!(trees.iter().all(|tree| {
            tree.elements_named("GuidSymbol")
                .filter_map(|s| s.attribute("name"))
                .eq(["guidA"])
        }));

        // The entry still follows the file after the concurrent fill.
        fs.write(
            "/ws/globals.vsct",
            r#"<CommandTable><Symbols><GuidSymbol name="guidB"/></Symbols></CommandTable>"#,
            2,
        );
        let refreshed = cache
            .get_or_parse(Path::new("/ws/globals.vsct"), fs.as_ref())
            .unwrap();
        assert_eq!(
            refreshed.elements_named("GuidSymbol").next().and_then(|s| s.attribute("name")),
            Some("guidB")
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_file_is_unreadable() {
        let fs = MemoryFileSystem::default();
        let cache = IncludeCache::default();

        let result = cache.get_or_parse(Path::new("/ws/missing.vsct"), &fs);

        assert!(matches!(result, Err(VsctError::IncludeUnreadable { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn unparseable_file_is_not_cached() {
        let fs = MemoryFileSystem::default();
        fs.write("/ws/broken.vsct", "<CommandTable>", 1);
        let cache = IncludeCache::default();

        let result = cache.get_or_parse(Path::new("/ws/broken.vsct"), &fs);

        assert!(matches!(result, Err(VsctError::DocumentUnparseable(_))));
        assert!(cache.is_empty());
    }
}
