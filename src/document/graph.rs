//! The include graph of one document.
//!
//! A [`DocumentGraph`] is the root document followed by every file it
//! transitively includes, in declaration order (depth first). It lives for a
//! single request; only the included trees outlive it, in the
//! [`IncludeCache`].
//!
//! Unresolvable includes are skipped: a missing file means fewer symbols to
//! offer, never a failed request.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use super::{IncludeCache, SymbolTree};
use crate::error::Result;
use crate::fs::FileSystem;

/// Include that falls back to the copy bundled with the server when the
/// workspace does not have it.
pub const BUNDLED_INCLUDE: &str = "VSGlobals.vsct";

#[derive(Debug, Clone)]
pub struct DocumentGraph {
    trees: Vec<Arc<SymbolTree>>,
}

impl DocumentGraph {
    pub fn root(&self) -> &SymbolTree {
        &self.trees[0]
    }

    /// Root first, then the included trees.
    pub fn trees(&self) -> &[Arc<SymbolTree>] {
        &self.trees
    }

    pub fn included(&self) -> &[Arc<SymbolTree>] {
        &self.trees[1..]
    }
}

pub struct GraphBuilder<'a> {
    cache: &'a IncludeCache,
    fs: &'a dyn FileSystem,
    bundled_dir: Option<&'a Path>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        cache: &'a IncludeCache,
        fs: &'a dyn FileSystem,
        bundled_dir: Option<&'a Path>,
    ) -> GraphBuilder<'a> {
        GraphBuilder {
            cache,
            fs,
            bundled_dir,
        }
    }

    /// Parse the live root text without following includes.
    pub fn parse_root(&self, text: &str, root_path: &Path) -> Result<SymbolTree> {
        Ok(SymbolTree::parse(text)?.with_path(root_path))
    }

    pub fn build(&self, text: &str, root_path: &Path) -> Result<DocumentGraph> {
        let root = Arc::new(self.parse_root(text, root_path)?);
        let root_path = normalize_path(root_path);

        let mut visited = HashSet::from([root_path.clone()]);
        let mut trees = vec![root.clone()];
        self.collect_includes(&root, root_path.parent(), &mut visited, &mut trees);

        debug!(
            root = %root_path.display(),
            included = trees.len() - 1,
            "built document graph"
        );

        Ok(DocumentGraph { trees })
    }

    fn collect_includes(
        &self,
        tree: &SymbolTree,
        dir: Option<&Path>,
        visited: &mut HashSet<PathBuf>,
        trees: &mut Vec<Arc<SymbolTree>>,
    ) {
        for href in tree.include_hrefs() {
            let Some(path) = self.resolve_href(dir, href) else {
                debug!(href, "include not found, skipping");
                continue;
            };

            if !visited.insert(path.clone()) {
                continue;
            }

            match self.cache.get_or_parse(&path, self.fs) {
                Ok(included) => {
                    trees.push(included.clone());
                    self.collect_includes(&included, path.parent(), visited, trees);
                }
                Err(err) => warn!(%err, "skipping include"),
            }
        }
    }

    fn resolve_href(&self, dir: Option<&Path>, href: &str) -> Option<PathBuf> {
        let local = normalize_path(&dir.map(|d| d.join(href)).unwrap_or_else(|| href.into()));
        if self.fs.exists(&local) {
            return Some(local);
        }

        if href.eq_ignore_ascii_case(BUNDLED_INCLUDE) {
            let bundled = self.bundled_dir?.join(BUNDLED_INCLUDE);
            if self.fs.exists(&bundled) {
                return Some(bundled);
            }
        }

        None
    }
}

/// Lexically resolve `.` and `..` so one file always has one cache key.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) || !normalized.pop()
                {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }

    normalized
}
