//! Well-known symbol registries.
//!
//! Two catalogs live outside any document: the image monikers offered for
//! `id` under `ImageCatalogGuid`, and the main-menu ids offered under
//! `guidSHLMainMenu`. Their completion items are built at most once per
//! registry (concurrent first callers wait for the one initializer) and then
//! handed out as the same shared slice for the life of the process.
//!
//! The bundled catalogs cover the common names. A complete export of an
//! installed SDK can be dropped into the resources directory as
//! `KnownMonikers.txt` or `KnownMenuIds.txt` (one name per line) and replaces
//! the bundled list, see [`WellKnownRegistry::from_resources`].
//!
//! The engine receives a registry instead of reaching for a global, so tests
//! can substitute a small one.

mod catalog;

pub use catalog::{
    parse_names, EDITOR_GUIDS, EXTERN_HEADERS, INCLUDE_FILES, KNOWN_MENU_IDS,
    KNOWN_MONIKER_NAMES, VISIBILITY_CONTEXTS,
};

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use tracing::{debug, warn};

use crate::completion::CompletionCandidate;
use crate::fs::FileSystem;

/// Moniker catalog file looked up in the resources directory.
pub const MONIKER_CATALOG_FILE: &str = "KnownMonikers.txt";

/// Menu id catalog file looked up in the resources directory.
pub const MENU_CATALOG_FILE: &str = "KnownMenuIds.txt";

/// Guid whose ids are image monikers.
pub const IMAGE_CATALOG_GUID: &str = "ImageCatalogGuid";

/// Guid of the shell's main menus and groups.
pub const MAIN_MENU_GUID: &str = "guidSHLMainMenu";

#[derive(Debug)]
pub struct WellKnownRegistry {
    moniker_names: Vec<String>,
    menu_ids: Vec<String>,
    monikers: OnceCell<Arc<[CompletionCandidate]>>,
    menus: OnceCell<Arc<[CompletionCandidate]>>,
}

static BUILTIN: Lazy<Arc<WellKnownRegistry>> = Lazy::new(|| {
    Arc::new(WellKnownRegistry::new(
        &KNOWN_MONIKER_NAMES,
        &KNOWN_MENU_IDS,
    ))
});

impl WellKnownRegistry {
    pub fn new(moniker_names: &[&str], menu_ids: &[&str]) -> WellKnownRegistry {
        WellKnownRegistry {
            moniker_names: moniker_names.iter().map(|s| s.to_string()).collect(),
            menu_ids: menu_ids.iter().map(|s| s.to_string()).collect(),
            monikers: OnceCell::new(),
            menus: OnceCell::new(),
        }
    }

    /// The registry built from the bundled catalogs, shared process-wide.
    pub fn builtin() -> Arc<WellKnownRegistry> {
        BUILTIN.clone()
    }

    /// The registry for a resources directory: catalog files found there
    /// replace the bundled ones. Without any, this is [`builtin`](Self::builtin).
    pub fn from_resources(dir: Option<&Path>, fs: &dyn FileSystem) -> Arc<WellKnownRegistry> {
        let Some(dir) = dir else {
            return WellKnownRegistry::builtin();
        };

        let monikers = read_catalog(&dir.join(MONIKER_CATALOG_FILE), fs);
        let menus = read_catalog(&dir.join(MENU_CATALOG_FILE), fs);
        if monikers.is_none() && menus.is_none() {
            return WellKnownRegistry::builtin();
        }

        let names = |text: &Option<String>, bundled: &[&str]| -> Vec<String> {
            match text {
                Some(text) => parse_names(text).iter().map(|s| s.to_string()).collect(),
                None => bundled.iter().map(|s| s.to_string()).collect(),
            }
        };

        Arc::new(WellKnownRegistry {
            moniker_names: names(&monikers, &KNOWN_MONIKER_NAMES),
            menu_ids: names(&menus, &KNOWN_MENU_IDS),
            monikers: OnceCell::new(),
            menus: OnceCell::new(),
        })
    }

    /// One item per image moniker, tagged for image preview.
    pub fn known_monikers(&self) -> Arc<[CompletionCandidate]> {
        self.monikers
            .get_or_init(|| {
                self.moniker_names
                    .iter()
                    .map(|name| CompletionCandidate::known_moniker(name))
                    .collect()
            })
            .clone()
    }

    /// One item per main-menu group or menu id.
    pub fn known_menu_ids(&self) -> Arc<[CompletionCandidate]> {
        self.menus
            .get_or_init(|| {
                self.menu_ids
                    .iter()
                    .map(|id| CompletionCandidate::known_menu_id(id))
                    .collect()
            })
            .clone()
    }
}

fn read_catalog(path: &Path, fs: &dyn FileSystem) -> Option<String> {
    if !fs.exists(path) {
        return None;
    }

    match fs.read_to_string(path) {
        Ok(text) => {
            debug!(path = %path.display(), "loaded catalog");
            Some(text)
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "unreadable catalog, using bundled names");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use super::*;
    use crate::test_utils::MemoryFileSystem;

    #[test]
    fn items_are_built_once_and_shared() {
        let registry = WellKnownRegistry::new(&["Add", "Refresh"], &["IDM_VS_MENU_FILE"]);

        let first = registry.known_monikers();
        let second = registry.known_monikers();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
        assert_eq!(
            first[0].properties.known_moniker_name.as_deref(),
            Some("Add")
        );
        assert_eq!(first[0].suffix, "Image");
    }

    #[test]
    fn concurrent_first_access_yields_one_instance() {
        let registry = Arc::new(WellKnownRegistry::new(&["Add"], &["IDM_VS_MENU_FILE"]));

        let handles = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || registry.known_menu_ids())
            })
            .collect::<Vec<_>>();
        let results = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>();

        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(results[0][0].suffix, "Group/Menu");
    }

    #[test]
    fn builtin_registry_is_process_wide() {
        assert!(Arc::ptr_eq(
            &WellKnownRegistry::builtin(),
            &WellKnownRegistry::builtin()
        ));
    }

    #[test]
    fn builtin_catalogs_have_unique_names() {
        for catalog in [&KNOWN_MONIKER_NAMES[..], &KNOWN_MENU_IDS[..], VISIBILITY_CONTEXTS] {
            let unique = catalog.iter().collect::<HashSet<_>>();
            assert_eq!(unique.len(), catalog.len());
        }
    }

    #[test]
    fn bundled_monikers_include_common_images() {
        let names = KNOWN_MONIKER_NAMES.iter().copied().collect::<HashSet<_>>();

        for name in ["Cloud", "Git", "PowerShell", "Visible", "StatusOK", "ClassPublic"] {
            assert!(names.contains(name), "missing moniker {name}");
        }
        assert!(!names.iter().any(|name| name.starts_with('#')));
        assert!(KNOWN_MENU_IDS.contains(&"IDG_VS_CTXT_ITEM_OPEN"));
    }

    #[test]
    fn catalog_files_skip_comments_blanks_and_repeats() {
        let names = parse_names("# header\n\nAdd\n  Refresh  \nAdd\n");

        assert_eq!(names, vec!["Add", "Refresh"]);
    }

    #[test]
    fn resources_catalog_replaces_bundled_monikers() {
        let fs = MemoryFileSystem::default();
        fs.write("/res/KnownMonikers.txt", "# exported\nAbstractCube\nZoomToFit\n", 0);

        let registry = WellKnownRegistry::from_resources(Some(Path::new("/res")), &fs);

        let monikers = registry
            .known_monikers()
            .iter()
            .map(|c| c.display_text.clone())
            .collect::<Vec<_>>();
        assert_eq!(monikers, vec!["AbstractCube", "ZoomToFit"]);
        assert_eq!(registry.known_menu_ids().len(), KNOWN_MENU_IDS.len());
    }

    #[test]
    fn no_catalog_files_means_builtin() {
        let fs = MemoryFileSystem::default();

        let registry = WellKnownRegistry::from_resources(Some(Path::new("/res")), &fs);

        assert!(Arc::ptr_eq(&registry, &WellKnownRegistry::builtin()));
        assert!(Arc::ptr_eq(
            &WellKnownRegistry::from_resources(None, &fs),
            &WellKnownRegistry::builtin()
        ));
    }
}
