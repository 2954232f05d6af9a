//! Fixed external catalogs offered regardless of document content.

use itertools::Itertools;
use once_cell::sync::Lazy;

/// Names from the Visual Studio image catalog (`KnownMonikers`).
pub static KNOWN_MONIKER_NAMES: Lazy<Vec<&'static str>> =
    Lazy::new(|| parse_names(include_str!("data/known_monikers.txt")));

/// Menu, group and toolbar ids declared under `guidSHLMainMenu`.
pub static KNOWN_MENU_IDS: Lazy<Vec<&'static str>> =
    Lazy::new(|| parse_names(include_str!("data/known_menu_ids.txt")));

/// One name per line. Blank lines and `#` comments are skipped, as are
/// repeated names.
pub fn parse_names(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .unique()
        .collect()
}

/// UI contexts offered for `VisibilityItem/@context`.
pub const VISIBILITY_CONTEXTS: &[&str] = &[
    "GUID_TextEditorFactory",
    "UICONTEXT_BulkFileOperation",
    "UICONTEXT_CloudDebugging",
    "UICONTEXT_CodeWindow",
    "UICONTEXT_DataSourceWindowAutoVisible",
    "UICONTEXT_DataSourceWindowSupported",
    "UICONTEXT_DataSourceWizardSuppressed",
    "UICONTEXT_Debugging",
    "UICONTEXT_DesignMode",
    "UICONTEXT_Dragging",
    "UICONTEXT_EmptySolution",
    "UICONTEXT_FirstLaunchSetup",
    "UICONTEXT_FullScreenMode",
    "UICONTEXT_FullSolutionLoading",
    "UICONTEXT_HistoricalDebugging",
    "UICONTEXT_NoSolution",
    "UICONTEXT_NotBuildingAndNotDebugging",
    "UICONTEXT_OsWindows8OrHigher",
    "UICONTEXT_ProjectCreating",
    "UICONTEXT_ProjectRetargeting",
    "UICONTEXT_RepositoryOpen",
    "UICONTEXT_SolutionBuilding",
    "UICONTEXT_SolutionClosing",
    "UICONTEXT_SolutionExists",
    "UICONTEXT_SolutionExistsAndFullyLoaded",
    "UICONTEXT_SolutionExistsAndNotBuildingAndNotDebugging",
    "UICONTEXT_SolutionHasMultipleProjects",
    "UICONTEXT_SolutionHasSingleProject",
    "UICONTEXT_SolutionOpening",
    "UICONTEXT_SolutionOrProjectUpgrading",
    "UICONTEXT_SynchronousSolutionOperation",
    "UICONTEXT_ToolboxInitialized",
];

/// Editor factories offered for `editor` attributes, besides declared symbols.
pub const EDITOR_GUIDS: &[&str] = &["GUID_TextEditorFactory", "guidVSStd97", "guidVSStd2K"];

/// Headers offered for `Extern/@href`.
pub const EXTERN_HEADERS: &[&str] = &["stdidcmd.h", "vsshlids.h"];

/// Files offered for `Include/@href`.
pub const INCLUDE_FILES: &[&str] = &["KnownImageIds.vsct"];
