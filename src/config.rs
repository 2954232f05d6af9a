use std::path::{Path, PathBuf};

use anyhow::anyhow;
use config::{Config, File, FileFormat};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Show menu preview images when hovering attribute values.
    pub hover: bool,
    /// Directory holding the bundled `VSGlobals.vsct` and `Menus/*.png`.
    pub resources_dir: Option<String>,
    /// Directory of `<moniker>.png` images for image-catalog completions.
    pub moniker_images_dir: Option<String>,
}

impl Settings {
    pub fn new(root_dir: &Path, resources_override: Option<&str>) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/vsct-lsp/settings");
        let settings = Config::builder()
            .add_source(
                File::with_name(&expanded)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                File::with_name(&format!(
                    "{}/.vsct-lsp",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .format(FileFormat::Toml)
                .required(false),
            )
            .set_default("hover", true)?
            .set_override_option("resources_dir", resources_override.map(str::to_string))?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }

    /// The configured resources directory, or `Resources` next to the
    /// server executable.
    pub fn resources_dir(&self) -> Option<PathBuf> {
        match &self.resources_dir {
            Some(dir) => Some(expand(dir)),
            None => std::env::current_exe()
                .ok()?
                .parent()
                .map(|dir| dir.join("Resources")),
        }
    }

    pub fn menus_dir(&self) -> Option<PathBuf> {
        self.resources_dir().map(|dir| dir.join("Menus"))
    }

    pub fn moniker_images_dir(&self) -> Option<PathBuf> {
        self.moniker_images_dir.as_deref().map(expand)
    }
}

fn expand(dir: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(dir).as_ref())
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            hover: true,
            resources_dir: None,
            moniker_images_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::test_utils::create_test_workspace_dir;

    #[test]
    fn workspace_file_overrides_defaults() {
        let (_temp_dir, workspace) = create_test_workspace_dir();
        fs::write(
            workspace.join(".vsct-lsp"),
            "hover = false\nmoniker_images_dir = \"/opt/monikers\"\n",
        )
        .unwrap();

        let settings = Settings::new(&workspace, None).unwrap();

        assert!(!settings.hover);
        assert_eq!(
            settings.moniker_images_dir(),
            Some(PathBuf::from("/opt/monikers"))
        );
    }

    #[test]
    fn command_line_resources_dir_wins() {
        let (_temp_dir, workspace) = create_test_workspace_dir();
        fs::write(workspace.join(".vsct-lsp"), "resources_dir = \"/from/file\"\n").unwrap();

        let settings = Settings::new(&workspace, Some("/from/cli")).unwrap();

        assert_eq!(settings.resources_dir(), Some(PathBuf::from("/from/cli")));
        assert_eq!(
            settings.menus_dir(),
            Some(PathBuf::from("/from/cli/Menus"))
        );
    }

    #[test]
    fn missing_files_give_defaults() {
        let (_temp_dir, workspace) = create_test_workspace_dir();

        let settings = Settings::new(&workspace, None).unwrap();

        assert!(settings.hover);
        assert_eq!(settings.moniker_images_dir, None);
    }
}
