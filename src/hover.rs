//! Rich descriptions for completion items and attribute values.
//!
//! Two kinds of preview exist:
//!
//! | Source | Preview |
//! |--------|---------|
//! | Image-catalog moniker | `<moniker_images_dir>/<name>.png`, else the moniker name |
//! | Shell-global menu or group id | `<resources_dir>/Menus/<id>.png`, or the closest dotted parent |
//!
//! Descriptions are computed only when the client asks for one, never while
//! building a completion list.

use std::ops::Range;
use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::{MarkupContent, MarkupKind, Url};

use crate::classify::{ClassifiedSpan, SpanKind};
use crate::completion::ItemProperties;
use crate::config::Settings;
use crate::fs::FileSystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description {
    Image { name: String, path: PathBuf },
    Text(String),
}

impl Description {
    pub fn to_markup(&self) -> MarkupContent {
        let value = match self {
            Description::Image { name, path } => match Url::from_file_path(path) {
                Ok(url) => format!("![{name}]({url})"),
                Err(()) => format!("`{name}`"),
            },
            Description::Text(text) => text.clone(),
        };

        MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }
    }
}

/// Description of a completion item from the tags it was created with.
pub fn describe_item(
    display_text: &str,
    properties: &ItemProperties,
    settings: &Settings,
    fs: &dyn FileSystem,
) -> Option<Description> {
    if let Some(name) = &properties.known_moniker_name {
        let image = settings
            .moniker_images_dir()
            .map(|dir| dir.join(format!("{name}.png")))
            .filter(|path| fs.exists(path));

        return Some(match image {
            Some(path) => Description::Image {
                name: name.clone(),
                path,
            },
            None => Description::Text(format!("KnownMonikers.{name}")),
        });
    }

    if properties.is_global {
        return menu_preview(display_text, settings, fs);
    }

    None
}

/// Preview for the attribute value under `caret`, with the value's extent.
///
/// `line_spans` classify the caret line.
pub fn hover_at(
    text: &str,
    line_spans: &[ClassifiedSpan],
    caret: usize,
    settings: &Settings,
    fs: &dyn FileSystem,
) -> Option<(Description, Range<usize>)> {
    if !settings.hover {
        return None;
    }

    let value = line_spans
        .iter()
        .find(|s| s.is(SpanKind::AttributeValue) && s.start <= caret && caret < s.end())?;

    menu_preview(value.text(text), settings, fs).map(|description| (description, value.range()))
}

fn menu_preview(name: &str, settings: &Settings, fs: &dyn FileSystem) -> Option<Description> {
    let path = find_menu_image(name, &settings.menus_dir()?, fs)?;

    Some(Description::Image {
        name: name.to_string(),
        path,
    })
}

/// `<menus_dir>/<name>.png`, dropping trailing dotted segments of `name` until
/// an image exists.
pub fn find_menu_image(name: &str, menus_dir: &Path, fs: &dyn FileSystem) -> Option<PathBuf> {
    let mut segments = name.split('.').filter(|s| !s.is_empty()).collect::<Vec<_>>();

    while !segments.is_empty() {
        let file = menus_dir.join(format!("{}.png", segments.join(".")));
        if fs.exists(&file) {
            return Some(file);
        }
        segments.pop();
    }

    None
}
