//! Attribute value completion.
//!
//! Every completable attribute maps to a fixed list of [`Provider`]s. The
//! dispatcher runs them over each tree of the include graph in turn (root
//! first), concatenates what they return and keeps the first candidate per
//! display text. Providers also see the fragment element on the caret line
//! and the well-known registries.

mod editor;
mod guid_symbol;
mod guid_symbol_id;
mod href;

use std::sync::Arc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionItemLabelDetails, CompletionTextEdit, Range,
    TextEdit,
};

use crate::document::{DocumentGraph, ElementRef, SymbolTree};
use crate::registry::WellKnownRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemIcon {
    Symbol,
    Image,
    Menu,
    File,
}

impl ItemIcon {
    fn kind(self) -> CompletionItemKind {
        match self {
            ItemIcon::Symbol => CompletionItemKind::CONSTANT,
            ItemIcon::Image => CompletionItemKind::COLOR,
            ItemIcon::Menu => CompletionItemKind::ENUM_MEMBER,
            ItemIcon::File => CompletionItemKind::FILE,
        }
    }
}

/// Tags read back when a description is requested for an item.
///
/// Sent to the client as the item's `data` and returned on
/// `completionItem/resolve`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProperties {
    #[serde(default)]
    pub is_global: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_moniker_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub display_text: String,
    pub icon: ItemIcon,
    /// Short label shown after the text, e.g. `Image` or `<Menu>`.
    pub suffix: String,
    pub properties: ItemProperties,
}

impl CompletionCandidate {
    pub fn symbol(name: &str) -> CompletionCandidate {
        CompletionCandidate {
            display_text: name.to_string(),
            icon: ItemIcon::Symbol,
            suffix: String::new(),
            properties: ItemProperties::default(),
        }
    }

    pub fn file(name: &str) -> CompletionCandidate {
        CompletionCandidate {
            icon: ItemIcon::File,
            ..CompletionCandidate::symbol(name)
        }
    }

    pub fn known_moniker(name: &str) -> CompletionCandidate {
        CompletionCandidate {
            display_text: name.to_string(),
            icon: ItemIcon::Image,
            suffix: "Image".to_string(),
            properties: ItemProperties {
                known_moniker_name: Some(name.to_string()),
                ..ItemProperties::default()
            },
        }
    }

    pub fn known_menu_id(id: &str) -> CompletionCandidate {
        CompletionCandidate {
            display_text: id.to_string(),
            icon: ItemIcon::Menu,
            suffix: "Group/Menu".to_string(),
            properties: ItemProperties::default(),
        }
    }

    /// An id declared in a shell-global guid scope.
    ///
    /// Global ids are dotted paths that alternate menu and group segments,
    /// starting with a menu, so an even number of inner dots is a menu.
    pub fn global_id(name: &str) -> CompletionCandidate {
        let dots = name.trim_matches('.').matches('.').count();
        let suffix = if dots % 2 == 0 { "<Menu>" } else { "<Group>" };

        CompletionCandidate {
            display_text: name.to_string(),
            icon: ItemIcon::Menu,
            suffix: suffix.to_string(),
            properties: ItemProperties {
                is_global: true,
                ..ItemProperties::default()
            },
        }
    }

    pub fn has_deferred_description(&self) -> bool {
        self.properties.is_global || self.properties.known_moniker_name.is_some()
    }

    /// Convert into an LSP item that replaces `range` with the display text.
    pub fn to_lsp(&self, range: Range) -> CompletionItem {
        let data = self
            .has_deferred_description()
            .then(|| serde_json::to_value(&self.properties).ok())
            .flatten();

        CompletionItem {
            label: self.display_text.clone(),
            label_details: (!self.suffix.is_empty()).then(|| CompletionItemLabelDetails {
                detail: None,
                description: Some(self.suffix.clone()),
            }),
            kind: Some(self.icon.kind()),
            text_edit: Some(CompletionTextEdit::Edit(TextEdit {
                range,
                new_text: self.display_text.clone(),
            })),
            filter_text: Some(self.display_text.clone()),
            data,
            ..Default::default()
        }
    }
}

/// Completion strategies, one per attribute family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Declared `GuidSymbol` names plus context-specific well-known guids.
    GuidSymbol,
    /// Ids scoped by the element's `guid` attribute.
    GuidSymbolId,
    /// Well-known editor factories.
    Editor,
    /// Well-known header and include files.
    Href,
}

impl Provider {
    /// Providers for an attribute name, matched case-insensitively.
    pub fn for_attribute(attribute_name: &str) -> &'static [Provider] {
        match attribute_name.to_ascii_lowercase().as_str() {
            "guid" | "package" | "context" => &[Provider::GuidSymbol],
            "id" => &[Provider::GuidSymbolId],
            "editor" => &[Provider::GuidSymbol, Provider::Editor],
            "href" => &[Provider::Href],
            _ => &[],
        }
    }

    fn candidates(
        self,
        tree: &SymbolTree,
        fragment: ElementRef<'_>,
        registry: &WellKnownRegistry,
    ) -> Arc<[CompletionCandidate]> {
        match self {
            Provider::GuidSymbol => guid_symbol::candidates(tree, fragment).into(),
            Provider::GuidSymbolId => guid_symbol_id::candidates(tree, fragment, registry),
            Provider::Editor => editor::candidates().into(),
            Provider::Href => href::candidates(fragment).into(),
        }
    }
}

pub fn is_attribute_completable(attribute_name: &str) -> bool {
    !Provider::for_attribute(attribute_name).is_empty()
}

/// Candidates for `attribute_name` on the `fragment` element, without
/// duplicate display texts.
///
/// When nothing after the first batch adds a new name, that batch is returned
/// as is, so registry-backed results stay the registry's own shared slice.
pub fn get_completions(
    graph: &DocumentGraph,
    fragment: ElementRef<'_>,
    attribute_name: &str,
    registry: &WellKnownRegistry,
) -> Arc<[CompletionCandidate]> {
    let providers = Provider::for_attribute(attribute_name);
    let batches = graph
        .trees()
        .iter()
        .flat_map(|tree| {
            providers
                .iter()
                .map(move |provider| provider.candidates(tree, fragment, registry))
        })
        .collect::<Vec<_>>();

    let Some(first) = batches.first() else {
        return Vec::new().into();
    };

    let unique = batches
        .iter()
        .flat_map(|batch| batch.iter())
        .unique_by(|c| c.display_text.as_str())
        .cloned()
        .collect::<Vec<_>>();

    if unique.len() == first.len() && first.iter().map(|c| &c.display_text).all_unique() {
        first.clone()
    } else {
        unique.into()
    }
}
