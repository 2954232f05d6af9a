use std::sync::Arc;

use crate::document::{ElementRef, SymbolTree};
use crate::registry::{WellKnownRegistry, IMAGE_CATALOG_GUID, MAIN_MENU_GUID};

use super::CompletionCandidate;

/// Guids whose names start with this prefix declare shell-global menus.
const GLOBAL_SCOPE_PREFIX: &str = "VS";

pub(super) fn candidates(
    tree: &SymbolTree,
    fragment: ElementRef<'_>,
    registry: &WellKnownRegistry,
) -> Arc<[CompletionCandidate]> {
    let Some(guid) = fragment.attribute("guid") else {
        return Vec::new().into();
    };

    match guid {
        IMAGE_CATALOG_GUID => registry.known_monikers(),
        MAIN_MENU_GUID => registry.known_menu_ids(),
        _ => declared_ids(tree, guid).into(),
    }
}

/// Ids below every `GuidSymbol` named `guid`, at any depth.
fn declared_ids(tree: &SymbolTree, guid: &str) -> Vec<CompletionCandidate> {
    let global = guid.starts_with(GLOBAL_SCOPE_PREFIX);

    tree.elements_named("GuidSymbol")
        .filter(|symbol| symbol.attribute("name") == Some(guid))
        .flat_map(|symbol| symbol.descendants_named("IDSymbol"))
        .filter_map(|id| id.attribute("name"))
        .map(|name| {
            if global {
                CompletionCandidate::global_id(name)
            } else {
                CompletionCandidate::symbol(name)
            }
        })
        .collect()
}
