use crate::registry::EDITOR_GUIDS;

use super::CompletionCandidate;

pub(super) fn candidates() -> Vec<CompletionCandidate> {
    EDITOR_GUIDS
        .iter()
        .map(|name| CompletionCandidate::symbol(name))
        .collect()
}
