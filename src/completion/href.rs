use crate::document::ElementRef;
use crate::registry::{EXTERN_HEADERS, INCLUDE_FILES};

use super::CompletionCandidate;

pub(super) fn candidates(fragment: ElementRef<'_>) -> Vec<CompletionCandidate> {
    let files: &[&str] = match fragment.name() {
        "Extern" => EXTERN_HEADERS,
        "Include" => INCLUDE_FILES,
        _ => &[],
    };

    files.iter().map(|name| CompletionCandidate::file(name)).collect()
}
