//! Error taxonomy for the command-table engine.
//!
//! None of these are fatal. A half-typed document is the normal state of an
//! editor buffer, so every variant degrades a single request (no completions,
//! no navigation) and the [`Engine`](crate::engine::Engine) turns it into `None`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VsctError {
    /// The caret line is not a parseable fragment, even after closing its tags.
    #[error("line is not a parseable xml fragment: {0}")]
    FragmentUnparseable(#[source] roxmltree::Error),

    /// The whole document failed to parse.
    #[error("document is not well-formed xml: {0}")]
    DocumentUnparseable(#[source] roxmltree::Error),

    /// An `Include` target is missing or could not be read.
    #[error("included file {path} is unreadable: {source}")]
    IncludeUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A symbol lookup matched zero or several declarations.
    #[error("expected exactly one symbol named `{name}`, found {found}")]
    AmbiguousSymbol { name: String, found: usize },
}

pub type Result<T> = std::result::Result<T, VsctError>;
