//! vsct-lsp: editor intelligence for Visual Studio command tables
//!
//! This crate provides the core of the `vsct-lsp` language server: attribute
//! value completion, go-to-definition and image previews for `.vsct`
//! documents, whose `GuidSymbol`/`IDSymbol` declarations are shared between
//! files through `Include` elements.
//!
//! # Architecture
//!
//! Requests flow through a few small stages, leaves first:
//!
//! - [`classify`]: lexical span classification of the editor buffer
//! - [`context`]: which attribute value the caret is in
//! - [`fragment`]: lenient parsing of the caret line
//! - [`document`]: symbol trees, the include graph and its cache
//! - [`completion`]: attribute-specific completion providers
//! - [`gotodef`]: declaration lookup for guids and ids
//! - [`registry`]: the well-known moniker and menu catalogs
//! - [`engine`]: the façade the server (or any other host) calls
//!
//! # Resources
//!
//! A few features read files from a resources directory (`resources_dir` in
//! the settings, `--resources-dir` on the command line, `Resources` next to
//! the executable by default):
//!
//! - `VSGlobals.vsct`, the fallback for an `Include` of that name
//! - `Menus/<id>.png`, menu previews for hover and completion details
//! - `KnownMonikers.txt` and `KnownMenuIds.txt`, full catalogs that replace
//!   the bundled ones
//!
//! None of these ship with the crate. Without them the fallback and previews
//! are simply unavailable.
//!
//! # Usage
//!
//! ```ignore
//! use vsct_lsp::config::Settings;
//! use vsct_lsp::engine::Engine;
//! use vsct_lsp::snapshot::Snapshot;
//!
//! let engine = Engine::new(Settings::default());
//! let snapshot = Snapshot::new(path, text);
//! let completions = engine.completions_at(&snapshot, caret);
//! ```

// Host seams
pub mod classify;
pub mod fs;
pub mod snapshot;

// Parsing and symbol resolution
pub mod context;
pub mod document;
pub mod fragment;
pub mod gotodef;

// LSP feature modules
pub mod completion;
pub mod hover;
pub mod registry;

// Entry points, configuration and errors
pub mod config;
pub mod engine;
pub mod error;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
