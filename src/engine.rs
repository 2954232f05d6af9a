//! The host-facing entry points.
//!
//! An [`Engine`] answers completion, navigation and description requests for
//! one snapshot at a time. It holds no per-document state: everything a
//! request needs is derived from the snapshot it is given, except the shared
//! well-known registry and include cache.
//!
//! Every failure inside a request is expected while the user types, so the
//! engine logs it at `debug` and answers `None`.

use std::ops::Range;
use std::sync::Arc;

use tower_lsp::lsp_types::Position;
use tracing::debug;

use crate::classify::{Classifier, ClassifiedSpan, XmlClassifier};
use crate::completion::{self, CompletionCandidate, ItemProperties};
use crate::config::Settings;
use crate::context::{resolve_context, resolve_navigation_context};
use crate::document::{GraphBuilder, IncludeCache};
use crate::error::Result;
use crate::fragment::parse_fragment;
use crate::fs::{FileSystem, OsFileSystem};
use crate::gotodef::resolve_definition;
use crate::hover::{self, Description};
use crate::registry::WellKnownRegistry;
use crate::snapshot::Snapshot;

/// Completion candidates and the value text they replace.
#[derive(Debug, Clone)]
pub struct Completions {
    pub applicable_to: Range<usize>,
    pub items: Arc<[CompletionCandidate]>,
}

pub struct Engine {
    settings: Settings,
    registry: Arc<WellKnownRegistry>,
    cache: Arc<IncludeCache>,
    fs: Arc<dyn FileSystem>,
    classifier: Arc<dyn Classifier>,
}

impl Engine {
    /// An engine over the real file system, sharing the process-wide include
    /// cache. Catalog files in the resources directory replace the bundled
    /// registry.
    pub fn new(settings: Settings) -> Engine {
        let registry =
            WellKnownRegistry::from_resources(settings.resources_dir().as_deref(), &OsFileSystem);

        Engine::with_services(
            settings,
            registry,
            IncludeCache::shared(),
            Arc::new(OsFileSystem),
            Arc::new(XmlClassifier),
        )
    }

    pub fn with_services(
        settings: Settings,
        registry: Arc<WellKnownRegistry>,
        cache: Arc<IncludeCache>,
        fs: Arc<dyn FileSystem>,
        classifier: Arc<dyn Classifier>,
    ) -> Engine {
        Engine {
            settings,
            registry,
            cache,
            fs,
            classifier,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_attribute_completable(&self, attribute_name: &str) -> bool {
        completion::is_attribute_completable(attribute_name)
    }

    pub fn completions_at(&self, snapshot: &Snapshot, caret: usize) -> Option<Completions> {
        let (line, line_start) = snapshot.line_extent(caret);
        let line_spans = self.classify_line(snapshot, line, line_start);

        let context = resolve_context(snapshot.text(), &line_spans, caret)?;
        if !self.is_attribute_completable(&context.attribute_name) {
            return None;
        }

        let fragment = degrade(parse_fragment(line), "fragment")?;
        let bundled_dir = self.settings.resources_dir();
        let graph = degrade(
            GraphBuilder::new(&self.cache, self.fs.as_ref(), bundled_dir.as_deref())
                .build(snapshot.text(), snapshot.path()),
            "document graph",
        )?;

        let items = completion::get_completions(
            &graph,
            fragment.root(),
            &context.attribute_name,
            &self.registry,
        );

        debug!(
            attribute = %context.attribute_name,
            element = ?context.element_name,
            items = items.len(),
            "completions"
        );

        Some(Completions {
            applicable_to: context.value_extent,
            items,
        })
    }

    /// Where the guid or id under `caret` is declared in the same document.
    pub fn try_navigate(&self, snapshot: &Snapshot, caret: usize) -> Option<Position> {
        let text = snapshot.text();
        let root = degrade(
            GraphBuilder::new(&self.cache, self.fs.as_ref(), None).parse_root(text, snapshot.path()),
            "navigation root",
        )?;

        let spans = self.classifier.classify(text, 0..text.len());
        let target = resolve_navigation_context(snapshot, &spans, caret, &root)?;

        let position = resolve_definition(
            &root,
            &target.context.attribute_name,
            root.element(target.element),
            &target.value,
        );
        debug!(
            attribute = %target.context.attribute_name,
            value = %target.value,
            ?position,
            "navigation"
        );

        position
    }

    pub fn describe_item(
        &self,
        display_text: &str,
        properties: &ItemProperties,
    ) -> Option<Description> {
        hover::describe_item(display_text, properties, &self.settings, self.fs.as_ref())
    }

    pub fn hover_at(&self, snapshot: &Snapshot, caret: usize) -> Option<(Description, Range<usize>)> {
        let (line, line_start) = snapshot.line_extent(caret);
        let line_spans = self.classify_line(snapshot, line, line_start);

        hover::hover_at(
            snapshot.text(),
            &line_spans,
            caret,
            &self.settings,
            self.fs.as_ref(),
        )
    }

    fn classify_line(&self, snapshot: &Snapshot, line: &str, line_start: usize) -> Vec<ClassifiedSpan> {
        self.classifier
            .classify(snapshot.text(), line_start..line_start + line.len())
    }
}

fn degrade<T>(result: Result<T>, stage: &str) -> Option<T> {
    result
        .map_err(|err| debug!(%err, stage, "request degraded"))
        .ok()
}
