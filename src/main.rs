use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use dashmap::DashMap;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vsct_lsp::completion::ItemProperties;
use vsct_lsp::config::Settings;
use vsct_lsp::engine::Engine;
use vsct_lsp::snapshot::Snapshot;

/// Language server for Visual Studio command table (.vsct) files.
#[derive(Parser, Debug, Clone)]
#[command(name = "vsct-lsp", version, about)]
struct Args {
    /// Directory holding VSGlobals.vsct, the Menus/ preview images and
    /// optional KnownMonikers.txt / KnownMenuIds.txt catalogs.
    ///
    /// Defaults to `Resources` next to the executable. Nothing is installed
    /// there: without these files the VSGlobals.vsct fallback and menu
    /// previews are unavailable and the bundled catalogs are used.
    #[arg(long)]
    resources_dir: Option<String>,

    /// Log filter, e.g. `debug` or `vsct_lsp=trace` (defaults to $VSCT_LSP_LOG, then `info`)
    #[arg(long)]
    log: Option<String>,
}

struct Backend {
    client: Client,
    args: Args,
    documents: DashMap<Url, Arc<Snapshot>>,
    engine: RwLock<Arc<Engine>>,
}

impl Backend {
    fn new(client: Client, args: Args) -> Backend {
        let settings = Settings {
            resources_dir: args.resources_dir.clone(),
            ..Settings::default()
        };

        Backend {
            client,
            args,
            documents: DashMap::new(),
            engine: RwLock::new(Arc::new(Engine::new(settings))),
        }
    }

    fn store(&self, uri: Url, text: String) {
        let path = uri
            .to_file_path()
            .unwrap_or_else(|_| PathBuf::from(uri.path()));
        self.documents.insert(uri, Arc::new(Snapshot::new(path, text)));
    }

    /// The engine and snapshot for a request, with the caret as a byte offset.
    async fn request(
        &self,
        uri: &Url,
        position: Position,
    ) -> Option<(Arc<Engine>, Arc<Snapshot>, usize)> {
        let snapshot = self.documents.get(uri)?.clone();
        let caret = snapshot.offset_at(position)?;
        let engine = self.engine.read().await.clone();

        Some((engine, snapshot, caret))
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        #[allow(deprecated)]
        let root_dir = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| &folder.uri)
            .or(params.root_uri.as_ref())
            .and_then(|uri| uri.to_file_path().ok());

        if let Some(root_dir) = root_dir {
            match Settings::new(&root_dir, self.args.resources_dir.as_deref()) {
                Ok(settings) => {
                    info!(root = %root_dir.display(), ?settings, "loaded settings");
                    *self.engine.write().await = Arc::new(Engine::new(settings));
                }
                Err(err) => warn!(%err, "falling back to default settings"),
            }
        }

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "vsct-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                position_encoding: Some(PositionEncodingKind::UTF16),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                // No trigger characters: a value needs at least one typed
                // character before the caret to resolve.
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(true),
                    ..Default::default()
                }),
                definition_provider: Some(OneOf::Left(true)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                ..Default::default()
            },
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "vsct-lsp initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.store(params.text_document.uri, params.text_document.text);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        if let Some(change) = params.content_changes.into_iter().last() {
            self.store(params.text_document.uri, change.text);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.remove(&params.text_document.uri);
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        let Some((engine, snapshot, caret)) =
            self.request(&position.text_document.uri, position.position).await
        else {
            return Ok(None);
        };

        // Include files are read and parsed on this path.
        let items = tokio::task::spawn_blocking(move || {
            let completions = engine.completions_at(&snapshot, caret)?;
            let range = snapshot.range_of(completions.applicable_to);

            Some(
                completions
                    .items
                    .iter()
                    .map(|candidate| candidate.to_lsp(range))
                    .collect::<Vec<_>>(),
            )
        })
        .await
        .unwrap_or_else(|err| {
            warn!(%err, "completion task failed");
            None
        });

        Ok(items.map(|items| {
            CompletionResponse::List(CompletionList {
                is_incomplete: false,
                items,
            })
        }))
    }

    async fn completion_resolve(&self, mut item: CompletionItem) -> Result<CompletionItem> {
        let Some(properties) = item
            .data
            .clone()
            .and_then(|data| serde_json::from_value::<ItemProperties>(data).ok())
        else {
            return Ok(item);
        };

        let engine = self.engine.read().await.clone();
        if let Some(description) = engine.describe_item(&item.label, &properties) {
            item.documentation = Some(Documentation::MarkupContent(description.to_markup()));
        }

        Ok(item)
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let position = params.text_document_position_params;
        let uri = position.text_document.uri;
        let Some((engine, snapshot, caret)) = self.request(&uri, position.position).await else {
            return Ok(None);
        };

        Ok(engine.try_navigate(&snapshot, caret).map(|target| {
            GotoDefinitionResponse::Scalar(Location {
                uri,
                range: Range::new(target, target),
            })
        }))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params;
        let Some((engine, snapshot, caret)) =
            self.request(&position.text_document.uri, position.position).await
        else {
            return Ok(None);
        };

        Ok(engine
            .hover_at(&snapshot, caret)
            .map(|(description, extent)| Hover {
                contents: HoverContents::Markup(description.to_markup()),
                range: Some(snapshot.range_of(extent)),
            }))
    }
}

/// Log to stderr; stdout carries the protocol.
fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(filter) => EnvFilter::new(filter),
        None => EnvFilter::try_from_env("VSCT_LSP_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.log.as_deref());

    info!(resources_dir = ?args.resources_dir, "vsct-lsp starting");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| Backend::new(client, args));
    Server::new(stdin, stdout, socket).serve(service).await;
}
