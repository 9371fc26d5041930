//! Augur LSP server implementation

use std::sync::Arc;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::debug;

use crate::analysis::Analyzer;
use crate::document::DocumentStore;
use crate::symbols::SymbolTable;

/// Augur language server
pub struct AugurLspServer {
    client: Client,
    store: Arc<DocumentStore>,
    symbols: Arc<SymbolTable>,
    analyzer: Analyzer,
}

impl AugurLspServer {
    /// Create a new server bound to an LSP client handle
    pub fn new(client: Client) -> Self {
        let store = Arc::new(DocumentStore::new());
        let symbols = Arc::new(SymbolTable::new());
        let analyzer = Analyzer::new(store.clone(), symbols.clone());
        Self {
            client,
            store,
            symbols,
            analyzer,
        }
    }

    /// Analyze a document and push its diagnostics to the editor
    async fn publish_diagnostics(&self, uri: Url, version: i32) {
        let diagnostics = self.analyzer.analyze(&uri);
        self.client
            .publish_diagnostics(uri, diagnostics, Some(version))
            .await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for AugurLspServer {
    async fn initialize(&self, _params: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![".".to_string(), ":".to_string()]),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                signature_help_provider: Some(SignatureHelpOptions {
                    trigger_characters: Some(vec!["(".to_string(), ",".to_string()]),
                    retrigger_characters: None,
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                document_formatting_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "augur-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "Augur LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        debug!(uri = %doc.uri, version = doc.version, "didOpen");

        self.store.open(
            doc.uri.clone(),
            doc.language_id,
            doc.text,
            doc.version,
        );
        self.publish_diagnostics(doc.uri, doc.version).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        debug!(%uri, version, "didChange");

        // Full sync only: every change event carries the whole text, and
        // the last one wins.
        for change in params.content_changes {
            self.store.apply_change(&uri, change.text, version);
        }
        self.publish_diagnostics(uri, version).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!(%uri, "didClose");

        self.store.close(&uri);
        self.symbols.evict(&uri);

        // Clear any published diagnostics for the closed file
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some(doc) = self.store.get(&uri) else {
            return Ok(None);
        };
        let items = crate::completion::completions(&self.symbols, &doc.text, &uri, position);
        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(doc) = self.store.get(&uri) else {
            return Ok(None);
        };
        Ok(crate::hover::hover(&self.symbols, &doc.text, &uri, position))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(doc) = self.store.get(&uri) else {
            return Ok(None);
        };
        Ok(
            crate::navigation::definition(&self.symbols, &doc.text, &uri, position)
                .map(GotoDefinitionResponse::Scalar),
        )
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(doc) = self.store.get(&uri) else {
            return Ok(None);
        };
        Ok(crate::signature::signature_help(
            &self.symbols,
            &doc.text,
            &uri,
            position,
        ))
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;

        let Some(doc) = self.store.get(&uri) else {
            return Ok(None);
        };
        Ok(crate::formatting::format_edits(&doc.text))
    }
}
