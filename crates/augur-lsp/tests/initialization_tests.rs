//! Server initialization tests

use augur_lsp::server::AugurLspServer;
use tower_lsp::lsp_types::*;
use tower_lsp::{LanguageServer, LspService};

#[tokio::test]
async fn test_initialize_advertises_capabilities() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();

    let result = server
        .initialize(InitializeParams::default())
        .await
        .unwrap();
    let capabilities = result.capabilities;

    assert_eq!(
        capabilities.text_document_sync,
        Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
        "only full-document sync is supported"
    );

    let completion = capabilities.completion_provider.expect("completion");
    assert!(completion
        .trigger_characters
        .unwrap_or_default()
        .contains(&".".to_string()));

    assert!(capabilities.hover_provider.is_some());
    assert!(capabilities.definition_provider.is_some());
    assert!(capabilities.document_formatting_provider.is_some());

    let signature = capabilities.signature_help_provider.expect("signature");
    let triggers = signature.trigger_characters.unwrap_or_default();
    assert!(triggers.contains(&"(".to_string()));
    assert!(triggers.contains(&",".to_string()));

    let info = result.server_info.expect("server info");
    assert_eq!(info.name, "augur-lsp");
}

#[tokio::test]
async fn test_shutdown_succeeds() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    assert!(server.shutdown().await.is_ok());
}
