//! Document formatting tests

use augur_lsp::server::AugurLspServer;
use tower_lsp::lsp_types::*;
use tower_lsp::{LanguageServer, LspService};

fn test_uri(name: &str) -> Url {
    Url::parse(&format!("file:///{name}")).unwrap()
}

async fn open(server: &AugurLspServer, uri: &Url, text: &str) {
    server
        .did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: uri.clone(),
                language_id: "augur".to_string(),
                version: 1,
                text: text.to_string(),
            },
        })
        .await;
}

async fn format(server: &AugurLspServer, uri: &Url) -> Option<Vec<TextEdit>> {
    server
        .formatting(DocumentFormattingParams {
            text_document: TextDocumentIdentifier { uri: uri.clone() },
            options: FormattingOptions::default(),
            work_done_progress_params: WorkDoneProgressParams::default(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_formats_messy_indentation() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("messy.aug");

    open(server, &uri, "spell f():\n  a = 1\n  return a\n").await;

    let edits = format(server, &uri).await.expect("edits for messy file");
    assert_eq!(edits.len(), 1);
    assert_eq!(
        edits[0].new_text,
        "spell f():\n    a = 1\n    return a\n"
    );
    assert_eq!(edits[0].range.start, Position::new(0, 0));
}

#[tokio::test]
async fn test_clean_document_needs_no_edits() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("clean.aug");

    open(server, &uri, "spell f():\n    return 1\n").await;
    assert!(format(server, &uri).await.is_none());
}

#[tokio::test]
async fn test_broken_document_is_not_formatted() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("broken.aug");

    open(server, &uri, "spell broken((:\n").await;
    assert!(format(server, &uri).await.is_none());
}
