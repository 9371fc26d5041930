//! Document synchronization tests
//!
//! Drive the real LanguageServer methods end-to-end: open, change, and
//! close documents, then observe the effects through feature requests.

use augur_lsp::server::AugurLspServer;
use tower_lsp::lsp_types::*;
use tower_lsp::{LanguageServer, LspService};

fn test_uri(name: &str) -> Url {
    Url::parse(&format!("file:///{name}")).unwrap()
}

async fn open(server: &AugurLspServer, uri: &Url, text: &str, version: i32) {
    server
        .did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: uri.clone(),
                language_id: "augur".to_string(),
                version,
                text: text.to_string(),
            },
        })
        .await;
}

async fn change(server: &AugurLspServer, uri: &Url, text: &str, version: i32) {
    server
        .did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier {
                uri: uri.clone(),
                version,
            },
            content_changes: vec![TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: text.to_string(),
            }],
        })
        .await;
}

async fn hover_at(server: &AugurLspServer, uri: &Url, line: u32, character: u32) -> Option<Hover> {
    server
        .hover(HoverParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri: uri.clone() },
                position: Position::new(line, character),
            },
            work_done_progress_params: WorkDoneProgressParams::default(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_open_then_hover_resolves_symbols() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("open.aug");

    open(server, &uri, "spell greet(name):\n    return name\n", 1).await;

    let hover = hover_at(server, &uri, 0, 7).await.expect("hover on greet");
    match hover.contents {
        HoverContents::Markup(markup) => assert!(markup.value.contains("greet(name)")),
        other => panic!("expected markup, got {other:?}"),
    }
}

#[tokio::test]
async fn test_change_replaces_analysis_state() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("change.aug");

    open(server, &uri, "spell old():\n    return 1\n", 1).await;
    assert!(hover_at(server, &uri, 0, 7).await.is_some());

    change(server, &uri, "spell renamed():\n    return 1\n", 2).await;

    let hover = hover_at(server, &uri, 0, 8).await.expect("hover on renamed");
    match hover.contents {
        HoverContents::Markup(markup) => assert!(markup.value.contains("renamed")),
        other => panic!("expected markup, got {other:?}"),
    }
}

#[tokio::test]
async fn test_broken_edit_keeps_previous_symbols() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("stale.aug");

    open(server, &uri, "spell keep():\n    return 1\n", 1).await;

    // A change that no longer parses: hover still answers from the last
    // good generation.
    change(server, &uri, "spell keep((:\n    return 1\n", 2).await;

    let hover = hover_at(server, &uri, 0, 7).await;
    assert!(
        hover.is_some(),
        "stale symbols should keep serving after a failed parse"
    );
}

#[tokio::test]
async fn test_close_evicts_state() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("close.aug");

    open(server, &uri, "spell gone():\n    return 1\n", 1).await;
    server
        .did_close(DidCloseTextDocumentParams {
            text_document: TextDocumentIdentifier { uri: uri.clone() },
        })
        .await;

    assert!(
        hover_at(server, &uri, 0, 7).await.is_none(),
        "closed documents should answer nothing"
    );
}

#[tokio::test]
async fn test_files_are_independent() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let a = test_uri("ind_a.aug");
    let b = test_uri("ind_b.aug");

    open(server, &a, "spell alpha():\n    return 1\n", 1).await;
    open(server, &b, "spell beta():\n    return 2\n", 1).await;

    // Rebuilding B (even to broken text) must not affect A.
    change(server, &b, "spell beta((:\n", 2).await;

    assert!(hover_at(server, &a, 0, 7).await.is_some());
}
