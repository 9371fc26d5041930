//! Signature help tests

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

async fn change(server: &AugurLspServer, uri: &Url, text: &str) {
    server
        .did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier {
                uri: uri.clone(),
                version: 2,
            },
            content_changes: vec![TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: text.to_string(),
            }],
        })
        .await;
}

async fn signature_at(
    server: &AugurLspServer,
    uri: &Url,
    line: u32,
    character: u32,
) -> Option<SignatureHelp> {
    server
        .signature_help(SignatureHelpParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri: uri.clone() },
                position: Position::new(line, character),
            },
            work_done_progress_params: WorkDoneProgressParams::default(),
            context: None,
        })
        .await
        .unwrap()
}

const CALC: &str = "\
grim Calc:
    spell add(a, b):
        return a + b

spell main():
    calc = Calc()
    calc
";

#[tokio::test]
async fn test_active_parameter_after_comma() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("comma.aug");

    open(server, &uri, CALC).await;
    change(server, &uri, &CALC.replace("    calc\n", "    calc.add(1, \n")).await;

    // Cursor after `calc.add(1, ` (0-based line 6, character 16).
    let help = signature_at(server, &uri, 6, 16)
        .await
        .expect("signature help inside call");
    assert_eq!(help.signatures[0].label, "add(a, b)");
    assert_eq!(help.active_parameter, Some(1));
}

#[tokio::test]
async fn test_active_parameter_at_open_paren() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("paren.aug");

    open(server, &uri, CALC).await;
    change(server, &uri, &CALC.replace("    calc\n", "    calc.add(\n")).await;

    // Cursor right after `calc.add(` (0-based line 6, character 13).
    let help = signature_at(server, &uri, 6, 13)
        .await
        .expect("signature help at open paren");
    assert_eq!(help.active_parameter, Some(0));
}

#[tokio::test]
async fn test_builtin_signature_fallback() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("builtin.aug");

    open(server, &uri, "x = 1\n").await;
    change(server, &uri, "x = len(\n").await;

    let help = signature_at(server, &uri, 0, 8)
        .await
        .expect("builtin signature");
    assert_eq!(help.signatures[0].label, "len(object) -> int");
    assert_eq!(help.active_parameter, Some(0));
}

#[tokio::test]
async fn test_no_help_outside_calls() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("outside.aug");

    open(server, &uri, "x = 1 + 2\n").await;
    assert!(signature_at(server, &uri, 0, 9).await.is_none());
}
