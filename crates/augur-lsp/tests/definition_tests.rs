//! Go-to-definition tests

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

async fn definition_at(
    server: &AugurLspServer,
    uri: &Url,
    line: u32,
    character: u32,
) -> Option<Location> {
    let response = server
        .goto_definition(GotoDefinitionParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri: uri.clone() },
                position: Position::new(line, character),
            },
            work_done_progress_params: WorkDoneProgressParams::default(),
            partial_result_params: PartialResultParams::default(),
        })
        .await
        .unwrap()?;
    match response {
        GotoDefinitionResponse::Scalar(location) => Some(location),
        other => panic!("expected scalar location, got {other:?}"),
    }
}

#[tokio::test]
async fn test_definition_line_is_zero_based() {
    // `Dragon` is declared on source line 10 (1-based); the location must
    // come back as line 9 (0-based).
    let mut source = String::new();
    for i in 1..=9 {
        source.push_str(&format!("filler{i} = {i}\n"));
    }
    source.push_str("grim Dragon:\n    spell fly():\n        return 1\n\n");
    source.push_str("spell main():\n    pet = Dragon()\n");

    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("dragon.aug");
    open(server, &uri, &source).await;

    // Use site `pet = Dragon()` is 0-based line 14; `Dragon` starts at
    // character 10.
    let location = definition_at(server, &uri, 14, 12)
        .await
        .expect("definition of Dragon");
    assert_eq!(location.uri, uri);
    assert_eq!(location.range.start.line, 9);
    assert_eq!(location.range.start.character, 5);
    assert_eq!(location.range.end.character, 11);
}

#[tokio::test]
async fn test_definition_of_method() {
    let source = "\
grim Calc:
    spell add(a, b):
        return a + b

spell main():
    calc = Calc()
    total = calc.add(1, 2)
";
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("method.aug");
    open(server, &uri, source).await;

    // Cursor on `add` in `calc.add(...)` (0-based line 6, character 17).
    let location = definition_at(server, &uri, 6, 17)
        .await
        .expect("definition of add");
    assert_eq!(location.range.start.line, 1);
    assert_eq!(location.range.start.character, 10);
}

#[tokio::test]
async fn test_definition_prefers_nearest_scope() {
    let source = "\
spell first():
    mark = 1
    return mark

spell second():
    mark = 2
    return mark
";
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("shadow.aug");
    open(server, &uri, source).await;

    // `mark` used inside `second` (0-based line 6) resolves to the
    // binding in `second` (line 5), not the one in `first`.
    let location = definition_at(server, &uri, 6, 12)
        .await
        .expect("definition of mark");
    assert_eq!(location.range.start.line, 5);
}

#[tokio::test]
async fn test_no_definition_for_unknown_name() {
    let (service, _socket) = LspService::new(AugurLspServer::new);
    let server = service.inner();
    let uri = test_uri("unknown.aug");
    open(server, &uri, "x = mystery\n").await;

    assert!(definition_at(server, &uri, 0, 6).await.is_none());
}
