//! Document state management
//!
//! Tracks the text, version, and language id of every open file. Only
//! full-document synchronization is supported: changes replace the text
//! wholesale, there is no range patching.

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;
use tracing::{debug, warn};

/// An open source file as last sent by the editor
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,
    pub text: String,
    pub version: i32,
    pub language_id: String,
}

/// Store of all open documents, keyed by URI
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
}

impl DocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a document. Always succeeds.
    pub fn open(&self, uri: Url, language_id: String, text: String, version: i32) {
        debug!(%uri, version, "opened document");
        self.documents.insert(
            uri.clone(),
            Document {
                uri,
                text,
                version,
                language_id,
            },
        );
    }

    /// Snapshot of a document, if open
    pub fn get(&self, uri: &Url) -> Option<Document> {
        self.documents.get(uri).map(|doc| doc.value().clone())
    }

    /// Replace a document's text and bump its version.
    ///
    /// Unknown URIs are logged and ignored; the editor is ahead of us and
    /// there is nothing sensible to patch.
    pub fn apply_change(&self, uri: &Url, new_text: String, version: i32) {
        match self.documents.get_mut(uri) {
            Some(mut doc) => {
                doc.text = new_text;
                doc.version = version;
                debug!(%uri, version, "replaced document text");
            }
            None => {
                warn!(%uri, "change for unknown document ignored");
            }
        }
    }

    /// Remove a document from the store
    pub fn close(&self, uri: &Url) {
        if self.documents.remove(uri).is_some() {
            debug!(%uri, "closed document");
        }
    }

    /// Number of open documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
