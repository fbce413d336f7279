use dashmap::DashMap;
use ropey::Rope;
use tower_lsp::lsp_types::Url;
use tower_lsp::Client;

/// In-memory representation of an open document.
#[derive(Debug, Default)]
pub(crate) struct Document {
    pub(crate) content: Rope,
    pub(crate) version: i32,
}

/// Primary server state shared across handlers. Analysis is stateless, so
/// the only state is the set of open documents.
pub(crate) struct QlsLanguageServer {
    pub(crate) client: Client,
    pub(crate) documents: DashMap<Url, Document>,
}

impl QlsLanguageServer {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: DashMap::new(),
        }
    }

    /// Full text of an open document, or `None` when the uri is unknown.
    pub(crate) fn snapshot(&self, uri: &Url) -> Option<String> {
        self.documents.get(uri).map(|doc| doc.content.to_string())
    }
}
