use std::collections::HashMap;

use ropey::Rope;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::LanguageServer;
use tracing::info;

use qls_core::{lint, query, scope, token};

use super::convert;
use super::state::{Document, QlsLanguageServer};

impl QlsLanguageServer {
    fn diagnostics_for(&self, uri: &Url) -> Vec<Diagnostic> {
        let Some(content) = self.snapshot(uri) else {
            return Vec::new();
        };
        let tokens = scope::analyze(&content);
        lint::run(&tokens).iter().map(convert::diagnostic).collect()
    }

    async fn publish_diagnostics(&self, uri: Url, version: Option<i32>) {
        let diagnostics = self.diagnostics_for(&uri);
        self.client.publish_diagnostics(uri, diagnostics, version).await;
    }

    /// Resolve the cursor to a query subject, falling back one column so a
    /// cursor sitting just past the last character of a name still hits it.
    fn subject_at(tokens: &[token::Token], position: Position) -> Option<usize> {
        query::token_at_position(tokens, position.line, position.character).or_else(|| {
            query::token_at_position(tokens, position.line, position.character.checked_sub(1)?)
        })
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for QlsLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("qls initializing, root {:?}", params.root_uri);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                // Analysis re-tokenizes the whole document per request, so
                // full sync keeps the document store trivial.
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![".".to_string()]),
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                document_symbol_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                definition_provider: Some(OneOf::Left(true)),
                rename_provider: Some(OneOf::Left(true)),
                diagnostic_provider: Some(DiagnosticServerCapabilities::Options(DiagnosticOptions {
                    identifier: Some("qls".to_string()),
                    inter_file_dependencies: false,
                    workspace_diagnostics: false,
                    work_done_progress_options: Default::default(),
                })),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "qls language server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("qls initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        info!("qls shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        self.documents.insert(
            uri.clone(),
            Document {
                content: Rope::from_str(&params.text_document.text),
                version,
            },
        );
        self.publish_diagnostics(uri, Some(version)).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        {
            let mut entry = self.documents.entry(uri.clone()).or_default();
            entry.version = version;
            // Full sync: the last change carries the whole document.
            if let Some(change) = params.content_changes.into_iter().last() {
                entry.content = Rope::from_str(&change.text);
            }
        }
        self.publish_diagnostics(uri, Some(version)).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn diagnostic(&self, params: DocumentDiagnosticParams) -> Result<DocumentDiagnosticReportResult> {
        let items = self.diagnostics_for(&params.text_document.uri);

        Ok(DocumentDiagnosticReportResult::Report(DocumentDiagnosticReport::Full(
            RelatedFullDocumentDiagnosticReport {
                related_documents: None,
                full_document_diagnostic_report: FullDocumentDiagnosticReport {
                    result_id: None,
                    items,
                },
            },
        )))
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> Result<Option<DocumentSymbolResponse>> {
        let Some(content) = self.snapshot(&params.text_document.uri) else {
            return Ok(None);
        };
        let tokens = scope::analyze(&content);
        let symbols: Vec<DocumentSymbol> = query::outline(&tokens).iter().map(convert::symbol).collect();
        if symbols.is_empty() {
            return Ok(None);
        }
        Ok(Some(DocumentSymbolResponse::Nested(symbols)))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let Some(content) = self.snapshot(uri) else {
            return Ok(None);
        };
        let tokens = scope::analyze(&content);
        let Some(idx) = query::token_at_position(&tokens, position.line, position.character) else {
            return Ok(None);
        };
        let locations: Vec<Location> = query::references(&tokens, idx)
            .iter()
            .map(|r| Location {
                uri: uri.clone(),
                range: convert::range(r),
            })
            .collect();
        if locations.is_empty() {
            return Ok(None);
        }
        Ok(Some(locations))
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some(content) = self.snapshot(uri) else {
            return Ok(None);
        };
        let tokens = scope::analyze(&content);
        let Some(idx) = query::token_at_position(&tokens, position.line, position.character) else {
            return Ok(None);
        };
        let mut locations: Vec<Location> = query::definition(&tokens, idx)
            .iter()
            .map(|r| Location {
                uri: uri.clone(),
                range: convert::range(r),
            })
            .collect();
        Ok(match locations.len() {
            0 => None,
            1 => locations.pop().map(GotoDefinitionResponse::Scalar),
            _ => Some(GotoDefinitionResponse::Array(locations)),
        })
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let new_name = params.new_name;

        let is_valid_name = {
            let mut chars = new_name.chars();
            match chars.next() {
                Some(c) if c.is_ascii_alphabetic() => chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_'),
                _ => false,
            }
        };
        if !is_valid_name || token::is_reserved(&new_name) {
            return Ok(None);
        }

        let Some(content) = self.snapshot(uri) else {
            return Ok(None);
        };
        let tokens = scope::analyze(&content);
        let Some(idx) = query::token_at_position(&tokens, position.line, position.character) else {
            return Ok(None);
        };
        let edits: Vec<TextEdit> = query::rename(&tokens, idx, &new_name).iter().map(convert::text_edit).collect();
        if edits.is_empty() {
            return Ok(None);
        }

        let mut changes = HashMap::new();
        changes.insert(uri.clone(), edits);
        Ok(Some(WorkspaceEdit {
            changes: Some(changes),
            document_changes: None,
            change_annotations: None,
        }))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let Some(content) = self.snapshot(uri) else {
            return Ok(None);
        };
        let tokens = scope::analyze(&content);
        let Some(idx) = Self::subject_at(&tokens, position) else {
            return Ok(None);
        };
        let items: Vec<CompletionItem> = query::completion(&tokens, idx).iter().map(convert::completion_item).collect();
        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(CompletionResponse::Array(items)))
    }
}
