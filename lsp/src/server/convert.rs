//! Conversions from core analysis results to `lsp_types`.

use qls_core::lint::{Diagnostic as CoreDiagnostic, Severity};
use qls_core::query::{
    self, CompletionEntry, CompletionKind, DocRange, OutlineKind, OutlineNode, TextEdit as CoreTextEdit,
};
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, Diagnostic, DiagnosticSeverity, DocumentSymbol, NumberOrString, Position,
    Range, SymbolKind, TextEdit,
};

pub(crate) fn range(r: &DocRange) -> Range {
    Range {
        start: Position {
            line: r.start.line,
            character: r.start.character,
        },
        end: Position {
            line: r.end.line,
            character: r.end.character,
        },
    }
}

pub(crate) fn diagnostic(d: &CoreDiagnostic) -> Diagnostic {
    Diagnostic {
        range: range(&query::doc_range(&d.span)),
        severity: Some(match d.severity {
            Severity::Error => DiagnosticSeverity::ERROR,
            Severity::Warning => DiagnosticSeverity::WARNING,
        }),
        code: Some(NumberOrString::String(d.code.to_string())),
        source: Some("qls".to_string()),
        message: d.message.clone(),
        ..Default::default()
    }
}

pub(crate) fn symbol(node: &OutlineNode) -> DocumentSymbol {
    #[allow(deprecated)]
    DocumentSymbol {
        name: node.label.clone(),
        detail: None,
        kind: match node.kind {
            OutlineKind::Function => SymbolKind::FUNCTION,
            OutlineKind::Argument => SymbolKind::FIELD,
            OutlineKind::Variable | OutlineKind::Local => SymbolKind::VARIABLE,
        },
        tags: None,
        deprecated: None,
        range: range(&node.range),
        selection_range: range(&node.selection_range),
        children: if node.children.is_empty() {
            None
        } else {
            Some(node.children.iter().map(symbol).collect())
        },
    }
}

pub(crate) fn completion_item(entry: &CompletionEntry) -> CompletionItem {
    CompletionItem {
        label: entry.label.clone(),
        kind: Some(match entry.kind {
            CompletionKind::Function => CompletionItemKind::FUNCTION,
            CompletionKind::Variable => CompletionItemKind::VARIABLE,
        }),
        ..Default::default()
    }
}

pub(crate) fn text_edit(edit: &CoreTextEdit) -> TextEdit {
    TextEdit {
        range: range(&edit.range),
        new_text: edit.new_text.clone(),
    }
}
