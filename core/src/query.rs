//! Stateless query operations over a resolved token arena: outline,
//! references, definition, rename and completion. Every operation starts
//! from a freshly analyzed snapshot; nothing here caches.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::scope::is_local;
use crate::token::{IdentKind, Span, Token, TokenCategory, TokenRole};

/// 0-based protocol position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocPosition {
    pub line: u32,
    pub character: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocRange {
    pub start: DocPosition,
    pub end: DocPosition,
}

/// Map a 1-based inclusive token span to the protocol's 0-based convention:
/// `start = (line-1, column-1)`, `end = (line-1, column)`. The end column is
/// deliberately not decremented; hosts rely on this exact shape.
pub fn doc_range(span: &Span) -> DocRange {
    DocRange {
        start: DocPosition {
            line: span.start.line - 1,
            character: span.start.column - 1,
        },
        end: DocPosition {
            line: span.end.line - 1,
            character: span.end.column,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutlineKind {
    Function,
    Variable,
    Argument,
    Local,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlineNode {
    pub label: String,
    pub kind: OutlineKind,
    pub range: DocRange,
    pub selection_range: DocRange,
    pub children: Vec<OutlineNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextEdit {
    pub range: DocRange,
    pub new_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompletionKind {
    Function,
    Variable,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionEntry {
    pub label: String,
    pub kind: CompletionKind,
}

/// Resolve a 0-based protocol cursor to a token index. Returns `None` when
/// no token covers the position or the covering token cannot be a query
/// subject; every downstream query then yields an empty result.
pub fn token_at_position(tokens: &[Token], line: u32, character: u32) -> Option<usize> {
    let (line1, col1) = (line + 1, character + 1);
    let idx = tokens.iter().position(|t| t.span.contains(line1, col1))?;
    if tokens[idx].kind == IdentKind::Unassignable {
        return None;
    }
    Some(idx)
}

/// One top-level entry per scope-less assignment; functions carry their
/// lambda's parameter and local assignments as children.
pub fn outline(tokens: &[Token]) -> Vec<OutlineNode> {
    let mut out = Vec::new();
    for (i, t) in tokens.iter().enumerate() {
        if !(t.role == TokenRole::Assignment && t.scope.is_none() && t.category == TokenCategory::Identifier) {
            continue;
        }
        let lambda = lambda_after(tokens, i);
        let mut node = OutlineNode {
            label: t.short_name().to_string(),
            kind: if lambda.is_some() {
                OutlineKind::Function
            } else {
                OutlineKind::Variable
            },
            range: doc_range(&t.span),
            selection_range: doc_range(&t.span),
            children: Vec::new(),
        };
        if let Some(lambda_idx) = lambda {
            for child in tokens.iter().filter(|c| {
                c.role == TokenRole::Assignment
                    && c.scope == Some(lambda_idx)
                    && c.category == TokenCategory::Identifier
            }) {
                node.children.push(OutlineNode {
                    label: child.short_name().to_string(),
                    kind: if child.kind == IdentKind::Argument {
                        OutlineKind::Argument
                    } else {
                        OutlineKind::Local
                    },
                    range: doc_range(&child.span),
                    selection_range: doc_range(&child.span),
                    children: Vec::new(),
                });
            }
        }
        out.push(node);
    }
    out
}

/// Every occurrence of the source token's binding, both roles.
pub fn references(tokens: &[Token], idx: usize) -> Vec<DocRange> {
    candidates(tokens, idx)
        .into_iter()
        .map(|i| doc_range(&tokens[i].span))
        .collect()
}

/// Assignment occurrences of the source token's binding.
pub fn definition(tokens: &[Token], idx: usize) -> Vec<DocRange> {
    candidates(tokens, idx)
        .into_iter()
        .filter(|&i| tokens[i].role == TokenRole::Assignment)
        .map(|i| doc_range(&tokens[i].span))
        .collect()
}

/// Text edits replacing every occurrence of the binding. An empty result is
/// a no-op rename.
pub fn rename(tokens: &[Token], idx: usize, new_name: &str) -> Vec<TextEdit> {
    candidates(tokens, idx)
        .into_iter()
        .map(|i| TextEdit {
            range: doc_range(&tokens[i].span),
            new_text: new_name.to_string(),
        })
        .collect()
}

/// Assignment identifiers visible from the cursor: global scope or exactly
/// the cursor's scope, namespace globally qualified or matching the
/// cursor's; first occurrence wins per name.
pub fn completion(tokens: &[Token], cursor_idx: usize) -> Vec<CompletionEntry> {
    let Some(cursor) = tokens.get(cursor_idx) else {
        return Vec::new();
    };
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut out = Vec::new();
    for (i, t) in tokens.iter().enumerate() {
        if t.role != TokenRole::Assignment || t.category != TokenCategory::Identifier {
            continue;
        }
        if !(t.scope.is_none() || t.scope == cursor.scope) {
            continue;
        }
        if !(t.image.starts_with('.') || t.namespace == cursor.namespace) {
            continue;
        }
        if !seen.insert(t.image.as_str()) {
            continue;
        }
        out.push(CompletionEntry {
            label: t.short_name().to_string(),
            kind: if lambda_after(tokens, i).is_some() {
                CompletionKind::Function
            } else {
                CompletionKind::Variable
            },
        });
    }
    out
}

/// The shared matcher behind references, definition and rename. Local
/// sources match on exact scope index and name; non-local sources match on
/// name across all tokens that are not local in their own scope, which
/// keeps unrelated same-named locals out.
fn candidates(tokens: &[Token], idx: usize) -> Vec<usize> {
    let Some(src) = tokens.get(idx) else {
        return Vec::new();
    };
    if src.kind == IdentKind::Unassignable {
        return Vec::new();
    }
    if is_local(tokens, src) {
        tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.category == TokenCategory::Identifier && t.scope == src.scope && t.image == src.image)
            .map(|(i, _)| i)
            .collect()
    } else {
        tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                t.category == TokenCategory::Identifier && t.image == src.image && !is_local(tokens, t)
            })
            .map(|(i, _)| i)
            .collect()
    }
}

/// Index of the lambda-open token when `tokens[i]` is the `f` of `f:{...}`.
fn lambda_after(tokens: &[Token], i: usize) -> Option<usize> {
    if tokens.get(i + 1)?.category != TokenCategory::Assign {
        return None;
    }
    if tokens.get(i + 2)?.category != TokenCategory::LambdaOpen {
        return None;
    }
    Some(i + 2)
}
