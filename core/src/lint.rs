//! Fixed registry of lint rules over the resolved token arena.
//!
//! Every rule is total: it scans the full sequence and returns the indices
//! of violating tokens. Rules are independent; `run` concatenates their
//! results in table order.

use serde::Serialize;

use crate::token::{IdentKind, Span, SyntaxError, Token, TokenCategory, TokenRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub span: Span,
    pub message: String,
    pub severity: Severity,
}

pub struct Rule {
    pub code: &'static str,
    pub severity: Severity,
    pub check: fn(&[Token]) -> Vec<usize>,
}

pub static RULES: &[Rule] = &[
    Rule {
        code: "DEPRECATED_DATETIME",
        severity: Severity::Warning,
        check: deprecated_datetime,
    },
    Rule {
        code: "INVALID_ESCAPE",
        severity: Severity::Error,
        check: invalid_escape,
    },
    Rule {
        code: "ASSIGN_RESERVED_WORD",
        severity: Severity::Error,
        check: assign_reserved_word,
    },
    Rule {
        code: "INVALID_ASSIGN",
        severity: Severity::Error,
        check: invalid_assign,
    },
    Rule {
        code: "FIXED_SEED",
        severity: Severity::Warning,
        check: fixed_seed,
    },
    Rule {
        code: "UNUSED_PARAM",
        severity: Severity::Warning,
        check: unused_param,
    },
    Rule {
        code: "UNUSED_VAR",
        severity: Severity::Warning,
        check: unused_var,
    },
    Rule {
        code: "DECLARED_AFTER_USE",
        severity: Severity::Warning,
        check: declared_after_use,
    },
];

/// Run every rule and map hits to diagnostics.
pub fn run(tokens: &[Token]) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for rule in RULES {
        for idx in (rule.check)(tokens) {
            let token = &tokens[idx];
            out.push(Diagnostic {
                code: rule.code,
                span: token.span,
                message: message(rule.code, token),
                severity: rule.severity,
            });
        }
    }
    out
}

fn message(code: &str, token: &Token) -> String {
    match code {
        "DEPRECATED_DATETIME" => "long-form date-time literals are deprecated; use a timestamp instead".to_string(),
        "INVALID_ESCAPE" => "invalid escape sequence in string literal".to_string(),
        "ASSIGN_RESERVED_WORD" => format!("cannot assign to reserved word '{}'", token.image),
        "INVALID_ASSIGN" => format!("'{}' is not a valid assignment target", token.image),
        "FIXED_SEED" => format!(
            "'{}?0Ng' draws guids from a fixed seed; use a negative count for a fresh seed",
            token.image
        ),
        "UNUSED_PARAM" => format!("parameter '{}' is never used", token.image),
        "UNUSED_VAR" => format!("'{}' is assigned but never used", token.image),
        "DECLARED_AFTER_USE" => format!("'{}' is declared after it is used", token.image),
        _ => code.to_string(),
    }
}

fn deprecated_datetime(tokens: &[Token]) -> Vec<usize> {
    hits(tokens, |t| t.category == TokenCategory::DateTime)
}

fn invalid_escape(tokens: &[Token]) -> Vec<usize> {
    hits(tokens, |t| t.error == Some(SyntaxError::InvalidEscape))
}

fn assign_reserved_word(tokens: &[Token]) -> Vec<usize> {
    hits(tokens, |t| {
        t.role == TokenRole::Assignment && t.category == TokenCategory::Keyword
    })
}

fn invalid_assign(tokens: &[Token]) -> Vec<usize> {
    hits(tokens, |t| t.error == Some(SyntaxError::InvalidAssignTarget))
}

fn fixed_seed(tokens: &[Token]) -> Vec<usize> {
    hits(tokens, |t| t.seed)
}

/// A parameter declaration with no read sharing its exact scope and name.
/// Only header declarations count; re-assigning a parameter in the body is
/// not a second "unused parameter".
fn unused_param(tokens: &[Token]) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.param_decl && t.role == TokenRole::Assignment && !has_read(tokens, t))
        .map(|(i, _)| i)
        .collect()
}

/// A non-Argument identifier assignment with no read sharing its exact scope
/// and name. Top-level assignments (scope `None`) are included: the document
/// scope counts as the enclosing context.
fn unused_var(tokens: &[Token]) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| {
            t.role == TokenRole::Assignment
                && t.category == TokenCategory::Identifier
                && matches!(t.kind, IdentKind::Local | IdentKind::Global)
                && !has_read(tokens, t)
        })
        .map(|(i, _)| i)
        .collect()
}

/// An assignment X with a read Y of the same scope and name that executes
/// first: either Y precedes X positionally, or both sit in the same paren or
/// bracket group, which evaluates right to left, and Y follows X.
fn declared_after_use(tokens: &[Token]) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, x)| x.role == TokenRole::Assignment && x.category == TokenCategory::Identifier)
        .filter(|(_, x)| {
            tokens.iter().any(|y| {
                y.role == TokenRole::Reference
                    && y.category == TokenCategory::Identifier
                    && y.scope == x.scope
                    && y.image == x.image
                    && (precedes(y, x) || (x.group.is_some() && y.group == x.group && precedes(x, y)))
            })
        })
        .map(|(i, _)| i)
        .collect()
}

fn hits(tokens: &[Token], pred: fn(&Token) -> bool) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| pred(t))
        .map(|(i, _)| i)
        .collect()
}

fn has_read(tokens: &[Token], target: &Token) -> bool {
    tokens.iter().any(|t| {
        t.role == TokenRole::Reference
            && t.category == TokenCategory::Identifier
            && t.scope == target.scope
            && t.image == target.image
    })
}

fn precedes(a: &Token, b: &Token) -> bool {
    (a.span.start.line, a.span.start.column) < (b.span.start.line, b.span.start.column)
}
