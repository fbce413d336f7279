//! Identifier-kind and locality resolution over the token arena.

use rustc_hash::FxHashSet;

use crate::token::{IdentKind, Token, TokenCategory, TokenRole, Tokenizer};

/// Tokenize and resolve a full document snapshot in one pass. This is the
/// entry point every request goes through; nothing is cached across calls.
pub fn analyze(text: &str) -> Vec<Token> {
    let mut tokens = Tokenizer::tokenize(text);
    resolve(&mut tokens);
    tokens
}

/// Assign an identifier kind to every token.
///
/// Parameter-header names and the implicit positional names of nullary
/// lambdas are Arguments; body occurrences of a declared parameter stay
/// Arguments as well, so re-assigning a parameter never demotes it to a
/// plain local. Everything identifier-shaped after that is Local or Global
/// by the locality test; non-identifiers are Unassignable.
pub fn resolve(tokens: &mut [Token]) {
    // (scope index, name) pairs declared in a parameter header.
    let declared: FxHashSet<(usize, &str)> = tokens
        .iter()
        .filter(|t| t.param_decl)
        .filter_map(|t| t.scope.map(|s| (s, t.image.as_str())))
        .collect();

    let kinds: Vec<IdentKind> = tokens
        .iter()
        .map(|t| {
            if t.category != TokenCategory::Identifier {
                return IdentKind::Unassignable;
            }
            if t.param_decl {
                return IdentKind::Argument;
            }
            if let Some(scope) = t.scope {
                if declared.contains(&(scope, t.image.as_str())) {
                    return IdentKind::Argument;
                }
                if t.is_implicit_param() && is_nullary(tokens, scope) {
                    return IdentKind::Argument;
                }
                if is_local(tokens, t) {
                    return IdentKind::Local;
                }
            }
            IdentKind::Global
        })
        .collect();

    for (t, kind) in tokens.iter_mut().zip(kinds) {
        t.kind = kind;
    }
}

/// The locality test: a token is local iff it has an enclosing scope and
/// either it is an implicit positional name of a nullary lambda, or some
/// token in the full sequence is an Assignment with the same scope index
/// and the same name. Recomputed per query over the whole arena.
pub fn is_local(tokens: &[Token], target: &Token) -> bool {
    let Some(scope) = target.scope else {
        return false;
    };
    if target.is_implicit_param() && is_nullary(tokens, scope) {
        return true;
    }
    tokens
        .iter()
        .any(|t| t.role == TokenRole::Assignment && t.scope == target.scope && t.image == target.image)
}

fn is_nullary(tokens: &[Token], scope: usize) -> bool {
    tokens
        .get(scope)
        .and_then(|t| t.lambda)
        .is_some_and(|l| l.nullary)
}
