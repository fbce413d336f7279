use std::fmt;

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use serde::Serialize;

mod lexer;
#[cfg(test)]
mod token_test;

pub use lexer::Tokenizer;

/// 1-based source position. `offset` is the char index into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self { line, column, offset }
    }

    pub fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source extent of one token. `end` is the position of the last character,
/// so a one-character token has `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// True when the 1-based (line, column) point sits on this span.
    pub fn contains(&self, line: u32, column: u32) -> bool {
        (line, column) >= (self.start.line, self.start.column) && (line, column) <= (self.end.line, self.end.column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}:{}-{}", self.start.line, self.start.column, self.end.column)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenCategory {
    Identifier,
    /// Reserved word. Identifier-shaped but never a legal assignment target.
    Keyword,
    /// Numeric literal, including dates, times, timestamps and typed nulls.
    Number,
    /// Deprecated long-form date-time literal (`2000.01.01T12:00:00.000`).
    DateTime,
    String,
    Symbol,
    Operator,
    Adverb,
    /// Assignment operator: `:`, `::` or a compound such as `+:`.
    Assign,
    /// Brackets, parens and expression separators.
    Delimiter,
    LambdaOpen,
    LambdaClose,
    /// System command line (`\d .ns`, `\l file.q`, ...).
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenRole {
    /// Left-hand side of a bind (or a parameter declaration).
    Assignment,
    Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IdentKind {
    /// Bound by an enclosing lambda's parameter header or an implicit
    /// positional name of a nullary lambda.
    Argument,
    /// Bound by an in-scope assignment.
    Local,
    Global,
    /// Literals, reserved words and punctuation; excluded from every
    /// reference/definition/rename/completion result.
    Unassignable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyntaxError {
    InvalidEscape,
    InvalidAssignTarget,
    UnterminatedString,
}

/// Marker carried only by lambda-open tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lambda {
    /// True when the lambda declared no explicit parameter list and exposes
    /// the implicit positional names instead.
    pub nullary: bool,
}

/// One lexical unit of a document. Tokens live in a flat arena (`Vec<Token>`);
/// `scope` and `group` are indices into that arena.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub category: TokenCategory,
    pub image: String,
    pub span: Span,
    pub role: TokenRole,
    pub kind: IdentKind,
    /// Namespace context: the explicit dotted prefix for qualified names,
    /// otherwise the ambient namespace active at this token (root is ".").
    pub namespace: String,
    /// Index of the innermost enclosing lambda-open token, if any.
    pub scope: Option<usize>,
    /// Index of the innermost enclosing paren/bracket group token, if any.
    pub group: Option<usize>,
    pub lambda: Option<Lambda>,
    pub error: Option<SyntaxError>,
    /// Token sits inside a lambda parameter header.
    pub param_decl: bool,
    /// Numeric literal used as a fixed seed to the random-generation operator.
    pub seed: bool,
}

impl Token {
    pub fn is_identifier(&self) -> bool {
        self.category == TokenCategory::Identifier
    }

    pub fn is_assignment(&self) -> bool {
        self.role == TokenRole::Assignment
    }

    /// Identifier image with any dotted namespace prefix stripped.
    pub fn short_name(&self) -> &str {
        if self.image.starts_with('.') {
            match self.image.rfind('.') {
                Some(0) | None => &self.image,
                Some(i) => &self.image[i + 1..],
            }
        } else {
            &self.image
        }
    }

    /// True for the fixed positional parameter names of nullary lambdas.
    pub fn is_implicit_param(&self) -> bool {
        matches!(self.image.as_str(), "x" | "y" | "z")
    }
}

/// The three implicit positional parameter names exposed by nullary lambdas.
pub const IMPLICIT_PARAMS: [&str; 3] = ["x", "y", "z"];

/// Reserved words of the language: control constructs plus the built-in
/// keyword vocabulary. None of these may be an assignment target.
pub static RESERVED_WORDS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "abs", "acos", "aj", "aj0", "all", "and", "any", "asc", "asin", "asof", "atan", "attr", "avg", "avgs", "bin",
        "binr", "by", "ceiling", "cols", "cor", "cos", "count", "cov", "cross", "csv", "cut", "delete", "deltas",
        "desc", "dev", "differ", "distinct", "div", "do", "dsave", "each", "ej", "ema", "enlist", "eval", "except",
        "exec", "exit", "exp", "fby", "fills", "first", "fkeys", "flip", "floor", "from", "get", "getenv", "group",
        "gtime", "hclose", "hcount", "hdel", "hopen", "hsym", "iasc", "idesc", "if", "ij", "ijf", "in", "insert",
        "inter", "inv", "key", "keys", "last", "like", "lj", "ljf", "load", "log", "lower", "lsq", "ltime", "ltrim",
        "mavg", "max", "maxs", "mcount", "md5", "mdev", "med", "meta", "min", "mins", "mmax", "mmin", "mmu", "mod",
        "msum", "neg", "next", "not", "null", "or", "over", "parse", "peach", "pj", "prd", "prds", "prev", "prior",
        "rand", "rank", "ratios", "raze", "read0", "read1", "reciprocal", "reval", "reverse", "rload", "rotate",
        "rsave", "rtrim", "save", "scan", "scov", "sdev", "select", "set", "setenv", "show", "signum", "sin", "sqrt",
        "ss", "ssr", "string", "sublist", "sum", "sums", "sv", "svar", "system", "tables", "tan", "til", "trim",
        "type", "uj", "ujf", "ungroup", "union", "update", "upper", "upsert", "value", "var", "view", "views", "vs",
        "wavg", "where", "while", "within", "wj", "wj1", "wsum", "xasc", "xbar", "xcol", "xcols", "xdesc", "xexp",
        "xgroup", "xkey", "xlog", "xprev", "xrank",
    ]
    .into_iter()
    .collect()
});

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(word)
}
