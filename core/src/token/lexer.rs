use tracing::trace;

use crate::token::{
    IdentKind, Lambda, Position, Span, SyntaxError, Token, TokenCategory, TokenRole, is_reserved,
};

/// Char-level scanner producing the flat token arena.
///
/// The scanner never fails: malformed input is tagged on the offending token
/// (`error`, `InvalidAssignTarget`, ...) and scanning continues, so every
/// request gets a position-complete sequence even for in-progress edits.
pub struct Tokenizer {
    chars: Vec<char>,
    idx: usize,
    len: usize,
    line: u32,
    column: u32,
    /// Position of the most recently consumed character.
    last: Position,
    tokens: Vec<Token>,
    /// Open lambda-open token indices, innermost last.
    scopes: Vec<usize>,
    /// Open paren/bracket token indices, innermost last.
    groups: Vec<usize>,
    /// Ambient namespace set by the most recent `\d` command.
    namespace: String,
    /// Lambda-open index whose parameter header may start at the next token.
    pending_params: Option<usize>,
    /// Group index of the parameter header currently being scanned.
    header_group: Option<usize>,
}

impl Tokenizer {
    /// Tokenize a full document snapshot. Scope and group indices are
    /// assigned here; identifier kinds are filled in by `scope::resolve`.
    pub fn tokenize(input: &str) -> Vec<Token> {
        let chars: Vec<char> = input.chars().collect();
        let mut t = Tokenizer {
            len: chars.len(),
            chars,
            idx: 0,
            line: 1,
            column: 1,
            last: Position::start(),
            tokens: Vec::with_capacity(input.len() / 4),
            scopes: Vec::new(),
            groups: Vec::new(),
            namespace: ".".to_string(),
            pending_params: None,
            header_group: None,
        };
        t.parse();
        t.mark_seeds();
        trace!(tokens = t.tokens.len(), "tokenized document");
        t.tokens
    }

    fn eof(&self) -> bool {
        self.idx >= self.len
    }

    fn pos(&self) -> Position {
        Position::new(self.line, self.column, self.idx)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn char_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.idx + n).copied()
    }

    fn digits_at(&self, n: usize, count: usize) -> bool {
        (0..count).all(|i| self.char_at(n + i).is_some_and(|c| c.is_ascii_digit()))
    }

    /// `HH:MM` shape starting `off` characters ahead of the cursor.
    fn time_ahead(&self, off: usize) -> bool {
        self.digits_at(off, 2) && self.char_at(off + 2) == Some(':') && self.digits_at(off + 3, 2)
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.idx];
        self.last = self.pos();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.idx += 1;
        c
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn skip_rest_of_line(&mut self) {
        while let Some(c) = self.peek() {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    fn push(&mut self, category: TokenCategory, start: Position, image: String) -> usize {
        let idx = self.tokens.len();
        self.tokens.push(Token {
            category,
            image,
            span: Span::new(start, self.last),
            role: TokenRole::Reference,
            kind: IdentKind::Unassignable,
            namespace: self.namespace.clone(),
            scope: self.scopes.last().copied(),
            group: self.groups.last().copied(),
            lambda: None,
            error: None,
            param_decl: false,
            seed: false,
        });
        idx
    }

    fn parse(&mut self) {
        while !self.eof() {
            self.skip_whitespace();
            if self.eof() {
                break;
            }
            // A parameter header only counts when `[` is the very next token.
            let pending = self.pending_params.take();
            let c = self.chars[self.idx];
            match c {
                '"' => self.scan_string(),
                '`' => self.scan_symbol(),
                '/' => self.scan_slash(),
                '\\' => self.scan_backslash(),
                '0'..='9' => self.scan_number(),
                '{' => self.open_lambda(),
                '}' => self.close_lambda(),
                '(' => self.open_paren(),
                '[' => self.open_bracket(pending),
                ')' | ']' => self.close_group(c),
                ';' => {
                    let start = self.pos();
                    self.advance();
                    self.push(TokenCategory::Delimiter, start, ";".to_string());
                }
                ':' => self.scan_colon(),
                '\'' => {
                    let start = self.pos();
                    self.advance();
                    self.push(TokenCategory::Adverb, start, "'".to_string());
                }
                '.' => self.scan_dot(),
                c if c.is_ascii_alphabetic() => self.scan_identifier(),
                _ => {
                    // Best effort: any other character is a one-char operator.
                    let start = self.pos();
                    let ch = self.advance();
                    self.push(TokenCategory::Operator, start, ch.to_string());
                }
            }
        }
    }

    fn open_lambda(&mut self) {
        let start = self.pos();
        self.advance();
        let idx = self.push(TokenCategory::LambdaOpen, start, "{".to_string());
        self.tokens[idx].lambda = Some(Lambda { nullary: true });
        self.scopes.push(idx);
        self.pending_params = Some(idx);
    }

    fn close_lambda(&mut self) {
        let start = self.pos();
        self.advance();
        // The close brace still belongs to the lambda it closes.
        self.push(TokenCategory::LambdaClose, start, "}".to_string());
        self.scopes.pop();
    }

    fn open_paren(&mut self) {
        let start = self.pos();
        self.advance();
        let idx = self.push(TokenCategory::Delimiter, start, "(".to_string());
        self.groups.push(idx);
    }

    fn open_bracket(&mut self, pending: Option<usize>) {
        let start = self.pos();
        self.advance();
        let idx = self.push(TokenCategory::Delimiter, start, "[".to_string());
        self.groups.push(idx);
        if let Some(lambda_idx) = pending {
            self.tokens[lambda_idx].lambda = Some(Lambda { nullary: false });
            self.header_group = Some(idx);
        }
    }

    fn close_group(&mut self, c: char) {
        let start = self.pos();
        self.advance();
        self.push(TokenCategory::Delimiter, start, c.to_string());
        let popped = self.groups.pop();
        if popped.is_some() && popped == self.header_group {
            self.header_group = None;
        }
    }

    fn scan_identifier(&mut self) {
        let start = self.pos();
        let mut image = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                image.push(self.advance());
            } else if c == '.' && self.char_at(1).is_some_and(|n| n.is_ascii_alphanumeric() || n == '_') {
                image.push(self.advance());
            } else {
                break;
            }
        }
        self.finish_identifier(start, image);
    }

    fn finish_identifier(&mut self, start: Position, image: String) {
        if is_reserved(&image) {
            self.push(TokenCategory::Keyword, start, image);
            return;
        }
        let prefix = if image.starts_with('.') {
            match image.rfind('.') {
                Some(0) => Some(".".to_string()),
                Some(i) => Some(image[..i].to_string()),
                None => None,
            }
        } else {
            None
        };
        let in_header = self.header_group.is_some() && self.groups.last().copied() == self.header_group;
        let idx = self.push(TokenCategory::Identifier, start, image);
        if let Some(prefix) = prefix {
            self.tokens[idx].namespace = prefix;
        }
        if in_header {
            let t = &mut self.tokens[idx];
            t.role = TokenRole::Assignment;
            t.param_decl = true;
        }
    }

    fn scan_dot(&mut self) {
        if self.char_at(1).is_some_and(|c| c.is_ascii_alphabetic() || c == '_') {
            self.scan_identifier();
        } else {
            let start = self.pos();
            self.advance();
            self.push(TokenCategory::Operator, start, ".".to_string());
        }
    }

    fn scan_symbol(&mut self) {
        let start = self.pos();
        let mut image = String::new();
        image.push(self.advance()); // backtick
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '/') {
                image.push(self.advance());
            } else {
                break;
            }
        }
        self.push(TokenCategory::Symbol, start, image);
    }

    fn scan_string(&mut self) {
        let start = self.pos();
        let mut image = String::new();
        image.push(self.advance()); // opening quote
        let mut error: Option<SyntaxError> = None;
        let mut closed = false;
        while let Some(c) = self.peek() {
            if c == '"' {
                image.push(self.advance());
                closed = true;
                break;
            }
            if c == '\\' {
                image.push(self.advance());
                match self.peek() {
                    Some('n' | 'r' | 't' | '\\' | '"' | '/') => {
                        image.push(self.advance());
                    }
                    Some(d) if d.is_ascii_digit() => {
                        // Octal escape: exactly three digits, value <= 377.
                        let mut digits = String::new();
                        while digits.len() < 3 && self.peek().is_some_and(|c| c.is_ascii_digit()) {
                            let d = self.advance();
                            digits.push(d);
                            image.push(d);
                        }
                        let valid = digits.len() == 3
                            && digits.chars().all(|d| ('0'..='7').contains(&d))
                            && digits.as_bytes()[0] <= b'3';
                        if !valid {
                            error = error.or(Some(SyntaxError::InvalidEscape));
                        }
                    }
                    Some(_) => {
                        image.push(self.advance());
                        error = error.or(Some(SyntaxError::InvalidEscape));
                    }
                    None => {}
                }
            } else {
                image.push(self.advance());
            }
        }
        if !closed {
            error = error.or(Some(SyntaxError::UnterminatedString));
        }
        let idx = self.push(TokenCategory::String, start, image);
        self.tokens[idx].error = error;
    }

    /// `/` is a comment opener at line start or after whitespace, otherwise
    /// the over/each-right adverb attached to the preceding word.
    fn scan_slash(&mut self) {
        let at_line_start = self.column == 1;
        let after_space = self.idx == 0 || self.chars[self.idx - 1].is_whitespace();
        if at_line_start && self.rest_of_line_blank() {
            // Block comment: a lone `/` line, closed by a line starting `\`.
            self.skip_rest_of_line();
            while !self.eof() {
                if self.column == 1 && self.peek() == Some('\\') {
                    self.skip_rest_of_line();
                    break;
                }
                self.skip_rest_of_line();
            }
        } else if at_line_start || after_space {
            self.skip_rest_of_line();
        } else {
            let start = self.pos();
            self.advance();
            let mut image = "/".to_string();
            if self.peek() == Some(':') {
                image.push(self.advance());
            }
            self.push(TokenCategory::Adverb, start, image);
        }
    }

    fn rest_of_line_blank(&self) -> bool {
        let mut n = 1; // skip the `/` itself
        loop {
            match self.char_at(n) {
                None | Some('\n') => return true,
                Some(c) if c.is_whitespace() => n += 1,
                Some(_) => return false,
            }
        }
    }

    /// `\` at column 1 is a system command line (`\d` switches namespace);
    /// elsewhere it is the scan/each-left adverb.
    fn scan_backslash(&mut self) {
        if self.column == 1 {
            let start = self.pos();
            let mut image = String::new();
            while let Some(c) = self.peek() {
                if c == '\n' {
                    break;
                }
                image.push(self.advance());
            }
            if let Some(rest) = image.strip_prefix("\\d") {
                let ns = rest.trim();
                if !ns.is_empty() {
                    self.namespace = ns.to_string();
                }
            }
            self.push(TokenCategory::Command, start, image);
            return;
        }
        let start = self.pos();
        self.advance();
        let mut image = "\\".to_string();
        if self.peek() == Some(':') {
            image.push(self.advance());
        }
        self.push(TokenCategory::Adverb, start, image);
    }

    fn scan_number(&mut self) {
        let start = self.pos();
        let mut image = String::new();
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            image.push(self.advance());
        }

        // Date `YYYY.MM.DD`, optionally extended to the deprecated long-form
        // date-time (`T`) or a timestamp (`D`).
        if image.len() == 4
            && self.peek() == Some('.')
            && self.digits_at(1, 2)
            && self.char_at(3) == Some('.')
            && self.digits_at(4, 2)
        {
            for _ in 0..6 {
                image.push(self.advance());
            }
            if self.peek() == Some('T') && self.time_ahead(1) {
                image.push(self.advance());
                self.scan_time_tail(&mut image);
                self.push(TokenCategory::DateTime, start, image);
                return;
            }
            if self.peek() == Some('D') && self.time_ahead(1) {
                image.push(self.advance());
                self.scan_time_tail(&mut image);
            }
            self.push(TokenCategory::Number, start, image);
            return;
        }

        // Time `HH:MM(:SS(.mmm))`. At most two leading digits, so `100:1`
        // stays a number followed by an assignment.
        if image.len() <= 2 && self.peek() == Some(':') && self.digits_at(1, 2) {
            self.scan_time_tail(&mut image);
            self.push(TokenCategory::Number, start, image);
            return;
        }

        // Timespan `0D12:00:00`.
        if self.peek() == Some('D') && self.time_ahead(1) {
            image.push(self.advance());
            self.scan_time_tail(&mut image);
            self.push(TokenCategory::Number, start, image);
            return;
        }

        // Fraction, exponent, then one type-suffix run (`1b`, `2f`, `0Ng`).
        if self.peek() == Some('.') && self.char_at(1).is_some_and(|c| c.is_ascii_digit()) {
            image.push(self.advance());
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                image.push(self.advance());
            }
        }
        if matches!(self.peek(), Some('e' | 'E'))
            && (self.char_at(1).is_some_and(|c| c.is_ascii_digit())
                || (matches!(self.char_at(1), Some('+' | '-')) && self.char_at(2).is_some_and(|c| c.is_ascii_digit())))
        {
            image.push(self.advance());
            image.push(self.advance());
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                image.push(self.advance());
            }
        }
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            image.push(self.advance());
        }
        self.push(TokenCategory::Number, start, image);
    }

    /// Consume `(digits)(:MM(:SS(.mmm)))` continuing an already-started
    /// temporal image.
    fn scan_time_tail(&mut self, image: &mut String) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            image.push(self.advance());
        }
        if self.peek() == Some(':') && self.digits_at(1, 2) {
            for _ in 0..3 {
                image.push(self.advance());
            }
            if self.peek() == Some(':') && self.digits_at(1, 2) {
                for _ in 0..3 {
                    image.push(self.advance());
                }
            }
            if self.peek() == Some('.') && self.char_at(1).is_some_and(|c| c.is_ascii_digit()) {
                image.push(self.advance());
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    image.push(self.advance());
                }
            }
        }
    }

    /// `:` / `::` assignment, compound assignment (`+:`), the each-prior
    /// adverb (`':`) or the bare colon verb, depending on what precedes it.
    fn scan_colon(&mut self) {
        let start = self.pos();
        self.advance();
        let mut image = ":".to_string();
        if self.peek() == Some(':') {
            image.push(self.advance());
        }

        if image == ":" {
            if let Some(last) = self.tokens.last() {
                let adjacent = last.span.end.offset + 1 == start.offset;
                if adjacent && last.category == TokenCategory::Operator {
                    // Compound assignment: fold `:` into the operator token.
                    let n = self.tokens.len();
                    let last = &mut self.tokens[n - 1];
                    last.image.push(':');
                    last.span.end = self.last;
                    last.category = TokenCategory::Assign;
                    if n >= 2 && self.tokens[n - 2].category == TokenCategory::Identifier {
                        self.tokens[n - 2].role = TokenRole::Assignment;
                    }
                    return;
                }
                if adjacent && last.category == TokenCategory::Adverb && last.image == "'" {
                    let n = self.tokens.len();
                    let last = &mut self.tokens[n - 1];
                    last.image.push(':');
                    last.span.end = self.last;
                    return;
                }
            }
        }

        let assigned = self.mark_assign_target();
        let category = if assigned {
            TokenCategory::Assign
        } else {
            TokenCategory::Operator
        };
        self.push(category, start, image);
    }

    /// Classify the token preceding an assignment operator. Identifiers and
    /// reserved words become Assignment targets; literal categories become
    /// Assignment targets tagged structurally invalid. After delimiters or
    /// operators the colon is not an assignment at all.
    fn mark_assign_target(&mut self) -> bool {
        let Some(prev) = self.tokens.last_mut() else {
            return false;
        };
        match prev.category {
            TokenCategory::Identifier | TokenCategory::Keyword => {
                prev.role = TokenRole::Assignment;
                true
            }
            TokenCategory::Number | TokenCategory::DateTime | TokenCategory::String | TokenCategory::Symbol => {
                prev.role = TokenRole::Assignment;
                prev.error = Some(SyntaxError::InvalidAssignTarget);
                true
            }
            _ => false,
        }
    }

    /// Flag numeric literals dealt against the null guid: `N?0Ng` draws from
    /// a fixed seed unless `N` is negated.
    fn mark_seeds(&mut self) {
        if self.tokens.len() < 3 {
            return;
        }
        for i in 0..self.tokens.len() - 2 {
            if self.tokens[i].category != TokenCategory::Number {
                continue;
            }
            let op = &self.tokens[i + 1];
            if op.category != TokenCategory::Operator || op.image != "?" {
                continue;
            }
            let rhs = &self.tokens[i + 2];
            if rhs.category != TokenCategory::Number || rhs.image != "0Ng" {
                continue;
            }
            let negated = i > 0 && {
                let prev = &self.tokens[i - 1];
                prev.category == TokenCategory::Operator
                    && prev.image == "-"
                    && prev.span.end.offset + 1 == self.tokens[i].span.start.offset
            };
            if !negated {
                self.tokens[i].seed = true;
            }
        }
    }
}
