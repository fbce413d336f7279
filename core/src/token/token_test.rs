#[cfg(test)]
mod tests {
    use crate::token::{SyntaxError, Token, TokenCategory, TokenRole, Tokenizer};

    fn images(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.image.as_str()).collect()
    }

    #[test]
    fn idempotent() {
        let src = "f:{[a]b:1;a+b};v:2 /trailing\n.ns.g:{x*y}";
        assert_eq!(Tokenizer::tokenize(src), Tokenizer::tokenize(src));
    }

    #[test]
    fn span_round_trip() {
        let sources = [
            "a:1;b:`sym",
            "f:{[price;qty]price*qty}",
            "t:12:00:00\nd:2000.01.01\ndt:2000.01.01T12:00:00.000",
            "s:\"line\\none\"",
            "\\d .app\ncount:{x}",
            "m:(1 2;3 4);l:til 10",
        ];
        for src in sources {
            let chars: Vec<char> = src.chars().collect();
            for t in Tokenizer::tokenize(src) {
                let got: String = chars[t.span.start.offset..=t.span.end.offset].iter().collect();
                assert_eq!(got, t.image, "span mismatch in {src:?} at {}", t.span);
            }
        }
    }

    #[test]
    fn basic_assignment() {
        let tokens = Tokenizer::tokenize("a:1");
        assert_eq!(images(&tokens), vec!["a", ":", "1"]);
        assert_eq!(tokens[0].category, TokenCategory::Identifier);
        assert_eq!(tokens[0].role, TokenRole::Assignment);
        assert_eq!(tokens[1].category, TokenCategory::Assign);
        assert_eq!(tokens[2].category, TokenCategory::Number);
        assert_eq!(tokens[2].role, TokenRole::Reference);
    }

    #[test]
    fn global_amend_assignment() {
        let tokens = Tokenizer::tokenize("a::1");
        assert_eq!(images(&tokens), vec!["a", "::", "1"]);
        assert_eq!(tokens[0].role, TokenRole::Assignment);
    }

    #[test]
    fn compound_assignment() {
        let tokens = Tokenizer::tokenize("a+:1");
        assert_eq!(images(&tokens), vec!["a", "+:", "1"]);
        assert_eq!(tokens[0].role, TokenRole::Assignment);
        assert_eq!(tokens[1].category, TokenCategory::Assign);
    }

    #[test]
    fn colon_after_delimiter_is_not_assignment() {
        let tokens = Tokenizer::tokenize("{:x}");
        assert_eq!(images(&tokens), vec!["{", ":", "x", "}"]);
        assert_eq!(tokens[1].category, TokenCategory::Operator);
    }

    #[test]
    fn literal_assignment_targets_are_tagged() {
        let tokens = Tokenizer::tokenize(r#"100:1;`a :1;"":1"#);
        let tagged: Vec<&Token> = tokens
            .iter()
            .filter(|t| t.error == Some(SyntaxError::InvalidAssignTarget))
            .collect();
        assert_eq!(tagged.len(), 3);
        assert_eq!(tagged[0].image, "100");
        assert_eq!(tagged[1].image, "`a");
        assert_eq!(tagged[2].image, "\"\"");
        assert!(tagged.iter().all(|t| t.role == TokenRole::Assignment));
    }

    #[test]
    fn time_literal_swallows_colons() {
        let tokens = Tokenizer::tokenize("t:12:00:00.123");
        assert_eq!(images(&tokens), vec!["t", ":", "12:00:00.123"]);
        assert_eq!(tokens[2].category, TokenCategory::Number);
    }

    #[test]
    fn date_and_timestamp_are_plain_numbers() {
        let tokens = Tokenizer::tokenize("2000.01.01 2000.01.01D12:00:00");
        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|t| t.category == TokenCategory::Number));
    }

    #[test]
    fn deprecated_datetime_is_distinct() {
        let tokens = Tokenizer::tokenize("2000.01.01T12:00:00.000");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].category, TokenCategory::DateTime);
        assert_eq!(tokens[0].image, "2000.01.01T12:00:00.000");
    }

    #[test]
    fn typed_nulls_and_suffixes() {
        let tokens = Tokenizer::tokenize("0N 0Ng 1b 2.5f 1e-3");
        assert_eq!(images(&tokens), vec!["0N", "0Ng", "1b", "2.5f", "1e-3"]);
        assert!(tokens.iter().all(|t| t.category == TokenCategory::Number));
    }

    #[test]
    fn seed_flag_on_fixed_guid_deal() {
        let tokens = Tokenizer::tokenize("1?0Ng");
        assert_eq!(images(&tokens), vec!["1", "?", "0Ng"]);
        assert!(tokens[0].seed);

        let tokens = Tokenizer::tokenize("-1?0Ng");
        assert!(tokens.iter().all(|t| !t.seed));
    }

    #[test]
    fn string_escapes() {
        let ok = Tokenizer::tokenize(r#""a\n\377b""#);
        assert_eq!(ok.len(), 1);
        assert_eq!(ok[0].error, None);

        let bad = Tokenizer::tokenize(r#""\378""#);
        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].error, Some(SyntaxError::InvalidEscape));

        let open = Tokenizer::tokenize("\"abc");
        assert_eq!(open[0].error, Some(SyntaxError::UnterminatedString));
    }

    #[test]
    fn symbols() {
        let tokens = Tokenizer::tokenize("`a`b `sym.q `:localhost:5000");
        assert_eq!(images(&tokens), vec!["`a", "`b", "`sym.q", "`:localhost:5000"]);
        assert!(tokens.iter().all(|t| t.category == TokenCategory::Symbol));
    }

    #[test]
    fn comments_are_trivia() {
        let tokens = Tokenizer::tokenize("a:1 /rest of line\nb:2");
        assert_eq!(images(&tokens), vec!["a", ":", "1", "b", ":", "2"]);
        assert_eq!(tokens[3].span.start.line, 2);

        let tokens = Tokenizer::tokenize("/\nanything goes\n\\\nc:3");
        assert_eq!(images(&tokens), vec!["c", ":", "3"]);
        assert_eq!(tokens[0].span.start.line, 4);
    }

    #[test]
    fn namespace_tracking() {
        let tokens = Tokenizer::tokenize("\\d .app\nx:1");
        assert_eq!(tokens[0].category, TokenCategory::Command);
        assert_eq!(tokens[1].image, "x");
        assert_eq!(tokens[1].namespace, ".app");

        let tokens = Tokenizer::tokenize(".lib.f:1");
        assert_eq!(tokens[0].image, ".lib.f");
        assert_eq!(tokens[0].namespace, ".lib");
        assert_eq!(tokens[0].short_name(), "f");
    }

    #[test]
    fn lambda_markers() {
        let tokens = Tokenizer::tokenize("{x+y}");
        assert_eq!(tokens[0].category, TokenCategory::LambdaOpen);
        assert!(tokens[0].lambda.unwrap().nullary);

        let tokens = Tokenizer::tokenize("{[a;b]a+b}");
        assert!(!tokens[0].lambda.unwrap().nullary);
        let params: Vec<&Token> = tokens.iter().filter(|t| t.param_decl).collect();
        assert_eq!(params.len(), 2);
        assert!(params.iter().all(|t| t.role == TokenRole::Assignment));
    }

    #[test]
    fn scope_nesting() {
        let tokens = Tokenizer::tokenize("{a:{b:1}}");
        let outer = 0;
        let a = tokens.iter().position(|t| t.image == "a").unwrap();
        let inner = tokens.iter().position(|t| t.category == TokenCategory::LambdaOpen && t.span.start.column > 1).unwrap();
        let b = tokens.iter().position(|t| t.image == "b").unwrap();
        assert_eq!(tokens[a].scope, Some(outer));
        assert_eq!(tokens[inner].scope, Some(outer));
        assert_eq!(tokens[b].scope, Some(inner));
        assert_eq!(tokens[outer].scope, None);
    }

    #[test]
    fn adverbs() {
        let tokens = Tokenizer::tokenize("x+/:y");
        assert_eq!(images(&tokens), vec!["x", "+", "/:", "y"]);
        assert_eq!(tokens[2].category, TokenCategory::Adverb);

        let tokens = Tokenizer::tokenize("x,':y");
        assert_eq!(images(&tokens), vec!["x", ",", "':", "y"]);
        assert_eq!(tokens[2].category, TokenCategory::Adverb);
    }

    #[test]
    fn reserved_words_are_keywords() {
        let tokens = Tokenizer::tokenize("count til each");
        assert!(tokens.iter().all(|t| t.category == TokenCategory::Keyword));
    }

    #[test]
    fn malformed_input_never_panics() {
        for src in ["", "}", ")", "]", "{", "(", "\"", "`", "a:", "::", "\u{00e9}\u{4e2d}"] {
            let _ = Tokenizer::tokenize(src);
        }
    }
}
