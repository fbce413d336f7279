use crate::lint::{self, Severity};
use crate::scope::analyze;

fn codes(src: &str) -> Vec<&'static str> {
    lint::run(&analyze(src)).iter().map(|d| d.code).collect()
}

#[test]
fn deprecated_datetime() {
    assert_eq!(codes("2000.01.01T12:00:00.000"), vec!["DEPRECATED_DATETIME"]);
    assert_eq!(codes("2000.01.01D12:00:00"), Vec::<&str>::new());
}

#[test]
fn invalid_escape() {
    assert_eq!(codes(r#""\378""#), vec!["INVALID_ESCAPE"]);
    assert_eq!(codes(r#""\377""#), Vec::<&str>::new());
}

#[test]
fn assign_reserved_word() {
    assert_eq!(codes("if:1"), vec!["ASSIGN_RESERVED_WORD"]);
    assert_eq!(codes("til:99"), vec!["ASSIGN_RESERVED_WORD"]);
}

#[test]
fn invalid_assign_targets() {
    assert_eq!(
        codes(r#"100:1;`a :1;"":1"#),
        vec!["INVALID_ASSIGN", "INVALID_ASSIGN", "INVALID_ASSIGN"]
    );
}

#[test]
fn fixed_seed() {
    assert_eq!(codes("1?0Ng"), vec!["FIXED_SEED"]);
    assert_eq!(codes("-1?0Ng"), Vec::<&str>::new());
}

#[test]
fn unused_param() {
    assert_eq!(codes("{[a]a:1}"), vec!["UNUSED_PARAM"]);
    assert_eq!(codes("{[a]a}"), Vec::<&str>::new());
    assert_eq!(codes("{[a;b]a}"), vec!["UNUSED_PARAM"]);
}

#[test]
fn unused_var() {
    assert_eq!(codes("a:1"), vec!["UNUSED_VAR"]);
    assert_eq!(codes("a:1;a"), Vec::<&str>::new());
    assert_eq!(codes("{v:1;1}"), vec!["UNUSED_VAR"]);
    assert_eq!(codes("{v:1;v}"), Vec::<&str>::new());
}

#[test]
fn declared_after_use() {
    assert_eq!(
        codes("a;a:1;(b:1;b);[b:1;b]"),
        vec!["DECLARED_AFTER_USE", "DECLARED_AFTER_USE", "DECLARED_AFTER_USE"]
    );
}

#[test]
fn declared_after_use_respects_scope() {
    // the read of the global `a` does not implicate the local `a`
    assert_eq!(codes("a;{a:1;a}"), Vec::<&str>::new());
}

#[test]
fn degenerate_input() {
    assert_eq!(codes(""), Vec::<&str>::new());
    assert_eq!(codes(";;;"), Vec::<&str>::new());
    assert_eq!(codes("}{"), Vec::<&str>::new());
}

#[test]
fn severities() {
    let tokens = analyze("if:1;2000.01.01T12:00:00.000");
    let diags = lint::run(&tokens);
    let sev = |code: &str| diags.iter().find(|d| d.code == code).unwrap().severity;
    assert_eq!(sev("ASSIGN_RESERVED_WORD"), Severity::Error);
    assert_eq!(sev("DEPRECATED_DATETIME"), Severity::Warning);
}

#[test]
fn diagnostic_spans_point_at_the_token() {
    let diags = lint::run(&analyze("a:1"));
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].span.start.line, 1);
    assert_eq!(diags[0].span.start.column, 1);
    assert_eq!(diags[0].span.end.column, 1);
}
