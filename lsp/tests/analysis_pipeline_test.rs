use qls_core::lint;
use qls_core::query::{self, DocRange, OutlineKind};
use qls_core::scope;
use tower_lsp::lsp_types::{Position, Range};

fn protocol_range(r: &DocRange) -> Range {
    Range {
        start: Position::new(r.start.line, r.start.character),
        end: Position::new(r.end.line, r.end.character),
    }
}

#[test]
fn diagnostics_arrive_in_protocol_coordinates() {
    let tokens = scope::analyze("2000.01.01T12:00:00.000");
    let diags = lint::run(&tokens);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "DEPRECATED_DATETIME");

    let range = protocol_range(&query::doc_range(&diags[0].span));
    assert_eq!(range, Range::new(Position::new(0, 0), Position::new(0, 23)));
}

#[test]
fn unused_var_covers_exactly_the_identifier() {
    let tokens = scope::analyze("a:1");
    let diags = lint::run(&tokens);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "UNUSED_VAR");

    let range = protocol_range(&query::doc_range(&diags[0].span));
    assert_eq!(range, Range::new(Position::new(0, 0), Position::new(0, 1)));
}

#[test]
fn symbol_hierarchy_over_a_script() {
    let src = "\\d .trade\nvwap:{[px;qty]w:px*qty;(sum w)%sum qty}\nlimit:100";
    let tokens = scope::analyze(src);
    let nodes = query::outline(&tokens);

    let labels: Vec<(&str, OutlineKind)> = nodes.iter().map(|n| (n.label.as_str(), n.kind)).collect();
    assert_eq!(labels, vec![("vwap", OutlineKind::Function), ("limit", OutlineKind::Variable)]);

    let kids: Vec<(&str, OutlineKind)> = nodes[0]
        .children
        .iter()
        .map(|c| (c.label.as_str(), c.kind))
        .collect();
    assert_eq!(
        kids,
        vec![
            ("px", OutlineKind::Argument),
            ("qty", OutlineKind::Argument),
            ("w", OutlineKind::Local),
        ]
    );

    // Symbols sit on the second line in protocol coordinates.
    let range = protocol_range(&nodes[0].range);
    assert_eq!(range.start, Position::new(1, 0));
}

#[test]
fn rename_stays_inside_the_defining_lambda() {
    let src = "f:{n:1;n};g:{n:2;n}";
    let tokens = scope::analyze(src);

    let cursor = query::token_at_position(&tokens, 0, 3).unwrap();
    let edits = query::rename(&tokens, cursor, "m");
    assert_eq!(edits.len(), 2);
    for edit in &edits {
        assert_eq!(edit.new_text, "m");
        let range = protocol_range(&edit.range);
        assert!(range.start.character < 9, "edit leaked into g: {range:?}");
    }
}

#[test]
fn definition_from_a_read_site() {
    let tokens = scope::analyze("f:{a:1;a}");
    let cursor = query::token_at_position(&tokens, 0, 7).unwrap();
    let defs = query::definition(&tokens, cursor);
    assert_eq!(defs.len(), 1);
    assert_eq!(
        protocol_range(&defs[0]),
        Range::new(Position::new(0, 3), Position::new(0, 4))
    );
}
