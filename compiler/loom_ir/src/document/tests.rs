use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_line_lookup() {
    let doc = TextDocument::new("ab\ncd\n\nef");
    assert_eq!(doc.line_count(), 4);
    assert_eq!(doc.line_number(0), 0);
    assert_eq!(doc.line_number(2), 0);
    assert_eq!(doc.line_number(3), 1);
    assert_eq!(doc.line_number(6), 2);
    assert_eq!(doc.line_number(9), 3);
    assert_eq!(doc.line_start_offset(1), 3);
    assert_eq!(doc.line_end_offset(1), 5);
    assert_eq!(doc.line_end_offset(3), 9);
}

#[test]
fn test_apply_edits_shifts_later_edits() {
    let edits = vec![
        TextEdit::new(TextRange::new(1, 2), "   "),
        TextEdit::new(TextRange::new(4, 6), ""),
        TextEdit::new(TextRange::point(7), "\n"),
    ];
    let result = apply_edits("a b\n\n\nc", &edits).unwrap();
    assert_eq!(result, "a   b\nc\n");
}

#[test]
fn test_document_apply_edits_updates_lines() {
    let mut doc = TextDocument::new("a b");
    doc.apply_edits(&[TextEdit::new(TextRange::new(1, 2), "\n")])
        .unwrap();
    assert_eq!(doc.text(), "a\nb");
    assert_eq!(doc.line_count(), 2);
    assert_eq!(doc.line_start_offset(1), 2);
}

#[test]
fn test_apply_edits_rejects_overlap() {
    let edits = vec![
        TextEdit::new(TextRange::new(0, 3), "x"),
        TextEdit::new(TextRange::new(2, 4), "y"),
    ];
    assert_eq!(
        apply_edits("abcdef", &edits),
        Err(EditError::Unordered {
            prev: TextRange::new(0, 3),
            next: TextRange::new(2, 4),
        })
    );
}

#[test]
fn test_apply_edits_rejects_out_of_bounds() {
    let edits = vec![TextEdit::new(TextRange::new(2, 9), "")];
    assert!(matches!(
        apply_edits("abc", &edits),
        Err(EditError::OutOfBounds { len: 3, .. })
    ));
}

#[test]
fn test_apply_edits_rejects_split_char() {
    let edits = vec![TextEdit::new(TextRange::new(1, 2), "")];
    assert!(matches!(
        apply_edits("é", &edits),
        Err(EditError::NotCharBoundary { .. })
    ));
}

#[test]
fn test_failed_apply_leaves_document_untouched() {
    let mut doc = TextDocument::new("abc");
    let bad = [TextEdit::new(TextRange::new(0, 10), "")];
    assert!(doc.apply_edits(&bad).is_err());
    assert_eq!(doc.text(), "abc");
}

#[test]
fn test_edit_delta() {
    assert_eq!(TextEdit::new(TextRange::new(0, 4), "x").delta(), -3);
    assert_eq!(TextEdit::new(TextRange::point(0), "xy").delta(), 2);
}
