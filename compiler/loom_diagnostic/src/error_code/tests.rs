use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::F0001.to_string(), "F0001");
    assert_eq!(ErrorCode::F0002.as_str(), "F0002");
}

#[test]
fn test_all_variants_classified() {
    for code in ErrorCode::ALL {
        assert!(code.is_alignment_error(), "{code} is unclassified");
        assert!(!code.description().is_empty());
    }
}

#[test]
fn test_all_codes_unique() {
    let mut seen: Vec<&str> = ErrorCode::ALL.iter().map(ErrorCode::as_str).collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), ErrorCode::ALL.len());
}
