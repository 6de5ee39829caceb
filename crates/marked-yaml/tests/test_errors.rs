/*
 * test_errors.rs
 * Failures surfaced while loading documents
 */

use marked_yaml::{
    load, BaseValue, ComposeError, ConstructError, Constructor, ConstructorConfig, DuplicateKeys,
    Error, ScalarKind, Schema, ValueKind,
};

fn construct_error(result: marked_yaml::Result<marked_yaml::MarkedValue>) -> ConstructError {
    match result {
        Err(Error::Construct(err)) => err,
        other => panic!("expected a construction error, got {other:?}"),
    }
}

#[test]
fn test_pairs_item_with_two_entries() {
    let err = construct_error(load("!!pairs\n- a: 1\n- b: 2\n  c: 3\n"));
    let ConstructError::Structure(err) = err else {
        panic!("expected a structure error");
    };
    assert_eq!(err.context, "pairs");
    assert_eq!(err.expected, "a mapping of length 1");
    assert_eq!(err.found, "a mapping of length 2");
    // Reported at the offending item, not the whole sequence
    assert_eq!(err.span.start().line, 2);
}

#[test]
fn test_omap_item_that_is_not_a_mapping() {
    let err = construct_error(load("!!omap\n- a: 1\n- plain\n"));
    let ConstructError::Structure(err) = err else {
        panic!("expected a structure error");
    };
    assert_eq!(err.context, "an ordered map");
    assert_eq!(err.found, "a scalar node");
    insta::assert_snapshot!(
        err.to_string(),
        @"while constructing an ordered map: expected a mapping of length 1, but found a scalar node, at line 3, column 3"
    );
}

#[test]
fn test_unknown_tag() {
    let err = construct_error(load("value: !custom thing\n"));
    let ConstructError::UnknownTag(err) = err else {
        panic!("expected an unknown tag error");
    };
    assert_eq!(err.tag, "!custom");
    assert_eq!(err.span.start().column, 15);
}

#[test]
fn test_invalid_explicit_int() {
    let err = construct_error(load("count: !!int abc\n"));
    let ConstructError::ScalarParse(err) = err else {
        panic!("expected a scalar parse error");
    };
    assert_eq!(err.kind, ScalarKind::Int);
    assert_eq!(err.raw, "abc");
    assert_eq!(err.tag, "tag:yaml.org,2002:int");
}

#[test]
fn test_base60_int_with_leading_zero() {
    let err = construct_error(load("t: !!int 0:30\n"));
    let ConstructError::ScalarParse(err) = err else {
        panic!("expected a scalar parse error");
    };
    assert_eq!(err.raw, "0:30");
}

#[test]
fn test_custom_parser_returning_wrong_kind() {
    fn always_int(_: &str) -> Option<BaseValue> {
        Some(BaseValue::Int(7.into()))
    }

    let mut constructor = Constructor::default();
    constructor.register_scalar("!name", ValueKind::String, always_int);
    let err = construct_error(constructor.load("who: !name jane\n"));
    let ConstructError::ScalarParse(err) = err else {
        panic!("expected a scalar parse error");
    };
    assert_eq!(err.kind, ScalarKind::Custom);
    assert_eq!(err.tag, "!name");
}

#[test]
fn test_duplicate_keys_rejected() {
    let config = ConstructorConfig::default().with_duplicate_keys(DuplicateKeys::Reject);
    let err = construct_error(Constructor::new(config).load("a: 1\nb: 2\na: 3\n"));
    let ConstructError::Structure(err) = err else {
        panic!("expected a structure error");
    };
    assert_eq!(err.expected, "unique keys");
    assert_eq!(err.span.start().line, 2);
}

#[test]
fn test_duplicate_keys_rejected_but_merge_overrides_allowed() {
    let config = ConstructorConfig::default().with_duplicate_keys(DuplicateKeys::Reject);
    let doc = Constructor::new(config)
        .load("base: &b {x: 1}\nchild:\n  <<: *b\n  x: 2\n")
        .unwrap();
    assert_eq!(doc.get("child").unwrap().get("x").unwrap(), 2i64);
}

#[test]
fn test_unsupported_kind_under_core_schema() {
    fn raw_bytes(raw: &str) -> Option<BaseValue> {
        Some(BaseValue::Bytes(raw.as_bytes().to_vec()))
    }

    let config = ConstructorConfig::default().with_schema(Schema::Core);
    let mut constructor = Constructor::new(config);
    constructor.register_scalar("!raw", ValueKind::Bytes, raw_bytes);
    let err = construct_error(constructor.load("blob: !raw abc\n"));
    let ConstructError::Wrap(err) = err else {
        panic!("expected a wrap error");
    };
    assert_eq!(err.kind, ValueKind::Bytes);
    assert_eq!(err.span.start().column, 11);
}

#[test]
fn test_yaml11_tags_unknown_under_core_schema() {
    let config = ConstructorConfig::default().with_schema(Schema::Core);
    let err = construct_error(Constructor::new(config).load("at: !!timestamp 2025-04-15\n"));
    let ConstructError::UnknownTag(err) = err else {
        panic!("expected an unknown tag error");
    };
    assert_eq!(err.tag, "tag:yaml.org,2002:timestamp");
}

#[test]
fn test_recursive_merge() {
    let err = construct_error(load("a: &a\n  x: 1\n  <<: *a\n"));
    let ConstructError::Structure(err) = err else {
        panic!("expected a structure error");
    };
    assert_eq!(err.found, "a recursive merge");
}

#[test]
fn test_merge_of_scalar() {
    let err = construct_error(load("a:\n  <<: 1\n"));
    assert!(matches!(err, ConstructError::Structure(_)));
    assert_eq!(err.span().start().line, 1);
}

#[test]
fn test_syntax_error() {
    let err = load("key: [unclosed\n").unwrap_err();
    assert!(matches!(err, Error::Compose(ComposeError::Syntax { .. })));
    assert!(err.to_string().starts_with("YAML syntax error"));
}

#[test]
fn test_multiple_documents_need_load_all() {
    let err = load("a: 1\n---\nb: 2\n").unwrap_err();
    assert!(matches!(err, Error::Compose(_)));
}
