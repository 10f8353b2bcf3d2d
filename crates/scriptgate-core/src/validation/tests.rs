//! Tests for structural validation.

use super::*;
use crate::document::CanonicalDocument;
use crate::policy::PolicyProfile;
use crate::tree::{Node, NodeKind};
use serde_json::json;

fn compile(schema: Value) -> CompiledPolicy {
    StructuralValidator::global().compile(&schema).unwrap()
}

#[test]
fn test_conforming_document_has_no_violations() {
    let policy = compile(json!({
        "type": "object",
        "properties": { "code": true, "Pass": true },
        "additionalProperties": false,
    }));
    let document = json!({ "code": {}, "Pass": [{}] });

    assert!(policy.is_valid(&document));
    assert!(policy.validate(&document).is_empty());
}

#[test]
fn test_one_violation_per_unknown_root_key() {
    let policy = compile(json!({
        "type": "object",
        "properties": { "code": true },
        "additionalProperties": false,
    }));
    let document = json!({ "code": {}, "Lambda": [{}], "Yield": [{}, {}] });

    let violations = policy.validate(&document);

    assert_eq!(violations.len(), 2);
    assert!(
        violations
            .iter()
            .all(|v| v.rule == ViolationRule::UnknownKind)
    );
    let kinds: Vec<_> = violations.iter().filter_map(|v| v.kind).collect();
    assert!(kinds.contains(&NodeKind::Lambda));
    assert!(kinds.contains(&NodeKind::Yield));
}

#[test]
fn test_max_items_reports_forbidden_kind() {
    let policy = compile(json!({
        "type": "object",
        "properties": { "Import": { "type": "array", "maxItems": 0 } },
    }));

    let violations = policy.validate(&json!({ "Import": [{}] }));

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule, ViolationRule::ForbiddenKind);
    assert_eq!(violations[0].kind, Some(NodeKind::Import));
    assert_eq!(violations[0].path, "/Import");
}

#[test]
fn test_false_schema_reports_forbidden_kind() {
    let policy = compile(json!({
        "properties": {
            "Call": {
                "type": "array",
                "items": { "properties": { "func": { "properties": { "Lambda": false } } } },
            },
        },
    }));

    let violations = policy.validate(&json!({ "Call": [{ "func": { "Lambda": {} } }] }));

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule, ViolationRule::ForbiddenKind);
    assert_eq!(violations[0].kind, Some(NodeKind::Call));
    assert_eq!(violations[0].occurrence(), Some(0));
    assert!(violations[0].message.contains("Lambda"));
}

#[test]
fn test_literal_rules() {
    let policy = compile(json!({
        "properties": {
            "Name": { "items": { "properties": { "id": { "enum": ["len"] } } } },
            "Attribute": { "items": { "properties": { "attr": { "not": { "enum": ["system"] } } } } },
        },
    }));
    let document = json!({
        "Name": [{ "id": "len" }, { "id": "eval" }],
        "Attribute": [{ "attr": "system" }],
    });

    let violations = policy.validate(&document);

    assert_eq!(violations.len(), 2);
    let disallowed = violations
        .iter()
        .find(|v| v.rule == ViolationRule::DisallowedValue)
        .unwrap();
    assert_eq!(disallowed.path, "/Name/1/id");
    assert_eq!(disallowed.occurrence(), Some(1));
    let forbidden = violations
        .iter()
        .find(|v| v.rule == ViolationRule::ForbiddenValue)
        .unwrap();
    assert_eq!(forbidden.kind, Some(NodeKind::Attribute));
}

#[test]
fn test_lookahead_pattern() {
    let policy = compile(json!({
        "properties": {
            "Attribute": { "items": { "properties": { "attr": { "pattern": "^(?!_)" } } } },
        },
    }));
    let document = json!({ "Attribute": [{ "attr": "upper" }, { "attr": "__class__" }] });

    let violations = policy.validate(&document);

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule, ViolationRule::PatternMismatch);
    assert_eq!(violations[0].path, "/Attribute/1/attr");
}

#[test]
fn test_closed_shape_reports_unknown_field() {
    let policy = compile(json!({
        "properties": {
            "Pass": { "items": { "type": "object", "additionalProperties": false } },
        },
    }));

    let violations = policy.validate(&json!({ "Pass": [{ "extra": 1 }] }));

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule, ViolationRule::UnknownField);
    assert_eq!(violations[0].path, "/Pass/0/extra");
}

#[test]
fn test_closed_root_without_properties_reports_unknown_kind() {
    let policy = compile(json!({ "type": "object", "additionalProperties": false }));

    let violations = policy.validate(&json!({ "Lambda": [{}] }));

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule, ViolationRule::UnknownKind);
    assert_eq!(violations[0].kind, Some(NodeKind::Lambda));
    assert_eq!(violations[0].path, "/Lambda");
}

#[test]
fn test_type_mismatch() {
    let policy = compile(json!({
        "properties": {
            "Name": { "items": { "properties": { "id": { "type": "string" } } } },
        },
    }));

    let violations = policy.validate(&json!({ "Name": [{ "id": 3 }] }));

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule, ViolationRule::TypeMismatch);
}

#[test]
fn test_invalid_schema_fails_to_compile() {
    let result = StructuralValidator::global().compile(&json!({ "type": "no-such-type" }));
    assert!(result.is_err());
}

#[test]
fn test_settings_deserialize() {
    let settings: ValidatorSettings = toml::from_str("draft = \"draft6\"").unwrap();
    assert_eq!(settings.draft, SchemaDraft::Draft6);

    let settings: ValidatorSettings = toml::from_str("").unwrap();
    assert_eq!(settings.draft, SchemaDraft::Draft7);
}

#[test]
fn test_builtin_profiles_compile_under_every_draft() {
    let tree = Node::new(NodeKind::Module)
        .with_field("body", vec![Node::new(NodeKind::Pass)])
        .with_field("type_ignores", Vec::<Node>::new());
    let document = CanonicalDocument::build(&tree).unwrap();
    let profiles = [
        PolicyProfile::empty(),
        PolicyProfile::baseline(),
        PolicyProfile::restricted(),
        PolicyProfile::restricted_denylist(),
    ];

    for &draft in SchemaDraft::ALL {
        let validator = StructuralValidator::new(ValidatorSettings { draft });
        for profile in &profiles {
            let schema = profile.adjusted_schema(&document).unwrap();
            let policy = validator
                .compile(&schema.to_json_schema())
                .unwrap_or_else(|err| panic!("{} under {:?}: {}", profile.name(), draft, err));
            let violations = policy.validate(document.as_value());
            if profile.name() == "empty" {
                assert!(!violations.is_empty(), "{:?}", draft);
                assert!(violations.iter().all(|v| v.rule == ViolationRule::UnknownKind));
            } else {
                assert!(violations.is_empty(), "{} under {:?}: {:?}", profile.name(), draft, violations);
            }
        }
    }
}

#[test]
fn test_install_after_first_use_is_rejected() {
    let _ = StructuralValidator::global();
    let settings = ValidatorSettings {
        draft: SchemaDraft::Draft6,
    };

    assert_eq!(StructuralValidator::install(settings), Err(settings));
}
