//! End-to-end scenarios mirroring the engine's documented test properties: plain
//! success/failure, alternative resolution, requirement cascade, cycle detection,
//! conflict detection, and ignore-set monotonicity.

use std::sync::Arc;

use fieldgraph::{
    Diagnostic, DirectiveBuilder, DirectiveIndex, Evaluator, FieldValue, IgnoreToken,
    MapFieldSource, MapRecord, Name, PredicateRegistry,
};

fn predicates() -> Arc<PredicateRegistry> {
    Arc::new(PredicateRegistry::new())
}

fn s(text: &str) -> FieldValue {
    FieldValue::Str(text.to_string())
}

#[test]
fn s1_plain_success() {
    let index = DirectiveIndex::builder()
        .field(
            "externalId",
            DirectiveBuilder::new().predicate("non_empty_string").mandatory(true).build(),
        )
        .field(
            "description",
            DirectiveBuilder::new().predicate("non_empty_string").mandatory(true).build(),
        )
        .field(
            "rent",
            DirectiveBuilder::new().predicate("boolean").mandatory(true).build(),
        )
        .field(
            "priceRent",
            DirectiveBuilder::new().predicate("positive_number").mandatory(true).build(),
        )
        .build();

    let record = MapRecord::new()
        .with("externalId", s("ext-ID"))
        .with("description", s("A valid description"))
        .with("rent", FieldValue::Bool(true))
        .with("priceRent", FieldValue::Number(1.0));

    let evaluator = Evaluator::new(&record, MapFieldSource, index, predicates());
    assert!(evaluator.evaluate().is_ok());
}

#[test]
fn s2_plain_fail_reports_first_mandatory_field_in_declaration_order() {
    let index = DirectiveIndex::builder()
        .field(
            "externalId",
            DirectiveBuilder::new().predicate("non_empty_string").mandatory(true).build(),
        )
        .field(
            "description",
            DirectiveBuilder::new().predicate("non_empty_string").mandatory(true).build(),
        )
        .build();

    let record = MapRecord::new();
    let evaluator = Evaluator::new(&record, MapFieldSource, index, predicates());
    let err = evaluator.evaluate().unwrap_err();
    match err {
        Diagnostic::InvalidField { field, .. } => assert_eq!(field.as_str(), "externalId"),
        other => panic!("expected InvalidField, got {other:?}"),
    }
}

#[test]
fn s3_alternative_success() {
    let index = DirectiveIndex::builder()
        .field(
            "primary",
            DirectiveBuilder::new()
                .predicate("non_empty_string")
                .mandatory(true)
                .alternatives([Name::new("altProp")])
                .build(),
        )
        .build();

    let record = MapRecord::new().with("altProp", s("ok"));
    let evaluator = Evaluator::new(&record, MapFieldSource, index, predicates());
    assert!(evaluator.evaluate().is_ok());
}

#[test]
fn s4_requirements_success() {
    let index = DirectiveIndex::builder()
        .field(
            "prop",
            DirectiveBuilder::new()
                .predicate("non_empty_string")
                .requires([Name::new("requiredProp")])
                .build(),
        )
        .field(
            "requiredProp",
            DirectiveBuilder::new().predicate("positive_number").build(),
        )
        .build();

    let record = MapRecord::new()
        .with("prop", s("x"))
        .with("requiredProp", FieldValue::Number(12.0));
    let evaluator = Evaluator::new(&record, MapFieldSource, index, predicates());
    assert!(evaluator.evaluate().is_ok());
}

#[test]
fn s5_requirements_fail() {
    let index = DirectiveIndex::builder()
        .field(
            "prop",
            DirectiveBuilder::new()
                .predicate("non_empty_string")
                .requires([Name::new("requiredProp")])
                .build(),
        )
        .field(
            "requiredProp",
            DirectiveBuilder::new().predicate("positive_number").build(),
        )
        .build();

    let record = MapRecord::new().with("prop", s("x"));
    let evaluator = Evaluator::new(&record, MapFieldSource, index, predicates());
    match evaluator.evaluate().unwrap_err() {
        Diagnostic::Requirements { field, requirements, cause } => {
            assert_eq!(field.as_str(), "prop");
            assert_eq!(requirements, vec![Name::new("requiredProp")]);
            assert!(cause.is_none());
        }
        other => panic!("expected Requirements, got {other:?}"),
    }
}

#[test]
fn s6_cycle_detection() {
    let index = DirectiveIndex::builder()
        .field(
            "prop",
            DirectiveBuilder::new()
                .predicate("non_empty_string")
                .requires([Name::new("prop1")])
                .build(),
        )
        .field(
            "prop1",
            DirectiveBuilder::new()
                .predicate("non_empty_string")
                .requires([Name::new("prop")])
                .build(),
        )
        .build();

    let record = MapRecord::new().with("prop", s("x")).with("prop1", s("y"));
    let evaluator = Evaluator::new(&record, MapFieldSource, index, predicates());
    match evaluator.evaluate().unwrap_err() {
        Diagnostic::CyclicRequirement { path } => {
            let names: Vec<&str> = path.iter().map(Name::as_str).collect();
            assert_eq!(names, vec!["prop", "prop1", "prop"]);
        }
        other => panic!("expected CyclicRequirement, got {other:?}"),
    }
}

#[test]
fn s7_conflict_fail_is_asymmetric_safe() {
    let index = DirectiveIndex::builder()
        .field(
            "prop",
            DirectiveBuilder::new()
                .predicate("non_empty_string")
                .conflicts([Name::new("conflictProp")])
                .build(),
        )
        // conflictProp deliberately does NOT declare `prop` as a conflict: property
        // 7 says detection must still fire from `prop`'s own declaration.
        .field(
            "conflictProp",
            DirectiveBuilder::new().predicate("non_empty_string").build(),
        )
        .build();

    let record = MapRecord::new().with("prop", s("x")).with("conflictProp", s("y"));
    let evaluator = Evaluator::new(&record, MapFieldSource, index, predicates());
    match evaluator.evaluate().unwrap_err() {
        Diagnostic::ConflictField { field, conflicts } => {
            assert_eq!(field.as_str(), "prop");
            assert_eq!(conflicts, vec![Name::new("conflictProp")]);
        }
        other => panic!("expected ConflictField, got {other:?}"),
    }
}

fn cascade_chain_index() -> Arc<DirectiveIndex> {
    DirectiveIndex::builder()
        .field(
            "prop",
            DirectiveBuilder::new()
                .predicate("non_empty_string")
                .requires([Name::new("req1")])
                .build(),
        )
        .field(
            "req1",
            DirectiveBuilder::new()
                .predicate("non_empty_string")
                .requires([Name::new("req2")])
                .build(),
        )
        .field(
            "req2",
            DirectiveBuilder::new()
                .predicate("non_empty_string")
                .requires([Name::new("req3")])
                .build(),
        )
        .field("req3", DirectiveBuilder::new().predicate("non_empty_string").build())
        .build()
}

#[test]
fn s8_cascade_chain_shifts_the_failure_one_hop_at_a_time() {
    let index = cascade_chain_index();

    let only_prop = MapRecord::new().with("prop", s("x"));
    let evaluator = Evaluator::new(&only_prop, MapFieldSource, index.clone(), predicates());
    match evaluator.evaluate().unwrap_err() {
        Diagnostic::Requirements { field, requirements, .. } => {
            assert_eq!(field.as_str(), "prop");
            assert_eq!(requirements, vec![Name::new("req1")]);
        }
        other => panic!("expected Requirements, got {other:?}"),
    }

    let plus_req1 = MapRecord::new().with("prop", s("x")).with("req1", s("x"));
    let evaluator = Evaluator::new(&plus_req1, MapFieldSource, index.clone(), predicates());
    match evaluator.evaluate().unwrap_err() {
        Diagnostic::Requirements { field, requirements, cause } => {
            assert_eq!(field.as_str(), "prop");
            assert_eq!(requirements, vec![Name::new("req1")]);
            match cause.as_deref() {
                Some(Diagnostic::Requirements { field, requirements, .. }) => {
                    assert_eq!(field.as_str(), "req1");
                    assert_eq!(requirements, &vec![Name::new("req2")]);
                }
                other => panic!("expected nested Requirements, got {other:?}"),
            }
        }
        other => panic!("expected Requirements, got {other:?}"),
    }

    let plus_req2 = MapRecord::new()
        .with("prop", s("x"))
        .with("req1", s("x"))
        .with("req2", s("x"));
    let evaluator = Evaluator::new(&plus_req2, MapFieldSource, index.clone(), predicates());
    assert!(evaluator.evaluate().is_err());

    let all_four = MapRecord::new()
        .with("prop", s("x"))
        .with("req1", s("x"))
        .with("req2", s("x"))
        .with("req3", s("x"));
    let evaluator = Evaluator::new(&all_four, MapFieldSource, index, predicates());
    assert!(evaluator.evaluate().is_ok());
}

#[test]
fn s9_cascade_discards_alternatives_on_required_children() {
    let index = DirectiveIndex::builder()
        .field(
            "parent",
            DirectiveBuilder::new()
                .predicate("non_empty_string")
                .requires([Name::new("req")])
                .build(),
        )
        .field(
            "req",
            DirectiveBuilder::new()
                .predicate("non_empty_string")
                .mandatory(true)
                .alternatives([Name::new("reqAlt")])
                .build(),
        )
        .build();

    let record = MapRecord::new().with("parent", s("x")).with("reqAlt", s("rescue-me"));
    let evaluator = Evaluator::new(&record, MapFieldSource, index, predicates());
    match evaluator.evaluate().unwrap_err() {
        Diagnostic::Requirements { field, requirements, cause } => {
            assert_eq!(field.as_str(), "parent");
            assert_eq!(requirements, vec![Name::new("req")]);
            assert!(cause.is_none(), "absence must not be rescued by req's own alternatives");
        }
        other => panic!("expected Requirements, got {other:?}"),
    }
}

#[test]
fn property_ignore_monotonicity_only_turns_failures_into_passes() {
    let index = DirectiveIndex::builder()
        .field(
            "prop",
            DirectiveBuilder::new()
                .predicate("non_empty_string")
                .conflicts([Name::new("conflictProp")])
                .build(),
        )
        .field(
            "conflictProp",
            DirectiveBuilder::new().predicate("non_empty_string").build(),
        )
        .build();

    let record = MapRecord::new().with("prop", s("x")).with("conflictProp", s("y"));

    let strict = Evaluator::new(&record, MapFieldSource, index.clone(), predicates());
    assert!(strict.evaluate().is_err());

    let relaxed = Evaluator::new(&record, MapFieldSource, index, predicates())
        .ignoring([IgnoreToken::Conflicts]);
    assert!(relaxed.evaluate().is_ok());
}

#[test]
fn property_absent_optional_field_passes_regardless_of_predicate() {
    let index = DirectiveIndex::builder()
        .field(
            "nickname",
            DirectiveBuilder::new().predicate("non_empty_string").mandatory(false).build(),
        )
        .build();

    let record = MapRecord::new();
    let evaluator = Evaluator::new(&record, MapFieldSource, index, predicates());
    assert!(evaluator.evaluate().is_ok());
}

#[test]
fn context_selectors_filter_which_directives_participate() {
    let index = DirectiveIndex::builder()
        .field(
            "billingId",
            DirectiveBuilder::new()
                .predicate("non_empty_string")
                .mandatory(true)
                .context("billing")
                .build(),
        )
        .field(
            "shippingId",
            DirectiveBuilder::new()
                .predicate("non_empty_string")
                .mandatory(true)
                .context("shipping")
                .build(),
        )
        .build();

    let record = MapRecord::new();

    let billing_only = Evaluator::new(&record, MapFieldSource, index.clone(), predicates())
        .only_contexts([Name::new("billing")]);
    match billing_only.evaluate().unwrap_err() {
        Diagnostic::InvalidField { field, .. } => assert_eq!(field.as_str(), "billingId"),
        other => panic!("expected InvalidField, got {other:?}"),
    }

    let skip_billing = Evaluator::new(&record, MapFieldSource, index, predicates())
        .ignore_contexts([Name::new("billing")]);
    match skip_billing.evaluate().unwrap_err() {
        Diagnostic::InvalidField { field, .. } => assert_eq!(field.as_str(), "shippingId"),
        other => panic!("expected InvalidField, got {other:?}"),
    }
}
