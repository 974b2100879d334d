//! Integration tests for the assertion engine.
//!
//! These tests drive the public API end to end against a small type model
//! built the way a consumer would build one:
//! - a hand-written [`TypeHandle`] implementation with a coercion path
//! - [`SimpleType`] refinements chained by parent
//!
//! # Test Coverage
//!
//! - Verbs: every label the state machine can produce
//! - Diagnostics: traces on pass and fail, wide-value placeholders
//! - Groups: nesting, defects, aborts on faulting types
//! - Sorting: seeded trials, reproducible mismatches
//! - Ancestry: subtype checks and cyclic chains
//! - Configuration: loading engine tunables from a TOML file

use std::borrow::Cow;
use std::io::Write;
use std::rc::Rc;

use tempfile::NamedTempFile;
use tyassert::{
    AssertionGroup, Engine, EngineConfig, EngineError, GroupDefect, SimpleType, Stage,
    TypeFault, TypeHandle, Value,
};

// ============================================================================
// Type model
// ============================================================================

fn str_type() -> Rc<SimpleType> {
    Rc::new(SimpleType::new("Str", |v| v.as_str().is_some()).with_definition("<builtin>"))
}

fn int_type() -> Rc<SimpleType> {
    Rc::new(SimpleType::new("Int", |v| v.as_int().is_some()).with_definition("<builtin>"))
}

fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

fn fqdn() -> SimpleType {
    SimpleType::new("FQDN", |v| {
        v.as_str().is_some_and(|s| {
            !s.starts_with('.')
                && s.contains('.')
                && s.split('.')
                    .all(|label| !label.is_empty() && label.chars().all(is_label_char))
        })
    })
    .with_definition("dot-separated labels")
    .with_parent(str_type())
}

/// A port number, coercible from its decimal string form.
struct Port {
    int: Rc<SimpleType>,
    str: Rc<SimpleType>,
}

impl Port {
    fn new() -> Self {
        Self {
            int: int_type(),
            str: str_type(),
        }
    }
}

impl TypeHandle for Port {
    fn display_name(&self) -> &str {
        "Port"
    }

    fn check(&self, value: &Value) -> Result<bool, TypeFault> {
        Ok(self.int.check(value)? && value.as_int().is_some_and(|p| (1..=65535).contains(&p)))
    }

    fn has_coercion(&self) -> bool {
        true
    }

    fn coerce(&self, value: &Value) -> Result<Value, TypeFault> {
        Ok(value
            .as_str()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map_or_else(|| value.clone(), Value::Int))
    }

    fn parent(&self) -> Option<&dyn TypeHandle> {
        Some(self.int.as_ref())
    }

    fn coercion_candidates(&self) -> Vec<&dyn TypeHandle> {
        vec![self.str.as_ref()]
    }

    fn source_definition(&self) -> Cow<'_, str> {
        Cow::Borrowed("1..=65535")
    }
}

/// A type whose parent chain loops back to itself.
struct Ouroboros;

impl TypeHandle for Ouroboros {
    fn display_name(&self) -> &str {
        "Ouroboros"
    }

    fn check(&self, _value: &Value) -> Result<bool, TypeFault> {
        Ok(true)
    }

    fn parent(&self) -> Option<&dyn TypeHandle> {
        Some(self)
    }
}

fn labels(group: &AssertionGroup) -> Vec<String> {
    group.outcomes().map(|o| o.label().to_owned()).collect()
}

// ============================================================================
// Verbs
// ============================================================================

#[test]
fn test_fqdn_examples() {
    let engine = Engine::with_defaults();
    let mut root = AssertionGroup::new("FQDN");
    let fqdn = fqdn();

    assert!(
        engine
            .should_pass_initially(
                &mut root,
                &fqdn,
                &[Value::str("example.com"), Value::str("a.b-c.org")]
            )
            .unwrap()
    );
    assert!(
        engine
            .should_fail(
                &mut root,
                &fqdn,
                &[Value::str(".com"), Value::str("a..b"), Value::Undef]
            )
            .unwrap()
    );

    assert_eq!(
        labels(root.find_group("FQDN: should_pass_initially").unwrap()),
        ["\"example.com\" should pass", "\"a.b-c.org\" should pass"]
    );
    assert_eq!(
        labels(root.find_group("FQDN: should_fail").unwrap()),
        [
            "\".com\" should fail (no coercion)",
            "\"a..b\" should fail (no coercion)",
            "undef should fail (no coercion)",
        ]
    );
    assert!(root.passed());
}

#[test]
fn test_constraint_map_lists_every_ancestor() {
    let engine = Engine::with_defaults();
    let mut root = AssertionGroup::new("root");
    engine
        .should_fail(&mut root, &fqdn(), &[Value::str(".com")])
        .unwrap();
    let outcome = root
        .find_group("FQDN: should_fail")
        .and_then(|g| g.outcomes().next())
        .unwrap();
    assert_eq!(
        outcome.diagnostics().lines(),
        [
            "FQDN constraint map:",
            "    FQDN->check(\".com\") ==> FAILED",
            "        is defined as: dot-separated labels",
            "    Str->check(\".com\") ==> PASSED",
            "        is defined as: <builtin>",
        ]
    );
}

#[test]
fn test_port_coercion_paths() {
    let engine = Engine::with_defaults();
    let port = Port::new();
    let mut root = AssertionGroup::new("Port");

    assert!(
        engine
            .should_pass(&mut root, &port, &[Value::Int(80), Value::str("8080")])
            .unwrap()
    );
    assert!(
        engine
            .should_fail(
                &mut root,
                &port,
                &[Value::str("http"), Value::str("70000"), Value::Int(0)]
            )
            .unwrap()
    );
    assert!(
        engine
            .should_coerce_into(
                &mut root,
                &port,
                &[Value::str(" 443 "), Value::Int(443)]
            )
            .unwrap()
    );

    assert_eq!(
        labels(root.find_group("Port: should_pass").unwrap()),
        [
            "80 should pass (initial check)",
            "\"8080\" should pass (coerced into 8080)",
        ]
    );
    assert_eq!(
        labels(root.find_group("Port: should_fail").unwrap()),
        [
            "\"http\" should fail (failed coercion)",
            "\"70000\" should fail (coerced into 70000)",
            "0 should fail (failed coercion)",
        ]
    );
    let stages: Vec<Stage> = root
        .find_group("Port: should_fail")
        .unwrap()
        .outcomes()
        .map(|o| o.stage())
        .collect();
    assert_eq!(
        stages,
        [Stage::FailedCoercion, Stage::Coerced, Stage::FailedCoercion]
    );
    assert!(root.passed());
}

#[test]
fn test_coercion_trace_names_candidate() {
    let engine = Engine::with_defaults();
    let mut root = AssertionGroup::new("root");
    engine
        .should_coerce_into(
            &mut root,
            &Port::new(),
            &[Value::str("22"), Value::Int(22)],
        )
        .unwrap();
    let outcome = root
        .find_group("Port: should_coerce_into")
        .and_then(|g| g.outcomes().next())
        .unwrap();
    assert_eq!(outcome.label(), "\"22\" (coerced)");
    let lines = outcome.diagnostics().lines();
    let start = lines
        .iter()
        .position(|l| l == "Port coercion map:")
        .unwrap();
    assert_eq!(
        &lines[start + 1..],
        [
            "    Port->check(\"22\") ==> FAILED",
            "    Str->check(\"22\") ==> PASSED (coerced into 22)",
        ]
    );
}

#[test]
fn test_diagnostics_present_on_pass() {
    let engine = Engine::with_defaults();
    let mut root = AssertionGroup::new("root");
    engine
        .should_pass_initially(&mut root, &fqdn(), &[Value::str("example.com")])
        .unwrap();
    let outcome = root.groups().next().and_then(|g| g.outcomes().next()).unwrap();
    assert!(outcome.passed());
    assert!(!outcome.diagnostics().is_empty());
}

#[test]
fn test_wide_value_uses_placeholder() {
    let engine = Engine::with_defaults();
    let mut root = AssertionGroup::new("root");
    let wide = "a".repeat(40);
    engine
        .should_fail_initially(&mut root, &fqdn(), &[Value::str(wide.clone())])
        .unwrap();
    let outcome = root.groups().next().and_then(|g| g.outcomes().next()).unwrap();
    let lines = outcome.diagnostics().lines();
    assert_eq!(lines[1], format!("    Full value: \"{wide}\""));
    assert_eq!(lines[2], "    FQDN->check(...) ==> FAILED");
    assert_eq!(
        lines.iter().filter(|l| l.contains("Full value")).count(),
        1
    );
}

// ============================================================================
// Identity and defects
// ============================================================================

#[test]
fn test_no_op_coercion_is_not_a_pass() {
    // Coercion hands back the same list instance.
    let ty = SimpleType::new("NonEmpty", |v| v.as_str().is_some_and(|s| !s.is_empty()))
        .with_coercion(|v| Ok(v.clone()));
    let engine = Engine::with_defaults();
    let mut root = AssertionGroup::new("root");
    let list = Value::list([Value::Int(1)]);
    assert!(!engine.should_pass(&mut root, &ty, &[list]).unwrap());
    // Undef coerced to "" is the same value under the identity policy.
    let undef_to_empty = SimpleType::new("Strict", |v| v.as_str().is_some_and(|s| !s.is_empty()))
        .with_coercion(|_| Ok(Value::str("")));
    assert!(engine.should_fail(&mut root, &undef_to_empty, &[Value::Undef]).unwrap());
    assert_eq!(
        labels(root.find_group("Strict: should_fail").unwrap()),
        ["undef should fail (failed coercion)"]
    );
}

#[test]
fn test_odd_pair_list() {
    let engine = Engine::with_defaults();
    let mut root = AssertionGroup::new("root");
    let passed = engine
        .should_coerce_into(
            &mut root,
            &Port::new(),
            &[Value::str("1"), Value::Int(1), Value::str("2")],
        )
        .unwrap();
    assert!(!passed);
    let group = root.find_group("Port: should_coerce_into").unwrap();
    assert_eq!(group.outcomes().count(), 0);
    assert_eq!(group.defects(), [GroupDefect::OddPairList { len: 3 }]);
    assert_eq!(root.summary().defects, 1);
}

#[test]
fn test_faulting_type_aborts_with_partial_outcomes() {
    let flaky = SimpleType::fallible("Flaky", |v| {
        if v.as_str() == Some("boom") {
            Err(TypeFault::failed("predicate raised"))
        } else {
            Ok(v.as_str().is_some())
        }
    });
    let engine = Engine::with_defaults();
    let mut root = AssertionGroup::new("root");
    let result = root.run_group("suite", |suite| {
        engine.should_pass_initially(suite, &flaky, &[Value::str("ok"), Value::str("boom")])?;
        engine.should_pass_initially(suite, &flaky, &[Value::str("unreached")])?;
        Ok(())
    });

    let err = result.unwrap_err();
    assert!(err.is_collaborator_fault());
    assert_eq!(err.to_string(), "Flaky->check faulted: predicate raised");

    let suite = root.find_group("suite").unwrap();
    assert_eq!(suite.groups().count(), 1);
    let verb = suite.find_group("Flaky: should_pass_initially").unwrap();
    assert_eq!(labels(verb), ["\"ok\" should pass"]);
    assert!(verb.aborted().is_some());
    assert_eq!(root.summary().aborted, 2);
}

// ============================================================================
// Sorting and ancestry
// ============================================================================

#[test]
fn test_sort_is_reproducible_from_seed() {
    let by_len = SimpleType::new("ByLen", |v| v.as_str().is_some()).with_sort_by(|a, b| {
        a.as_str().map(str::len).cmp(&b.as_str().map(str::len))
    });
    let orderings = vec![vec![
        Value::str("a"),
        Value::str("bb"),
        Value::str("cc"),
        Value::str("ddd"),
    ]];

    let run = || {
        let engine = Engine::new(EngineConfig::default().with_seed(42)).unwrap();
        let mut root = AssertionGroup::new("root");
        let passed = engine.should_sort(&mut root, &by_len, &orderings).unwrap();
        (passed, root)
    };
    let (first_passed, first) = run();
    let (second_passed, second) = run();
    assert!(!first_passed);
    assert_eq!(first_passed, second_passed);
    assert_eq!(first, second);

    let outcome = first
        .find_group("ByLen: should_sort")
        .and_then(|g| g.outcomes().next())
        .unwrap();
    assert_eq!(outcome.label(), "[\"a\", \"bb\", \"cc\", \"ddd\"] should sort");
    assert_eq!(outcome.diagnostics().lines()[0], "ByLen sort trials (seed 42):");
}

#[test]
fn test_subtypes() {
    let str_t: Rc<dyn TypeHandle> = str_type();
    let fqdn = fqdn();
    let port = Port::new();
    let engine = Engine::with_defaults();
    let mut root = AssertionGroup::new("root");

    assert!(
        engine
            .should_be_subtype(&mut root, str_t.as_ref(), &[&fqdn])
            .unwrap()
    );
    assert!(
        !engine
            .should_be_subtype(&mut root, str_t.as_ref(), &[&port])
            .unwrap()
    );
    let int_type = int_type();
    assert!(
        engine
            .should_be_subtype(&mut root, int_type.as_ref(), &[&port])
            .unwrap()
    );
}

#[test]
fn test_cyclic_ancestry_is_reported() {
    let engine = Engine::new(EngineConfig::default().with_max_ancestor_depth(8)).unwrap();
    let mut root = AssertionGroup::new("root");

    let err = engine
        .should_pass_initially(&mut root, &Ouroboros, &[Value::Int(1)])
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::AncestorChainTooLong { limit: 8, .. }
    ));

    let err = engine
        .should_be_subtype(&mut root, &Ouroboros, &[&Ouroboros])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "ancestor chain of Ouroboros exceeds 8 levels"
    );
}

// ============================================================================
// Configuration and reporting
// ============================================================================

#[test]
fn test_engine_from_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "sort_trials = 5\nplaceholder_width = 10\nseed = 3").unwrap();

    let config = EngineConfig::from_file(file.path()).unwrap();
    let engine = Engine::new(config).unwrap();
    assert_eq!(engine.sort_seed(), 3);

    let mut root = AssertionGroup::new("root");
    engine
        .should_fail_initially(&mut root, &fqdn(), &[Value::str("no-dots-here")])
        .unwrap();
    let outcome = root.groups().next().and_then(|g| g.outcomes().next()).unwrap();
    assert_eq!(outcome.diagnostics().lines()[2], "    FQDN->check(...) ==> FAILED");

    let ints = SimpleType::new("Int", |v| v.as_int().is_some())
        .with_sort_by(|a, b| a.as_int().cmp(&b.as_int()));
    engine
        .should_sort(&mut root, &ints, &[vec![Value::Int(1), Value::Int(2)]])
        .unwrap();
    let sorted = root.find_group("Int: should_sort").unwrap();
    assert_eq!(
        sorted.outcomes().next().unwrap().diagnostics().lines()[1],
        "    5 of 5 trials ==> PASSED"
    );
}

#[test]
fn test_invalid_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "sort_trials = 0").unwrap();
    let err = EngineConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("sort_trials"));
}

#[test]
fn test_report_serializes() {
    let engine = Engine::with_defaults();
    let mut root = AssertionGroup::new("hostnames");
    engine
        .should_fail(&mut root, &fqdn(), &[Value::str(".com")])
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&root.to_json().unwrap()).unwrap();
    let verb = &json["entries"][0];
    assert_eq!(verb["type"], "group");
    assert_eq!(verb["name"], "FQDN: should_fail");
    let outcome = &verb["entries"][0];
    assert_eq!(outcome["label"], "\".com\" should fail (no coercion)");
    assert_eq!(outcome["passed"], true);
    assert_eq!(outcome["stage"], "no_coercion");
    assert_eq!(outcome["diagnostics"][0], "FQDN constraint map:");
}
