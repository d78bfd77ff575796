use pretty_assertions::assert_eq;
use scene::lang::{ErrorCode, Type};
use scene::mach::{Scope, Symbol, Val};
use std::rc::Rc;

fn value(scope: &Scope, unit: &str, name: &str) -> Option<Val> {
    scope
        .values(unit)
        .into_iter()
        .find(|(n, _)| &**n == name)
        .map(|(_, v)| v)
}

fn setup_and_draw() -> Scope {
    let mut scope = Scope::new();
    scope.set_source("setup", "shared Real scale = 2.5;").unwrap();
    scope
        .set_source("draw", "import scale from setup; Real s = scale * 2;")
        .unwrap();
    scope
}

#[test]
fn test_shared_read_after_write() {
    let mut scope = setup_and_draw();
    scope.run("setup").unwrap();
    scope.run("draw").unwrap();
    assert_eq!(value(&scope, "draw", "s"), Some(Val::Real(5.0)));
    scope.set_shared("setup", "scale", Val::Integer(4)).unwrap();
    scope.run("draw").unwrap();
    assert_eq!(value(&scope, "draw", "s"), Some(Val::Real(8.0)));
    assert_eq!(value(&scope, "setup", "scale"), Some(Val::Real(4.0)));
    let error = scope
        .set_shared("setup", "scale", Val::Text("big".into()))
        .unwrap_err();
    assert!(error.is(ErrorCode::AssignmentMismatch));
    let error = scope.set_shared("setup", "size", Val::Integer(1)).unwrap_err();
    assert!(error.is(ErrorCode::NotDeclared));
}

#[test]
fn test_reference_counts() {
    let mut scope = setup_and_draw();
    assert_eq!(scope.shared_refs("setup", "scale"), Some(2));
    assert!(scope.remove("draw"));
    assert_eq!(scope.shared_refs("setup", "scale"), Some(1));
    assert!(scope.remove("setup"));
    assert_eq!(scope.shared_refs("setup", "scale"), None);
    assert_eq!(scope.get_shared("setup", "scale"), None);
    assert_eq!(scope.shared_len(), 0);
    assert!(!scope.remove("setup"));
}

#[test]
fn test_redeclaration_keeps_value() {
    let mut scope = Scope::new();
    scope.set_source("a", "shared Natural n;").unwrap();
    scope.set_shared("a", "n", Val::Integer(42)).unwrap();
    scope.set_source("a", "shared Natural n; Natural other;").unwrap();
    assert_eq!(scope.get_shared("a", "n"), Some(Val::Integer(42)));

    assert!(scope.set_source("a", "shared Natural n; oops").is_err());
    assert_eq!(scope.get_shared("a", "n"), Some(Val::Integer(42)));
    assert_eq!(scope.shared_refs("a", "n"), Some(1));

    scope.set_source("a", "shared Real n;").unwrap();
    assert_eq!(scope.get_shared("a", "n"), Some(Val::Real(0.0)));
    assert_eq!(scope.shared_len(), 1);
}

#[test]
fn test_stale_importer_recompiles() {
    let mut scope = setup_and_draw();
    scope
        .set_source("setup", "shared Real scale = 3; shared Natural count;")
        .unwrap();
    assert!(scope.unit("draw").unwrap().is_stale());
    scope.run("setup").unwrap();
    scope.run("draw").unwrap();
    assert!(!scope.unit("draw").unwrap().is_stale());
    assert_eq!(value(&scope, "draw", "s"), Some(Val::Real(6.0)));
}

#[test]
fn test_stale_importer_fails() {
    let mut scope = setup_and_draw();
    scope.set_source("setup", "shared Natural size;").unwrap();
    let error = scope.run("draw").unwrap_err();
    assert!(error.is(ErrorCode::CompilationFailed));
}

#[test]
fn test_dispatch() {
    let mut scope = Scope::new();
    scope
        .set_source("counter", "shared Natural hits; hits = hits + 1;")
        .unwrap();
    scope
        .set_source("main", "dispatch(\"counter\");\ndispatch(\"counter\");")
        .unwrap();
    scope.run("main").unwrap();
    assert_eq!(scope.get_shared("counter", "hits"), Some(Val::Integer(2)));
    assert!(scope.subscript_relation("main", "counter"));
    assert!(!scope.subscript_relation("counter", "main"));
}

#[test]
fn test_dispatch_not_found() {
    let mut scope = Scope::new();
    scope.set_source("main", "dispatch(\"ghost\");").unwrap();
    let error = scope.run("main").unwrap_err();
    assert!(error.is(ErrorCode::DispatchNotFound));
    assert_eq!(error.to_string(), "script ghost not found at 1:1");
    assert!(scope.run("ghost").unwrap_err().is(ErrorCode::DispatchNotFound));
}

#[test]
fn test_cyclic_dispatch() {
    let mut scope = Scope::new();
    scope.set_source("ping", "dispatch(\"pong\");").unwrap();
    scope.set_source("pong", "Text next = \"ping\"; dispatch(next);").unwrap();
    let error = scope.run("ping").unwrap_err();
    assert!(error.is(ErrorCode::CyclicDispatch));
    scope.set_source("solo", "dispatch(\"solo\");").unwrap();
    assert!(scope.run("solo").unwrap_err().is(ErrorCode::CyclicDispatch));
    scope.run("pong").unwrap_err();
    // a failed run leaves the unit runnable
    scope.set_source("pong", "Natural quiet;").unwrap();
    scope.run("ping").unwrap();
}

#[test]
fn test_import_relations() {
    let mut scope = Scope::new();
    scope.set_source("a", "shared Vector up = [0, 1, 0, 0];").unwrap();
    scope.set_source("b", "import up from a; shared Vector down;").unwrap();
    scope.set_source("c", "import down from b;").unwrap();
    assert!(scope.subscript_relation("c", "a"));
    assert!(!scope.subscript_relation("a", "c"));
    let error = scope.set_source("a", "import down from c;").unwrap_err();
    assert!(error.is(ErrorCode::CyclicImport));
    assert_eq!(
        scope.exports("b"),
        vec![(Rc::from("down"), Type::Vector)]
    );
    let error = scope.set_source("d", "import up from b;").unwrap_err();
    assert!(error.is(ErrorCode::NotExported));
}

#[test]
fn test_host_globals() {
    let mut scope = Scope::new();
    scope.add_shared("time", Type::Integer);
    scope
        .set_source("main", "import time; Natural t = time * 2;")
        .unwrap();
    scope.set_shared("", "time", Val::Integer(21)).unwrap();
    scope.run("main").unwrap();
    assert_eq!(value(&scope, "main", "t"), Some(Val::Integer(42)));
    assert!(scope.remove("main"));
    assert_eq!(scope.get_shared("", "time"), Some(Val::Integer(21)));
}

#[test]
fn test_host_global_retyped() {
    let mut scope = Scope::new();
    scope.add_shared("t", Type::Integer);
    scope.set_source("main", "import t; Natural copy = t;").unwrap();
    scope.add_shared("t", Type::Integer);
    assert_eq!(scope.shared_len(), 1);
    assert_eq!(scope.shared_refs("", "t"), Some(2));

    scope.add_shared("t", Type::Real);
    assert!(scope.unit("main").unwrap().is_stale());
    assert_eq!(scope.get_shared("", "t"), Some(Val::Real(0.0)));
    let error = scope.run("main").unwrap_err();
    assert!(error.is(ErrorCode::CompilationFailed));
    scope.set_source("main", "import t; Real copy = t;").unwrap();
    assert_eq!(scope.shared_len(), 1);
    assert_eq!(scope.shared_refs("", "t"), Some(2));
}

#[test]
fn test_recompile_all() {
    let mut scope = Scope::new();
    assert!(scope
        .set_source("draw", "import scale from setup; Real s = scale;")
        .is_err());
    let failed = scope.recompile_all();
    assert_eq!(failed.len(), 1);
    assert_eq!(&*failed[0].0, "draw");
    assert!(failed[0].1.is(ErrorCode::ScriptNotFound));
    scope.set_source("setup", "shared Real scale = 1;").unwrap();
    assert!(scope.recompile_all().is_empty());
    assert!(scope.unit("draw").unwrap().program().is_some());
}

#[test]
fn test_completion() {
    let scope = Scope::new();
    let source = "Natural count;\nco";
    let completion = scope.complete("main", source, source.len());
    assert_eq!(completion.prefix, "co");
    assert_eq!(completion.candidates, vec!["const", "cos", "cosh", "count"]);

    let source = "Real radius = 1; Real area = rad";
    let completion = scope.complete("main", source, source.len());
    assert_eq!(completion.prefix, "rad");
    assert_eq!(completion.candidates, vec!["radius"]);

    let source = "Real radius = ; Real area = rad";
    let completion = scope.complete("main", source, source.len());
    assert!(completion.candidates.contains(&"radius".to_string()));
}

#[test]
fn test_completion_leaves_shared_alone() {
    let scope = setup_and_draw();
    let before = scope.shared_len();
    let source = "shared Real zoom; import sc";
    let completion = scope.complete("other", source, source.len());
    assert_eq!(scope.shared_len(), before);
    assert_eq!(completion.candidates, vec!["scaling"]);
}

#[test]
fn test_unchanged_source_keeps_locals() {
    let mut scope = Scope::new();
    let source = "Natural n; n = n + 1;";
    scope.set_source("main", source).unwrap();
    scope.run("main").unwrap();
    scope.run("main").unwrap();
    scope.set_source("main", source).unwrap();
    scope.run("main").unwrap();
    assert_eq!(value(&scope, "main", "n"), Some(Val::Integer(3)));
    scope.set_source("main", "Natural n;  n = n + 1;").unwrap();
    scope.run("main").unwrap();
    assert_eq!(value(&scope, "main", "n"), Some(Val::Integer(1)));
}

#[test]
fn test_symbols() {
    let scope = setup_and_draw();
    let symbols = scope.symbols("draw").unwrap();
    match symbols.get("scale") {
        Some(Symbol::Variable(var)) => {
            assert_eq!(var.ty, Type::Real);
            assert!(var.imported);
            assert_eq!(var.shared, scope.symbols("setup").and_then(|s| match s.get("scale") {
                Some(Symbol::Variable(v)) => v.shared,
                _ => None,
            }));
        }
        other => panic!("unexpected symbol {:?}", other),
    }
    assert!(matches!(symbols.get("s"), Some(Symbol::Variable(v)) if !v.imported && v.shared.is_none()));
}
