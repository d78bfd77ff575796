mod common;
use common::*;
use scene::lang::{ErrorCode, Type};
use scene::mach::{Listing, Scope};

#[test]
fn test_clean_program() {
    assert_eq!(
        compile_error(
            "// a little of everything
            type Light = record(Vector pos, Real power);
            const Real half = 0.5;
            Light key = {[0, 4, 0, 1], 2};
            Real[] weights = {1, half};
            Matrix m = translation(key.pos) * rotation(45, [0, 1, 0, 0]);
            Natural mode = when key.power > 1: 1 else 0;
            if (mode == 1) { weights[2] = half; } else weights[0] = 0;
            3 + 4;
            "
        ),
        ""
    );
}

#[test]
fn test_declarations() {
    assert_eq!(
        compile_error("Natural x = 1; Natural x = 2;"),
        "x has been already declared. at 1:24"
    );
    assert_eq!(
        compile_error("Natural Real;"),
        "Real has been already declared. at 1:9"
    );
    assert_eq!(compile_error("y = 3;"), "y has not been declared. at 1:1");
    assert_eq!(compile_error("Blob b;"), "Blob has not been declared. at 1:1");
    assert_eq!(
        compile_error("type P = record(Real x, Real x);"),
        "duplicate declaration of x. at 1:30"
    );
    assert_eq!(
        compile_error("const Natural k = n;"),
        "n is not a constant expression. at 1:19"
    );
}

#[test]
fn test_type_errors() {
    assert_eq!(
        compile_error("Natural n = 1.5;"),
        "incompatible types in assignment to n. at 1:13"
    );
    assert_eq!(
        compile_error("Text t = \"a\" - \"b\";"),
        "incompatible types in - expression. at 1:14"
    );
    assert_eq!(
        compile_error("Vector v = [1, 2, 3];"),
        "wrong number of components in [] expression. at 1:12"
    );
    assert_eq!(
        compile_error("Natural[] a; a.x = 1;"),
        "x is not a member. at 1:16"
    );
    assert_eq!(
        compile_error("if (1.5) Natural z = 1;"),
        "expected integer in if expression. at 1:5"
    );
    assert_eq!(
        compile_error("Real x = when 1.5: 2;"),
        "expected integer in when expression. at 1:15"
    );
    assert_eq!(
        compile_error("Natural n = when 1: 2 else 1.5;"),
        "incompatible types in assignment to n. at 1:28"
    );
}

#[test]
fn test_calls() {
    assert_eq!(
        compile_error("Real r = sin(1, 2);"),
        "wrong number of arguments in sin. at 1:10"
    );
    assert_eq!(
        compile_error("Real r = sin(\"x\");"),
        "incompatible arguments in sin. at 1:14"
    );
    assert_eq!(compile_error("Real r; r();"), "r is not a function. at 1:9");
    assert_eq!(compile_error("sin = 1;"), "sin is not a variable. at 1:1");
}

#[test]
fn test_syntax_positions() {
    let mut scope = Scope::new();
    let error = scope
        .set_source("main", "Natural a = 1;\nReal b = a +;\n")
        .unwrap_err();
    assert!(error.is(ErrorCode::Unexpected));
    assert_eq!((error.row(), error.col(), error.offset()), (2, 13, 27));
    assert_eq!(error.to_string(), "unexpected ; at 2:13");
    assert_eq!(compile_error("Natural a = "), "expected expression at 1:13");
    assert_eq!(compile_error("Natural a = 1"), "expected ; at 1:14");
    let error = scope.set_source("other", "Natural a = (1;").unwrap_err();
    assert!(error.is(ErrorCode::Unexpected));
    assert_eq!((error.row(), error.col()), (1, 15));
}

#[test]
fn test_imports() {
    assert_eq!(
        compile_error("import camera;"),
        "variable camera has not been exported at 1:8"
    );
    assert_eq!(
        compile_error("import sin;"),
        "symbol sin is not a shared variable at 1:8"
    );
    assert_eq!(
        compile_error("import x from nowhere;"),
        "script \"nowhere\" not found at 1:15"
    );
    assert_eq!(
        compile_error("import x from main;"),
        "script main depends on this script at 1:15"
    );
    let mut scope = Scope::new();
    scope.add_shared("time", Type::Integer);
    let error = scope.set_source("main", "import time; time = 1;").unwrap_err();
    assert!(error.is(ErrorCode::AssignToImport));
    assert_eq!(
        error.to_string(),
        "cannot assign to imported variable time at 1:14"
    );
}

#[test]
fn test_failed_compile_keeps_program() {
    let mut scope = Scope::new();
    scope.set_source("main", "Natural a = 1;").unwrap();
    assert!(scope.set_source("main", "Natural a = ;").is_err());
    let unit = scope.unit("main").unwrap();
    assert!(unit.error().is_some());
    assert!(unit.program().unwrap().symbols().contains_key("a"));
    scope.run("main").unwrap();
}

#[test]
fn test_listing() {
    let mut scope = Scope::new();
    scope
        .set_source("main", "Real x = 1 + 2.5;\nReal y = when x > 3: x else 0;")
        .unwrap();
    let program = scope.unit("main").unwrap().program().unwrap().clone();
    let listing = Listing::new(&program).to_string();
    assert!(listing.starts_with("0000 ["));
    assert!(listing.contains("store x (depth 2)"));
    assert!(listing.contains("ADD IR"));
    assert!(listing.contains("GT RI"));
    assert!(listing.contains("VAR 1 (x)"));
    assert!(listing.contains("GUARD"));
}

#[test]
fn test_expression_statements() {
    assert_eq!(compile_error("Natural a = 1; a == 1;"), "");
    assert_eq!(compile_error("Natural a = 1; a + 2;"), "");
    assert_eq!(compile_error("Real[] xs = {1}; xs[0] * 2;"), "");
    assert_eq!(compile_error("Light[] xs;"), "Light has not been declared. at 1:1");
    assert_eq!(
        compile_error("Natural a = 1; a + \"b\";"),
        "incompatible types in + expression. at 1:18"
    );
}

#[test]
fn test_nesting_limit() {
    let nested = |depth: usize| {
        format!("Natural a = {}1{};", "(".repeat(depth), ")".repeat(depth))
    };
    assert_eq!(compile_error(&nested(50)), "");
    let mut scope = Scope::new();
    let error = scope.set_source("main", &nested(5000)).unwrap_err();
    assert!(error.is(ErrorCode::TooDeep));
    let error = scope
        .set_source("main", &format!("Natural a = {}1;", "!".repeat(5000)))
        .unwrap_err();
    assert!(error.is(ErrorCode::TooDeep));
    let error = scope
        .set_source("main", &format!("{}{}", "{".repeat(5000), "}".repeat(5000)))
        .unwrap_err();
    assert!(error.is(ErrorCode::TooDeep));
    let error = scope
        .set_source("main", &"if (1) ".repeat(5000))
        .unwrap_err();
    assert!(error.is(ErrorCode::TooDeep));
}

#[test]
fn test_integer_range() {
    assert_eq!(compile_error("Natural a = -2147483648;"), "");
    assert_eq!(compile_error("const Natural k = -2147483648;"), "");
    assert_eq!(
        compile_error("Natural a = 2147483648;"),
        "integer 2147483648 is out of range. at 1:13"
    );
    assert_eq!(
        compile_error("Natural a = -2147483649;"),
        "integer -2147483649 is out of range. at 1:14"
    );
}
