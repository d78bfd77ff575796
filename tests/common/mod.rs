#![allow(dead_code)]
use scene::lang::Error;
use scene::mach::{Scope, Val};

/// Compiles `source` as unit `main` and returns the error text, or an
/// empty string when it compiled.
pub fn compile_error(source: &str) -> String {
    let mut scope = Scope::new();
    match scope.set_source("main", source) {
        Ok(()) => String::new(),
        Err(error) => error.to_string(),
    }
}

/// Compiles and runs `source` as unit `main`.
pub fn exec(source: &str) -> Result<Scope, Error> {
    let mut scope = Scope::new();
    scope.set_source("main", source)?;
    scope.run("main")?;
    Ok(scope)
}

/// Value of a variable of unit `main` after running `source`.
pub fn value_of(source: &str, name: &str) -> Val {
    let scope = match exec(source) {
        Ok(scope) => scope,
        Err(error) => panic!("{}", error),
    };
    let value = scope
        .values("main")
        .into_iter()
        .find(|(n, _)| &**n == name)
        .map(|(_, v)| v);
    match value {
        Some(value) => value,
        None => panic!("no variable {}", name),
    }
}

/// Error text of running `source` as unit `main`.
pub fn run_error(source: &str) -> String {
    match exec(source) {
        Ok(_) => String::new(),
        Err(error) => error.to_string(),
    }
}
