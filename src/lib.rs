//! # Scene
//!
//! A small typed language for driving a graphics pipeline. Scripts declare
//! variables of type `Natural`, `Real`, `Vector`, `Matrix` and `Text`,
//! arrays and records of those, and assign expressions to them. Scripts
//! share variables with each other and with the host, and can run each
//! other with `dispatch`.
//!
//! ```
//! use scene::mach::{Scope, Val};
//!
//! let mut scope = Scope::new();
//! scope.set_source("setup", "shared Real scale = 2.5;").unwrap();
//! scope.set_source("draw", "import scale from setup; Real s = scale * 2;").unwrap();
//! scope.run("setup").unwrap();
//! scope.run("draw").unwrap();
//! assert_eq!(scope.get_shared("setup", "scale"), Some(Val::Real(2.5)));
//! ```
//!
//! Run the `scene` binary for an interactive session. Type `:help` for the
//! list of commands.

pub mod lang;
pub mod mach;
pub mod term;
