use crate::lang::Error;
use crate::mach::Context;

mod cell_test;
mod eval_test;

/// A context for code that never dispatches.
struct Detached;

impl Context for Detached {
    fn dispatch(&mut self, script: &str) -> Result<(), Error> {
        Err(crate::error!(DispatchNotFound, script))
    }
}
