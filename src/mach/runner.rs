use super::statement::Frame;
use super::{Context, Program, SharedTable, Stack, Val, Var};
use crate::lang::Error;
use std::rc::Rc;
use tracing::trace;

type Result<T> = std::result::Result<T, Error>;

/// ## Program execution
///
/// Replays a program's statements top to bottom against its own local
/// variables and the shared cells it borrowed. Locals keep their values
/// between runs until the unit is recompiled.
#[derive(Debug)]
pub struct Runner {
    program: Rc<Program>,
    var: Var,
    stack: Stack<Val>,
}

impl Runner {
    pub fn new(program: Rc<Program>, shared: &SharedTable) -> Result<Runner> {
        let var = Var::new(&program.slots, shared)?;
        let stack = Stack::new("evaluation stack", program.max_depth());
        Ok(Runner {
            program,
            var,
            stack,
        })
    }

    pub fn program(&self) -> &Rc<Program> {
        &self.program
    }

    pub fn var(&self) -> &Var {
        &self.var
    }

    /// Any failure is reported at the position of the statement that
    /// raised it.
    pub fn run(&mut self, ctx: &mut dyn Context) -> Result<()> {
        let statements = self.program.statements();
        let mut frame = Frame {
            var: &mut self.var,
            stack: &mut self.stack,
            functions: &self.program.functions,
        };
        let mut pc = 0;
        while let Some(statement) = statements.get(pc) {
            trace!(pc, position = %statement.position(), "exec");
            match statement.exec(&mut frame, ctx) {
                Ok(distance) => pc += distance,
                Err(error) => return Err(error.at(statement.position())),
            }
        }
        Ok(())
    }
}
