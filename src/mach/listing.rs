use super::statement::{Kind, Target};
use super::{Opcode, Program, Statement};
use std::fmt;

/// ## Bytecode listing
///
/// Human readable disassembly of a compiled program, one header line per
/// statement followed by its instructions.
pub struct Listing<'a> {
    program: &'a Program,
}

impl<'a> Listing<'a> {
    pub fn new(program: &'a Program) -> Listing<'a> {
        Listing { program }
    }

    fn target(&self, kind: &Kind) -> String {
        match kind {
            Kind::Assignment(Target::Discard) => "discard".to_string(),
            Kind::Assignment(Target::Slot { slot, path }) => {
                let name = match self.program.slot_name(*slot) {
                    Some(name) => name.to_string(),
                    None => format!("${}", slot),
                };
                if *path == 0 {
                    format!("store {}", name)
                } else {
                    format!("store {} path {}", name, path)
                }
            }
            Kind::CondJump(distance) => format!("unless +{}", distance),
            Kind::Jump(distance) => format!("jump +{}", distance),
        }
    }

    fn statement(&self, f: &mut fmt::Formatter, pc: usize, statement: &Statement) -> fmt::Result {
        writeln!(
            f,
            "{:04} [{}] {} (depth {})",
            pc,
            statement.position(),
            self.target(statement.kind()),
            statement.depth()
        )?;
        let code = statement.code();
        let mut ic = 0;
        let mut d = 0;
        while ic < code.len() {
            write!(f, "    {:03} ", ic)?;
            let (op, tag) = match Opcode::decode(code[ic]) {
                Some(decoded) => decoded,
                None => {
                    writeln!(f, "?? {:#x}", code[ic])?;
                    ic += 1;
                    continue;
                }
            };
            ic += 1;
            write!(f, "{}", op)?;
            if op.is_typed() {
                write!(f, " {}", tag)?;
            }
            if op == Opcode::Immed {
                match statement.immed().get(d) {
                    Some(val) => write!(f, " {}", val)?,
                    None => write!(f, " ?")?,
                }
                d += 1;
            }
            for word in code.iter().skip(ic).take(op.operands()) {
                write!(f, " {}", word)?;
            }
            ic += op.operands();
            if op == Opcode::Var {
                if let Some(name) = code.get(ic - 1).and_then(|s| self.program.slot_name(*s as usize)) {
                    write!(f, " ({})", name)?;
                }
            }
            if op == Opcode::Fun {
                if let Some(function) = code.get(ic - 2).and_then(|i| self.program.functions.get(*i as usize)) {
                    write!(f, " ({})", function.name())?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<'a> fmt::Display for Listing<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (pc, statement) in self.program.statements().iter().enumerate() {
            self.statement(f, pc, statement)?;
        }
        Ok(())
    }
}
