use super::{Opcode, Val};
use crate::error;
use crate::lang::{Error, LrType};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// An open guard waiting for the length of the value it protects.
#[derive(Debug, Clone, Copy)]
struct Patch {
    at: usize,
    code: usize,
    immed: usize,
}

/// ## Statement code under construction
///
/// Collects the instruction and immediate streams of one statement while
/// tracking how deep the evaluation stack gets. Guard jump distances are
/// not known when the guard is emitted; they are recorded as patches and
/// written once the guarded value is complete.
#[derive(Debug, Default)]
pub struct Link {
    code: Vec<u32>,
    immed: Vec<Val>,
    depth: usize,
    max_depth: usize,
    unlinked: Vec<Patch>,
}

impl Link {
    pub fn new() -> Link {
        Link::default()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
        self.max_depth = self.max_depth.max(depth);
    }

    fn adjust(&mut self, pops: usize, pushes: usize) -> Result<()> {
        match self.depth.checked_sub(pops) {
            Some(depth) => {
                self.set_depth(depth + pushes);
                Ok(())
            }
            None => Err(error!(InternalError; "stack depth underflow")),
        }
    }

    /// Appends an instruction that pops `pops` values and pushes `pushes`.
    pub fn push(&mut self, op: Opcode, tag: Option<LrType>, pops: usize, pushes: usize) -> Result<()> {
        self.code.push(op.encode(tag));
        self.adjust(pops, pushes)
    }

    pub fn operand(&mut self, word: usize) {
        self.code.push(word as u32);
    }

    pub fn immed(&mut self, val: Val) -> Result<()> {
        self.immed.push(val);
        self.push(Opcode::Immed, None, 0, 1)
    }

    /// Emits a guard consuming the condition on top of the stack. The
    /// distances are filled in by `close_guard`.
    pub fn open_guard(&mut self) -> Result<()> {
        self.push(Opcode::Guard, None, 1, 0)?;
        let at = self.code.len();
        self.code.push(0);
        self.code.push(0);
        self.unlinked.push(Patch {
            at,
            code: self.code.len(),
            immed: self.immed.len(),
        });
        Ok(())
    }

    pub fn close_guard(&mut self) -> Result<()> {
        let patch = match self.unlinked.pop() {
            Some(patch) => patch,
            None => return Err(error!(InternalError; "no open guard")),
        };
        self.code[patch.at] = (self.code.len() - patch.code) as u32;
        self.code[patch.at + 1] = (self.immed.len() - patch.immed) as u32;
        Ok(())
    }

    /// The text of a lone text literal emitted since `start`.
    pub fn literal_since(&self, start: usize) -> Option<Rc<str>> {
        if self.code.len() != start + 1 || self.code[start] != Opcode::Immed.encode(None) {
            return None;
        }
        match self.immed.last() {
            Some(Val::Text(s)) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn finish(self) -> Result<(Vec<u32>, Vec<Val>, usize)> {
        if !self.unlinked.is_empty() {
            return Err(error!(InternalError; "unresolved guard"));
        }
        Ok((self.code, self.immed, self.max_depth))
    }
}
