use super::operation::{self, is_unary};
use super::{Context, Function, Link, Opcode, Stack, Val, Var};
use crate::error;
use crate::lang::{Error, Position};
use nalgebra::{Matrix4, Vector4};
use std::convert::TryFrom;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Where the value of an assignment goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Variable slot and the number of path indices pushed before the value.
    Slot { slot: usize, path: usize },
    Discard,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    Assignment(Target),
    /// Falls through when the condition holds, otherwise skips forward.
    CondJump(usize),
    Jump(usize),
}

/// Machine state a statement runs against.
pub struct Frame<'a> {
    pub var: &'a mut Var,
    pub stack: &'a mut Stack<Val>,
    pub functions: &'a [Rc<dyn Function>],
}

/// ## Compiled statement
#[derive(Debug, Clone)]
pub struct Statement {
    kind: Kind,
    code: Vec<u32>,
    immed: Vec<Val>,
    depth: usize,
    position: Position,
}

impl Statement {
    pub fn new(kind: Kind, link: Link, position: Position) -> Result<Statement> {
        let (code, immed, depth) = link.finish()?;
        Ok(Statement {
            kind,
            code,
            immed,
            depth,
            position,
        })
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn code(&self) -> &[u32] {
        &self.code
    }

    pub fn immed(&self) -> &[Val] {
        &self.immed
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Resolves the distance of a jump opened earlier.
    pub fn set_jump(&mut self, distance: usize) {
        match &mut self.kind {
            Kind::CondJump(d) | Kind::Jump(d) => *d = distance,
            Kind::Assignment(_) => debug_assert!(false, "not a jump"),
        }
    }

    /// Runs the statement and returns how far to advance.
    pub fn exec(&self, frame: &mut Frame, ctx: &mut dyn Context) -> Result<usize> {
        match &self.kind {
            Kind::Jump(distance) => Ok(*distance),
            Kind::CondJump(distance) => {
                if self.eval(frame, ctx)?.integer()? != 0 {
                    Ok(1)
                } else {
                    Ok(*distance)
                }
            }
            Kind::Assignment(Target::Discard) => {
                self.eval(frame, ctx)?;
                Ok(1)
            }
            Kind::Assignment(Target::Slot { slot, path }) => {
                let val = self.eval(frame, ctx)?;
                let mut indices = Vec::with_capacity(*path);
                for v in frame.stack.pop_n(*path)? {
                    indices.push(v.integer()?);
                }
                frame.var.store(*slot, val, &indices)?;
                Ok(1)
            }
        }
    }

    fn word(&self, ic: usize) -> Result<usize> {
        match self.code.get(ic) {
            Some(w) => Ok(*w as usize),
            None => Err(error!(InternalError; "truncated instruction")),
        }
    }

    /// Evaluates the instruction stream. Path indices, if any, stay on the
    /// stack below the returned value.
    fn eval(&self, frame: &mut Frame, ctx: &mut dyn Context) -> Result<Val> {
        let stack = &mut *frame.stack;
        stack.clear();
        let mut ic = 0;
        let mut d = 0;
        let mut stop: Option<usize> = None;
        let mut guarded = false;
        while ic < self.code.len() {
            if stop == Some(ic) {
                break;
            }
            let (op, tag) = match Opcode::decode(self.code[ic]) {
                Some(decoded) => decoded,
                None => return Err(error!(InternalError; "bad instruction")),
            };
            ic += 1;
            match op {
                Opcode::Immed => {
                    let val = match self.immed.get(d) {
                        Some(val) => val.clone(),
                        None => return Err(error!(InternalError; "missing immediate")),
                    };
                    d += 1;
                    stack.push(val)?;
                }
                Opcode::Var => {
                    let slot = self.word(ic)?;
                    ic += 1;
                    stack.push(frame.var.fetch(slot)?)?;
                }
                Opcode::Fun => {
                    let index = self.word(ic)?;
                    let arity = self.word(ic + 1)?;
                    ic += 2;
                    let function = match frame.functions.get(index) {
                        Some(f) => f.clone(),
                        None => return Err(error!(InternalError; "no such function")),
                    };
                    let offset = match stack.len().checked_sub(arity) {
                        Some(offset) => offset,
                        None => return Err(error!(InternalError; "stack underflow")),
                    };
                    let result = function.execute(stack.as_slice(), offset, ctx)?;
                    stack.truncate(offset);
                    stack.push(result)?;
                }
                Opcode::Guard => {
                    let code_len = self.word(ic)?;
                    let immed_len = self.word(ic + 1)?;
                    ic += 2;
                    guarded = true;
                    if stack.pop()?.integer()? != 0 {
                        stop = Some(ic + code_len);
                    } else {
                        ic += code_len;
                        d += immed_len;
                    }
                }
                Opcode::Member => {
                    let field = self.word(ic)?;
                    ic += 1;
                    let record = stack.pop()?;
                    match record.list()?.get(field) {
                        Some(val) => stack.push(val.clone())?,
                        None => return Err(error!(InternalError; "no such field")),
                    }
                }
                Opcode::Index => {
                    let (list, index) = stack.pop_2()?;
                    let index = index.integer()?;
                    let items = list.list()?;
                    match usize::try_from(index).ok().and_then(|i| items.get(i)) {
                        Some(val) => {
                            let val = val.clone();
                            stack.push(val)?
                        }
                        None => {
                            return Err(error!(OutOfRange; &format!(
                                "index {} of {}",
                                index,
                                items.len()
                            )))
                        }
                    }
                }
                Opcode::List => {
                    let len = self.word(ic)?;
                    ic += 1;
                    let items = stack.pop_n(len)?;
                    stack.push(Val::List(items))?;
                }
                Opcode::Vector => {
                    let items = stack.pop_n(4)?;
                    stack.push(Val::Vector(Vector4::new(
                        items[0].real()?,
                        items[1].real()?,
                        items[2].real()?,
                        items[3].real()?,
                    )))?;
                }
                Opcode::Matrix => {
                    let items = stack.pop_n(4)?;
                    stack.push(Val::Matrix(Matrix4::from_columns(&[
                        items[0].vector()?,
                        items[1].vector()?,
                        items[2].vector()?,
                        items[3].vector()?,
                    ])))?;
                }
                _ if is_unary(op) => {
                    let f = operation::unary(op, tag)?;
                    let val = stack.pop()?;
                    stack.push(f(val)?)?;
                }
                _ => {
                    let f = operation::binary(op, tag)?;
                    let (lhs, rhs) = stack.pop_2()?;
                    stack.push(f(lhs, rhs)?)?;
                }
            }
        }
        if guarded && stop.is_none() {
            return Err(error!(NoValue));
        }
        stack.pop()
    }
}
