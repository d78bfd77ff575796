use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// ## Evaluation stack
///
/// A vector that refuses to grow past the depth the compiler computed
/// for the statement being run. Overflow or underflow means the bytecode
/// and the depth bookkeeping disagree.
pub struct Stack<T> {
    name: &'static str,
    depth: usize,
    vec: Vec<T>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?}", self.name, self.vec)
    }
}

impl<T> Stack<T> {
    pub fn new(name: &'static str, depth: usize) -> Stack<T> {
        Stack {
            name,
            depth,
            vec: Vec::with_capacity(depth),
        }
    }

    fn underflow(&self) -> Error {
        error!(InternalError; &format!("{} underflow", self.name))
    }

    pub fn len(&self) -> usize {
        self.vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    pub fn clear(&mut self) {
        self.vec.clear()
    }

    /// Every value, bottom first.
    pub fn as_slice(&self) -> &[T] {
        &self.vec
    }

    pub fn truncate(&mut self, len: usize) {
        self.vec.truncate(len)
    }

    pub fn push(&mut self, val: T) -> Result<()> {
        if self.vec.len() >= self.depth {
            return Err(error!(StackOverflow; self.name));
        }
        self.vec.push(val);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<T> {
        match self.vec.pop() {
            Some(val) => Ok(val),
            None => Err(self.underflow()),
        }
    }

    /// Pops the right operand, then the left, and returns them left first.
    pub fn pop_2(&mut self) -> Result<(T, T)> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;
        Ok((lhs, rhs))
    }

    pub fn pop_n(&mut self, n: usize) -> Result<Vec<T>> {
        match self.vec.len().checked_sub(n) {
            Some(start) => Ok(self.vec.drain(start..).collect()),
            None => Err(self.underflow()),
        }
    }
}
