use super::{Function, SharedId, Val};
use crate::lang::Type;
use std::collections::BTreeMap;
use std::rc::Rc;

/// ## Named entities
#[derive(Clone)]
pub enum Symbol {
    Variable(Variable),
    Function(usize, Rc<dyn Function>),
    Typedef(Type),
    Constant(Val),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub ty: Type,
    pub slot: usize,
    /// Entry in the shared table for shared and imported variables.
    pub shared: Option<SharedId>,
    pub imported: bool,
}

impl Symbol {
    pub fn ty(&self) -> Type {
        match self {
            Symbol::Variable(var) => var.ty.clone(),
            Symbol::Function(_, f) => f.ret(),
            Symbol::Typedef(ty) => ty.clone(),
            Symbol::Constant(val) => val.ty(),
        }
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Variable(var) => write!(f, "Variable({:?})", var),
            Symbol::Function(index, func) => write!(f, "Function({}, {})", index, func.name()),
            Symbol::Typedef(ty) => write!(f, "Typedef({})", ty),
            Symbol::Constant(val) => write!(f, "Constant({})", val),
        }
    }
}

/// ## Host environment
///
/// Symbols registered once by the host and visible to every script.
/// Function indices are positions in `functions` and never change.
#[derive(Default, Clone)]
pub struct Globals {
    symbols: BTreeMap<Rc<str>, Symbol>,
    functions: Vec<Rc<dyn Function>>,
    shared: BTreeMap<Rc<str>, SharedId>,
}

impl Globals {
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &Rc<str>> {
        self.symbols.keys().chain(self.shared.keys())
    }

    pub fn functions(&self) -> &[Rc<dyn Function>] {
        &self.functions
    }

    pub fn shared(&self, name: &str) -> Option<SharedId> {
        self.shared.get(name).copied()
    }

    /// Adds a function or replaces one of the same name in place.
    pub fn add_function(&mut self, function: Rc<dyn Function>) {
        let name: Rc<str> = function.name().into();
        let index = match self.symbols.get(&name) {
            Some(Symbol::Function(index, _)) => {
                self.functions[*index] = function.clone();
                *index
            }
            _ => {
                self.functions.push(function.clone());
                self.functions.len() - 1
            }
        };
        self.symbols.insert(name, Symbol::Function(index, function));
    }

    pub fn add_constant(&mut self, name: &str, val: Val) {
        self.symbols.insert(name.into(), Symbol::Constant(val));
    }

    pub fn add_typedef(&mut self, name: &str, ty: Type) {
        self.symbols.insert(name.into(), Symbol::Typedef(ty));
    }

    pub fn add_shared(&mut self, name: &str, id: SharedId) {
        self.shared.insert(name.into(), id);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name) || self.shared.contains_key(name)
    }
}
