use super::{Function, SharedId, Slot, Statement, Symbol};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// ## Compiled unit
///
/// Everything one successful compilation produces. A program never
/// changes after it is built; recompiling makes a new one.
#[derive(Debug, Default)]
pub struct Program {
    pub(crate) statements: Vec<Statement>,
    pub(crate) slots: Vec<Slot>,
    pub(crate) symbols: BTreeMap<Rc<str>, Symbol>,
    pub(crate) functions: Vec<Rc<dyn Function>>,
    /// Shared variables declared by this unit.
    pub(crate) exports: BTreeMap<Rc<str>, SharedId>,
    /// Units this one imports from.
    pub(crate) imports: BTreeSet<Rc<str>>,
    /// Units this one imports from or dispatches by literal name.
    pub(crate) subscripts: BTreeSet<Rc<str>>,
    /// One entry per shared variable declared or imported.
    pub(crate) references: Vec<SharedId>,
}

impl Program {
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn symbols(&self) -> &BTreeMap<Rc<str>, Symbol> {
        &self.symbols
    }

    pub fn exports(&self) -> &BTreeMap<Rc<str>, SharedId> {
        &self.exports
    }

    pub fn subscripts(&self) -> &BTreeSet<Rc<str>> {
        &self.subscripts
    }

    pub fn imports(&self) -> &BTreeSet<Rc<str>> {
        &self.imports
    }

    pub fn references(&self) -> &[SharedId] {
        &self.references
    }

    /// Deepest evaluation stack any statement needs.
    pub fn max_depth(&self) -> usize {
        self.statements.iter().map(Statement::depth).max().unwrap_or(0)
    }

    /// Name of the variable bound to a slot.
    pub fn slot_name(&self, slot: usize) -> Option<&Rc<str>> {
        self.symbols.iter().find_map(|(name, sym)| match sym {
            Symbol::Variable(var) if var.slot == slot => Some(name),
            _ => None,
        })
    }
}

impl std::fmt::Debug for dyn Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
