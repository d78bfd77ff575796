use super::{Cell, Val};
use crate::lang::Type;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SharedId(u32);

impl std::fmt::Display for SharedId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct SharedEntry {
    pub owner: Rc<str>,
    pub name: Rc<str>,
    pub ty: Type,
    pub cell: Rc<RefCell<Cell>>,
    pub refs: usize,
}

/// ## Shared variable table
///
/// Storage for variables that outlive a single compilation, keyed by the
/// declaring unit and the variable name. Every compiled program holds one
/// reference per shared variable it declares or imports. `sweep` destroys
/// entries nobody references.
#[derive(Debug, Clone, Default)]
pub struct SharedTable {
    next: u32,
    entries: BTreeMap<SharedId, SharedEntry>,
    keys: HashMap<(Rc<str>, Rc<str>), SharedId>,
}

impl SharedTable {
    pub fn new() -> SharedTable {
        SharedTable::default()
    }

    /// Finds the entry for a declaration, reusing the current one when the
    /// type is unchanged so its value carries over.
    pub fn declare(&mut self, owner: &str, name: &str, ty: &Type) -> SharedId {
        let key: (Rc<str>, Rc<str>) = (owner.into(), name.into());
        if let Some(id) = self.keys.get(&key) {
            if let Some(entry) = self.entries.get(id) {
                if entry.ty == *ty {
                    return *id;
                }
            }
        }
        let id = SharedId(self.next);
        self.next += 1;
        self.entries.insert(
            id,
            SharedEntry {
                owner: key.0.clone(),
                name: key.1.clone(),
                ty: ty.clone(),
                cell: Rc::new(RefCell::new(Cell::create(ty))),
                refs: 0,
            },
        );
        self.keys.insert(key, id);
        id
    }

    pub fn lookup(&self, owner: &str, name: &str) -> Option<SharedId> {
        let key: (Rc<str>, Rc<str>) = (owner.into(), name.into());
        self.keys.get(&key).copied()
    }

    pub fn get(&self, id: SharedId) -> Option<&SharedEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn refs(&self, owner: &str, name: &str) -> Option<usize> {
        self.lookup(owner, name)
            .and_then(|id| self.entries.get(&id))
            .map(|e| e.refs)
    }

    pub fn value(&self, id: SharedId) -> Option<Val> {
        self.entries.get(&id).map(|e| e.cell.borrow().value())
    }

    pub fn acquire(&mut self, ids: &[SharedId]) {
        for id in ids {
            if let Some(entry) = self.entries.get_mut(id) {
                entry.refs += 1;
            }
        }
    }

    pub fn release(&mut self, ids: &[SharedId]) {
        for id in ids {
            if let Some(entry) = self.entries.get_mut(id) {
                entry.refs = entry.refs.saturating_sub(1);
            }
        }
    }

    /// Destroys every entry whose reference count is zero and returns
    /// their names.
    pub fn sweep(&mut self) -> Vec<(Rc<str>, Rc<str>)> {
        let dead: Vec<SharedId> = self
            .entries
            .iter()
            .filter(|(_, e)| e.refs == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut removed = vec![];
        for id in dead {
            if let Some(entry) = self.entries.remove(&id) {
                let key = (entry.owner.clone(), entry.name.clone());
                if self.keys.get(&key) == Some(&id) {
                    self.keys.remove(&key);
                    let older = self
                        .entries
                        .iter()
                        .rev()
                        .find(|(_, e)| e.owner == key.0 && e.name == key.1)
                        .map(|(id, _)| *id);
                    if let Some(older) = older {
                        self.keys.insert(key.clone(), older);
                    }
                }
                debug!(owner = %entry.owner, name = %entry.name, %id, "shared variable released");
                removed.push(key);
            }
        }
        removed
    }
}
