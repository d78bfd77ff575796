use super::{Cell, SharedTable, Val};
use crate::error;
use crate::lang::{Error, Type};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

type Result<T> = std::result::Result<T, Error>;

/// Where a program slot lives, as decided by the compiler.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Local(Type),
    Shared(super::SharedId),
}

#[derive(Debug)]
enum Storage {
    Local(Cell),
    Shared(Rc<RefCell<Cell>>),
}

/// ## Variable memory
///
/// Local cells are owned here and start out fresh for every compiled
/// program. Shared cells are borrowed from the scope's shared table.
#[derive(Debug, Default)]
pub struct Var {
    slots: Vec<Storage>,
}

impl Var {
    pub fn new(slots: &[Slot], shared: &SharedTable) -> Result<Var> {
        let mut storage = Vec::with_capacity(slots.len());
        for slot in slots {
            storage.push(match slot {
                Slot::Local(ty) => Storage::Local(Cell::create(ty)),
                Slot::Shared(id) => match shared.get(*id) {
                    Some(entry) => Storage::Shared(entry.cell.clone()),
                    None => return Err(error!(InternalError; &format!("no shared {}", id))),
                },
            });
        }
        Ok(Var { slots: storage })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn missing(slot: usize) -> Error {
        error!(InternalError; &format!("no variable in slot {}", slot))
    }

    pub fn fetch(&self, slot: usize) -> Result<Val> {
        match self.slots.get(slot) {
            Some(Storage::Local(cell)) => Ok(cell.value()),
            Some(Storage::Shared(cell)) => Ok(cell.borrow().value()),
            None => Err(Var::missing(slot)),
        }
    }

    pub fn store(&mut self, slot: usize, val: Val, path: &[i32]) -> Result<()> {
        trace!(slot, ?path, value = %val, "store");
        match self.slots.get_mut(slot) {
            Some(Storage::Local(cell)) => cell.set(val, path),
            Some(Storage::Shared(cell)) => cell.borrow_mut().set(val, path),
            None => Err(Var::missing(slot)),
        }
    }
}
