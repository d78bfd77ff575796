use super::complete::{self, Completion};
use super::{
    library, Compiler, Context, Function, Globals, Program, Runner, SharedId, SharedTable, Symbol,
    Units, Val,
};
use crate::error;
use crate::lang::{Error, Type};
use crc::crc32::checksum_ieee;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use tracing::debug;

type Result<T> = std::result::Result<T, Error>;

/// One named script and the state of its last compilation.
#[derive(Debug, Default)]
pub struct Unit {
    source: String,
    checksum: u32,
    program: Option<Rc<Program>>,
    runner: Option<Runner>,
    error: Option<Error>,
    stale: bool,
}

impl Unit {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The last program that compiled without errors.
    pub fn program(&self) -> Option<&Rc<Program>> {
        self.program.as_ref()
    }

    /// The error of the most recent compile, if it failed.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Set when a unit this one imports from has been recompiled.
    pub fn is_stale(&self) -> bool {
        self.stale
    }
}

impl Units for BTreeMap<Rc<str>, Unit> {
    fn contains(&self, unit: &str) -> bool {
        self.contains_key(unit)
    }

    fn names(&self) -> Vec<Rc<str>> {
        self.keys().cloned().collect()
    }

    fn exports(&self, unit: &str) -> Option<&BTreeMap<Rc<str>, SharedId>> {
        self.get(unit)?.program.as_ref().map(|p| p.exports())
    }

    fn subscript_relation(&self, top: &str, sub: &str) -> bool {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut todo: Vec<&str> = vec![top];
        while let Some(name) = todo.pop() {
            let program = match self.get(name).and_then(|u| u.program.as_ref()) {
                Some(program) => program,
                None => continue,
            };
            for script in program.subscripts() {
                if **script == *sub {
                    return true;
                }
                if seen.insert(&**script) {
                    todo.push(&**script);
                }
            }
        }
        false
    }
}

/// ## Script scope
///
/// Owns every unit, the host symbols they compile against and the table
/// of shared variables they exchange values through. Units refer to each
/// other by name; the scope keeps reference counts so a shared variable
/// lives exactly as long as some compiled program declares or imports it.
pub struct Scope {
    globals: Globals,
    shared: SharedTable,
    units: BTreeMap<Rc<str>, Unit>,
    /// Units currently running, outermost first.
    active: Vec<Rc<str>>,
}

impl Default for Scope {
    fn default() -> Self {
        Scope::new()
    }
}

impl Scope {
    pub fn new() -> Scope {
        let mut globals = Globals::default();
        globals.add_typedef("Natural", Type::Integer);
        globals.add_typedef("Real", Type::Real);
        globals.add_typedef("Vector", Type::Vector);
        globals.add_typedef("Matrix", Type::Matrix);
        globals.add_typedef("Text", Type::Text);
        globals.add_constant("true", Val::Integer(1));
        globals.add_constant("false", Val::Integer(0));
        globals.add_constant("pi", Val::Real(std::f32::consts::PI));
        for function in library() {
            globals.add_function(function);
        }
        Scope {
            globals,
            shared: SharedTable::new(),
            units: BTreeMap::new(),
            active: vec![],
        }
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn add_function(&mut self, function: Rc<dyn Function>) {
        self.globals.add_function(function);
    }

    pub fn add_constant(&mut self, name: &str, val: Val) {
        self.globals.add_constant(name, val);
    }

    /// Registers a host global. Scripts reach it with `import name;`. The
    /// host holds a reference for as long as the scope lives.
    /// Registering a name again with another type replaces the global;
    /// units importing the old one are recompiled on their next run.
    pub fn add_shared(&mut self, name: &str, ty: Type) -> SharedId {
        let previous = self.globals.shared(name);
        let id = self.shared.declare("", name, &ty);
        if previous != Some(id) {
            self.shared.acquire(&[id]);
            if let Some(old) = previous {
                self.shared.release(&[old]);
                self.shared.sweep();
                for unit in self.units.values_mut() {
                    if unit.program.as_ref().map_or(false, |p| p.references().contains(&old)) {
                        unit.stale = true;
                    }
                }
            }
        }
        self.globals.add_shared(name, id);
        id
    }

    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.units.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &Rc<str>> {
        self.units.keys()
    }

    /// Stores the text of a unit and compiles it. Unchanged text that
    /// already compiled is not compiled again. The checksum is a quick
    /// filter; a matching checksum is confirmed against the stored text.
    pub fn set_source(&mut self, name: &str, source: &str) -> Result<()> {
        let checksum = checksum_ieee(source.as_bytes());
        let unit = self.units.entry(name.into()).or_default();
        if unit.checksum == checksum && unit.source == source && !unit.stale {
            if let Some(error) = &unit.error {
                return Err(error.clone());
            }
            if unit.program.is_some() {
                return Ok(());
            }
        }
        unit.source = source.to_string();
        unit.checksum = checksum;
        self.compile(name)
    }

    pub fn compile(&mut self, name: &str) -> Result<()> {
        let source = match self.units.get(name) {
            Some(unit) => unit.source.clone(),
            None => return Err(error!(ScriptNotFound, name)),
        };
        let result = Compiler::new(name, &self.globals, &self.units, &mut self.shared).compile(&source);
        match result {
            Ok(program) => self.install(name, Rc::new(program)),
            Err(error) => {
                self.shared.sweep();
                debug!(unit = name, %error, "compile failed");
                if let Some(unit) = self.units.get_mut(name) {
                    unit.error = Some(error.clone());
                }
                Err(error)
            }
        }
    }

    fn install(&mut self, name: &str, program: Rc<Program>) -> Result<()> {
        self.shared.acquire(program.references());
        let old = self.units.get_mut(name).and_then(|u| u.program.take());
        if let Some(old) = &old {
            self.shared.release(old.references());
        }
        self.shared.sweep();
        let runner = Runner::new(program.clone(), &self.shared)?;
        if let Some(unit) = self.units.get_mut(name) {
            unit.program = Some(program);
            unit.runner = Some(runner);
            unit.error = None;
            unit.stale = false;
        }
        for (other, unit) in self.units.iter_mut() {
            let imports = unit.program.as_ref().map_or(false, |p| p.imports().contains(name));
            if **other != *name && imports {
                debug!(unit = %other, exporter = name, "marked stale");
                unit.stale = true;
            }
        }
        Ok(())
    }

    /// Compiles every unit that has no current program, retrying until a
    /// round makes no progress. Returns the units still failing.
    pub fn recompile_all(&mut self) -> Vec<(Rc<str>, Error)> {
        let mut pending: Vec<Rc<str>> = self
            .units
            .iter()
            .filter(|(_, u)| u.program.is_none() || u.error.is_some() || u.stale)
            .map(|(name, _)| name.clone())
            .collect();
        loop {
            let mut failed = vec![];
            let before = pending.len();
            for name in pending {
                if self.compile(&name).is_err() {
                    failed.push(name);
                }
            }
            pending = failed;
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }
        pending
            .into_iter()
            .filter_map(|name| {
                let error = self.units.get(&name)?.error.clone()?;
                Some((name, error))
            })
            .collect()
    }

    /// Runs a unit to completion, recompiling it first when something it
    /// imports has changed.
    pub fn run(&mut self, name: &str) -> Result<()> {
        let recompile = match self.units.get(name) {
            Some(unit) => unit.stale || unit.program.is_none(),
            None => return Err(error!(DispatchNotFound, name)),
        };
        if recompile {
            if let Err(e) = self.compile(name) {
                return Err(error!(CompilationFailed, name; &e.to_string()));
            }
        }
        let mut runner = match self.units.get_mut(name).and_then(|u| u.runner.take()) {
            Some(runner) => runner,
            None => return Err(error!(CyclicDispatch, name)),
        };
        self.active.push(name.into());
        let result = runner.run(self);
        self.active.pop();
        if let Some(unit) = self.units.get_mut(name) {
            if unit.runner.is_none() {
                unit.runner = Some(runner);
            }
        }
        if let Err(error) = &result {
            debug!(unit = name, %error, "run failed");
        }
        result
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let unit = match self.units.remove(name) {
            Some(unit) => unit,
            None => return false,
        };
        if let Some(program) = &unit.program {
            self.shared.release(program.references());
        }
        self.shared.sweep();
        for unit in self.units.values_mut() {
            if unit.program.as_ref().map_or(false, |p| p.imports().contains(name)) {
                unit.stale = true;
            }
        }
        true
    }

    /// Shared variables declared by a unit and their types.
    pub fn exports(&self, name: &str) -> Vec<(Rc<str>, Type)> {
        let exports = match self.units.exports(name) {
            Some(exports) => exports,
            None => return vec![],
        };
        exports
            .iter()
            .filter_map(|(name, id)| Some((name.clone(), self.shared.get(*id)?.ty.clone())))
            .collect()
    }

    pub fn subscript_relation(&self, top: &str, sub: &str) -> bool {
        self.units.subscript_relation(top, sub)
    }

    pub fn symbols(&self, name: &str) -> Option<&BTreeMap<Rc<str>, Symbol>> {
        self.units.get(name)?.program.as_ref().map(|p| p.symbols())
    }

    /// Current values of a unit's variables, locals and shared alike.
    pub fn values(&self, name: &str) -> Vec<(Rc<str>, Val)> {
        let unit = match self.units.get(name) {
            Some(unit) => unit,
            None => return vec![],
        };
        let (program, runner) = match (&unit.program, &unit.runner) {
            (Some(program), Some(runner)) => (program, runner),
            _ => return vec![],
        };
        program
            .symbols()
            .iter()
            .filter_map(|(name, symbol)| match symbol {
                Symbol::Variable(var) => {
                    runner.var().fetch(var.slot).ok().map(|val| (name.clone(), val))
                }
                _ => None,
            })
            .collect()
    }

    /// Value of a shared variable. Host globals have the empty owner.
    pub fn get_shared(&self, owner: &str, name: &str) -> Option<Val> {
        self.shared.value(self.shared.lookup(owner, name)?)
    }

    pub fn set_shared(&mut self, owner: &str, name: &str, val: Val) -> Result<()> {
        let entry = match self.shared.lookup(owner, name).and_then(|id| self.shared.get(id)) {
            Some(entry) => entry,
            None => return Err(error!(NotDeclared, name)),
        };
        if !entry.ty.assignable(&val.ty()) {
            return Err(error!(AssignmentMismatch, name));
        }
        entry.cell.borrow_mut().set(val, &[])
    }

    pub fn shared_refs(&self, owner: &str, name: &str) -> Option<usize> {
        self.shared.refs(owner, name)
    }

    pub fn shared_len(&self) -> usize {
        self.shared.len()
    }

    pub fn complete(&self, name: &str, source: &str, cursor: usize) -> Completion {
        complete::complete(name, &self.globals, &self.units, &self.shared, source, cursor)
    }
}

impl Context for Scope {
    fn dispatch(&mut self, script: &str) -> Result<()> {
        if self.active.iter().any(|name| **name == *script) {
            return Err(error!(CyclicDispatch, script));
        }
        if !self.units.contains_key(script) {
            return Err(error!(DispatchNotFound, script));
        }
        debug!(script, depth = self.active.len(), "dispatch");
        self.run(script).map_err(|e| match e.position() {
            Some(_) => e.in_script(script),
            None => e,
        })
    }
}
