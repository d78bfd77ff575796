use super::Val;
use crate::error;
use crate::lang::{Error, Type};
use nalgebra::{Matrix4, Vector4};
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// Arrays never grow past this many elements.
pub const MAX_LIST_LEN: usize = 1 << 16;

/// ## Variable storage
///
/// One cell kind per type category. Paths are sequences of indices into
/// vector components, matrix columns and elements, list items or record
/// fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i32),
    Real(f32),
    Text(std::rc::Rc<str>),
    Vector(Vector4<f32>),
    Matrix(Matrix4<f32>),
    List { template: Box<Cell>, items: Vec<Cell> },
    Record(Vec<Cell>),
}

fn index(i: i32, len: usize) -> Result<usize> {
    match usize::try_from(i) {
        Ok(i) if i < len => Ok(i),
        _ => Err(error!(OutOfBounds; &format!("index {} of {}", i, len))),
    }
}

fn path_too_long() -> Error {
    error!(PathTooLong)
}

impl Cell {
    pub fn create(ty: &Type) -> Cell {
        match ty {
            Type::Integer => Cell::Integer(0),
            Type::Real => Cell::Real(0.0),
            Type::Text => Cell::Text("".into()),
            Type::Vector => Cell::Vector(Vector4::zeros()),
            Type::Matrix => Cell::Matrix(Matrix4::identity()),
            Type::Array(elem) => {
                let template = Cell::create(elem);
                Cell::List {
                    items: vec![template.clone()],
                    template: Box::new(template),
                }
            }
            Type::Record(rec) => {
                Cell::Record(rec.fields().iter().map(|(_, t)| Cell::create(t)).collect())
            }
            Type::Null | Type::Selector(_) => Cell::Record(vec![]),
        }
    }

    pub fn value(&self) -> Val {
        match self {
            Cell::Integer(n) => Val::Integer(*n),
            Cell::Real(n) => Val::Real(*n),
            Cell::Text(s) => Val::Text(s.clone()),
            Cell::Vector(v) => Val::Vector(*v),
            Cell::Matrix(m) => Val::Matrix(*m),
            Cell::List { items, .. } => Val::List(items.iter().map(Cell::value).collect()),
            Cell::Record(fields) => Val::List(fields.iter().map(Cell::value).collect()),
        }
    }

    pub fn get(&self, path: &[i32]) -> Result<Val> {
        let (first, rest) = match path.split_first() {
            None => return Ok(self.value()),
            Some(split) => split,
        };
        match self {
            Cell::Integer(_) | Cell::Real(_) | Cell::Text(_) => Err(path_too_long()),
            Cell::Vector(v) => {
                if !rest.is_empty() {
                    return Err(path_too_long());
                }
                Ok(Val::Real(v[index(*first, 4)?]))
            }
            Cell::Matrix(m) => {
                let col = index(*first, 4)?;
                match rest {
                    [] => Ok(Val::Vector(m.column(col).into_owned())),
                    [row] => Ok(Val::Real(m[(index(*row, 4)?, col)])),
                    _ => Err(path_too_long()),
                }
            }
            Cell::List { items, .. } => items[index(*first, items.len())?].get(rest),
            Cell::Record(fields) => fields[index(*first, fields.len())?].get(rest),
        }
    }

    pub fn set(&mut self, val: Val, path: &[i32]) -> Result<()> {
        let (first, rest) = match path.split_first() {
            None => return self.assign(val),
            Some(split) => split,
        };
        match self {
            Cell::Integer(_) | Cell::Real(_) | Cell::Text(_) => Err(path_too_long()),
            Cell::Vector(v) => {
                if !rest.is_empty() {
                    return Err(path_too_long());
                }
                v[index(*first, 4)?] = val.real()?;
                Ok(())
            }
            Cell::Matrix(m) => {
                let col = index(*first, 4)?;
                match rest {
                    [] => {
                        m.set_column(col, &val.vector()?);
                        Ok(())
                    }
                    [row] => {
                        m[(index(*row, 4)?, col)] = val.real()?;
                        Ok(())
                    }
                    _ => Err(path_too_long()),
                }
            }
            Cell::List { template, items } => {
                let at = index(*first, MAX_LIST_LEN)?;
                while items.len() <= at {
                    items.push((**template).clone());
                }
                items[at].set(val, rest)
            }
            Cell::Record(fields) => {
                let len = fields.len();
                fields[index(*first, len)?].set(val, rest)
            }
        }
    }

    /// Stores a whole value. Integers widen into real cells and an empty
    /// list resets the cell.
    fn assign(&mut self, val: Val) -> Result<()> {
        if val.is_null() {
            self.clear();
            return Ok(());
        }
        match self {
            Cell::Integer(n) => *n = val.integer()?,
            Cell::Real(n) => *n = val.real()?,
            Cell::Text(s) => *s = val.text()?,
            Cell::Vector(v) => *v = val.vector()?,
            Cell::Matrix(m) => *m = val.matrix()?,
            Cell::List { template, items } => {
                let vals = match val {
                    Val::List(vals) => vals,
                    _ => return Err(error!(InternalError; "expected list value")),
                };
                if vals.len() > MAX_LIST_LEN {
                    return Err(error!(OutOfBounds; &format!("list of {}", vals.len())));
                }
                let mut cells = Vec::with_capacity(vals.len());
                for v in vals {
                    let mut cell = (**template).clone();
                    cell.assign(v)?;
                    cells.push(cell);
                }
                *items = cells;
            }
            Cell::Record(fields) => {
                let vals = match val {
                    Val::List(vals) if vals.len() == fields.len() => vals,
                    _ => return Err(error!(InternalError; "record shape mismatch")),
                };
                for (cell, v) in fields.iter_mut().zip(vals) {
                    cell.assign(v)?;
                }
            }
        }
        Ok(())
    }

    fn clear(&mut self) {
        match self {
            Cell::Integer(n) => *n = 0,
            Cell::Real(n) => *n = 0.0,
            Cell::Text(s) => *s = "".into(),
            Cell::Vector(v) => *v = Vector4::zeros(),
            Cell::Matrix(m) => *m = Matrix4::identity(),
            Cell::List { items, .. } => items.clear(),
            Cell::Record(fields) => fields.iter_mut().for_each(Cell::clear),
        }
    }
}
