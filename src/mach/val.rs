use crate::error;
use crate::lang::{Error, RecordType, Type};
use nalgebra::{Matrix4, Vector4};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// ## Runtime value
///
/// Arrays and records share the `List` representation; the compiler
/// keeps track of which one a list is.
#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Integer(i32),
    Real(f32),
    Vector(Vector4<f32>),
    Matrix(Matrix4<f32>),
    Text(Rc<str>),
    List(Vec<Val>),
}

fn mismatch(expected: &str) -> Error {
    error!(InternalError; &format!("expected {} value", expected))
}

impl Val {
    pub fn integer(&self) -> Result<i32> {
        match self {
            Val::Integer(n) => Ok(*n),
            _ => Err(mismatch("integer")),
        }
    }

    /// Integers widen to reals.
    pub fn real(&self) -> Result<f32> {
        match self {
            Val::Integer(n) => Ok(*n as f32),
            Val::Real(n) => Ok(*n),
            _ => Err(mismatch("real")),
        }
    }

    pub fn vector(&self) -> Result<Vector4<f32>> {
        match self {
            Val::Vector(v) => Ok(*v),
            _ => Err(mismatch("vector")),
        }
    }

    pub fn matrix(&self) -> Result<Matrix4<f32>> {
        match self {
            Val::Matrix(m) => Ok(*m),
            _ => Err(mismatch("matrix")),
        }
    }

    pub fn text(&self) -> Result<Rc<str>> {
        match self {
            Val::Text(s) => Ok(s.clone()),
            _ => Err(mismatch("text")),
        }
    }

    pub fn list(&self) -> Result<&[Val]> {
        match self {
            Val::List(v) => Ok(v),
            _ => Err(mismatch("list")),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Val::List(v) if v.is_empty())
    }

    /// Static type of a literal value.
    pub fn ty(&self) -> Type {
        match self {
            Val::Integer(_) => Type::Integer,
            Val::Real(_) => Type::Real,
            Val::Vector(_) => Type::Vector,
            Val::Matrix(_) => Type::Matrix,
            Val::Text(_) => Type::Text,
            Val::List(v) if v.is_empty() => Type::Null,
            Val::List(v) => Type::Record(Rc::new(RecordType::from_list(
                v.iter().map(Val::ty).collect(),
            ))),
        }
    }
}

impl From<i32> for Val {
    fn from(n: i32) -> Val {
        Val::Integer(n)
    }
}

impl From<f32> for Val {
    fn from(n: f32) -> Val {
        Val::Real(n)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Val {
        Val::Text(s.into())
    }
}

impl From<Vector4<f32>> for Val {
    fn from(v: Vector4<f32>) -> Val {
        Val::Vector(v)
    }
}

impl From<Matrix4<f32>> for Val {
    fn from(m: Matrix4<f32>) -> Val {
        Val::Matrix(m)
    }
}

fn write_vector(f: &mut std::fmt::Formatter, v: &[f32]) -> std::fmt::Result {
    write!(f, "[")?;
    for (i, n) in v.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", n)?;
    }
    write!(f, "]")
}

impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Val::Integer(n) => write!(f, "{}", n),
            Val::Real(n) => write!(f, "{}", n),
            Val::Vector(v) => write_vector(f, v.as_slice()),
            Val::Matrix(m) => {
                write!(f, "[")?;
                for (i, col) in m.column_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_vector(f, &[col[0], col[1], col[2], col[3]])?;
                }
                write!(f, "]")
            }
            Val::Text(s) => write!(f, "{:?}", s),
            Val::List(v) => {
                write!(f, "{{")?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
        }
    }
}
