use std::rc::Rc;

/// Static type of a value, variable or expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Integer,
    Real,
    Vector,
    Matrix,
    Text,
    Array(Box<Type>),
    Record(Rc<RecordType>),
    /// Type of the empty list literal.
    Null,
    /// Names a record field while a member access is being resolved.
    Selector(Rc<str>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordType {
    fields: Vec<(Rc<str>, Type)>,
}

impl RecordType {
    pub fn new(fields: Vec<(Rc<str>, Type)>) -> RecordType {
        RecordType { fields }
    }

    /// Record type of a list literal. Fields are named by position.
    pub fn from_list(types: Vec<Type>) -> RecordType {
        RecordType {
            fields: types
                .into_iter()
                .enumerate()
                .map(|(i, t)| (Rc::from(i.to_string().as_str()), t))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[(Rc<str>, Type)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<(usize, &Type)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, (n, _))| &**n == name)
            .map(|(i, (_, t))| (i, t))
    }
}

impl Type {
    pub fn is_base(&self) -> bool {
        matches!(
            self,
            Type::Integer | Type::Real | Type::Vector | Type::Matrix | Type::Text
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Integer | Type::Real)
    }

    /// Position of a base type in the 5x5 operand table.
    pub fn base_index(&self) -> Option<u32> {
        match self {
            Type::Integer => Some(0),
            Type::Real => Some(1),
            Type::Vector => Some(2),
            Type::Matrix => Some(3),
            Type::Text => Some(4),
            _ => None,
        }
    }

    /// Whether a value of type `source` may be stored where `self` is
    /// expected.
    pub fn assignable(&self, source: &Type) -> bool {
        use Type::*;
        if let Null = source {
            return true;
        }
        match self {
            Integer => matches!(source, Integer),
            Real => matches!(source, Integer | Real),
            Vector => matches!(source, Vector),
            Matrix => matches!(source, Matrix),
            Text => matches!(source, Text),
            Array(elem) => match source {
                Array(other) => elem.assignable(other),
                Record(list) => list.fields().iter().all(|(_, t)| elem.assignable(t)),
                _ => false,
            },
            Record(rec) => match source {
                Record(other) => {
                    rec.len() == other.len()
                        && rec
                            .fields()
                            .iter()
                            .zip(other.fields().iter())
                            .all(|((_, l), (_, r))| l.assignable(r))
                }
                _ => false,
            },
            Null | Selector(_) => false,
        }
    }

    /// Type reached by indexing or selecting into `self`.
    pub fn element(&self) -> Option<Type> {
        match self {
            Type::Vector => Some(Type::Real),
            Type::Matrix => Some(Type::Vector),
            Type::Array(elem) => Some((**elem).clone()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Type::*;
        match self {
            Integer => write!(f, "Natural"),
            Real => write!(f, "Real"),
            Vector => write!(f, "Vector"),
            Matrix => write!(f, "Matrix"),
            Text => write!(f, "Text"),
            Array(elem) => write!(f, "{}[]", elem),
            Record(rec) => {
                write!(f, "record(")?;
                for (i, (name, t)) in rec.fields().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", t, name)?;
                }
                write!(f, ")")
            }
            Null => write!(f, "null"),
            Selector(name) => write!(f, ".{}", name),
        }
    }
}
