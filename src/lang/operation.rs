use super::{Error, Type};
use crate::mach::Opcode;

type Result<T> = std::result::Result<T, Error>;

/// ## Operand type pair
///
/// One of 25 combinations of the base types Integer, Real, Vector,
/// Matrix and Text, numbered `left * 5 + right`. The tag is stored in
/// the instruction word so the machine can pick the typed implementation
/// without inspecting values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LrType(u8);

const LETTERS: [char; 5] = ['I', 'R', 'V', 'M', 'T'];

impl LrType {
    pub const COUNT: usize = 25;
    pub const II: LrType = LrType(0);
    pub const IR: LrType = LrType(1);
    pub const RI: LrType = LrType(5);
    pub const RR: LrType = LrType(6);
    pub const VI: LrType = LrType(10);
    pub const VV: LrType = LrType(12);
    pub const MI: LrType = LrType(15);
    pub const MV: LrType = LrType(17);
    pub const MM: LrType = LrType(18);
    pub const TT: LrType = LrType(24);

    pub fn new(left: &Type, right: &Type) -> Option<LrType> {
        let l = left.base_index()?;
        let r = right.base_index()?;
        Some(LrType((l * 5 + r) as u8))
    }

    pub fn from_index(index: u32) -> Option<LrType> {
        if (index as usize) < LrType::COUNT {
            Some(LrType(index as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for LrType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let l = LETTERS[self.index() / 5];
        let r = LETTERS[self.index() % 5];
        write!(f, "{}{}", l, r)
    }
}

/// ## Operator catalog
///
/// Every operator knows which operand types it accepts and what type it
/// produces. Unary operators are checked with their operand given as both
/// left and right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Equal,
    NotEqual,
    And,
    Or,
    BitAnd,
    BitOr,
    Negate,
    Sign,
    Not,
    Take,
    Member,
}

impl Operation {
    pub fn name(self) -> &'static str {
        use Operation::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Less => "<",
            Greater => ">",
            LessEq => "<=",
            GreaterEq => ">=",
            Equal => "==",
            NotEqual => "!=",
            And => "&&",
            Or => "||",
            BitAnd => "&",
            BitOr => "|",
            Negate => "negation",
            Sign => "sign",
            Not => "!",
            Take => "[]",
            Member => ".",
        }
    }

    pub fn opcode(self) -> Opcode {
        use Operation::*;
        match self {
            Add => Opcode::Add,
            Sub => Opcode::Sub,
            Mul => Opcode::Mul,
            Div => Opcode::Div,
            Less => Opcode::Less,
            Greater => Opcode::Greater,
            LessEq => Opcode::LessEq,
            GreaterEq => Opcode::GreaterEq,
            Equal => Opcode::Equal,
            NotEqual => Opcode::NotEqual,
            And => Opcode::And,
            Or => Opcode::Or,
            BitAnd => Opcode::BitAnd,
            BitOr => Opcode::BitOr,
            Negate => Opcode::Neg,
            Sign => Opcode::Sign,
            Not => Opcode::Not,
            Take => Opcode::Take,
            Member => Opcode::Member,
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Operation::Negate | Operation::Sign | Operation::Not)
    }

    fn check_base(self, left: &Type, right: &Type) -> Result<()> {
        if left.is_base() && right.is_base() {
            Ok(())
        } else {
            Err(error!(ExpectedBase, self.name()))
        }
    }

    pub fn check(self, left: &Type, right: &Type) -> Result<()> {
        use Operation::*;
        use Type::*;
        match self {
            Take => {
                if !matches!(right, Integer) {
                    return Err(error!(ExpectedInteger, self.name()));
                }
                match left {
                    Vector | Matrix | Array(_) => Ok(()),
                    _ => Err(error!(NotIndexable, &left.to_string())),
                }
            }
            Member => match (left, right) {
                (Record(rec), Selector(name)) => match rec.field(name) {
                    Some(_) => Ok(()),
                    None => Err(error!(NoMember, name)),
                },
                (_, Selector(name)) => Err(error!(NoMember, name)),
                _ => Err(error!(ExpressionMismatch, self.name())),
            },
            _ => {
                self.check_base(left, right)?;
                match self {
                    Less | Greater | LessEq | GreaterEq | Div => {
                        if left.is_numeric() && right.is_numeric() {
                            Ok(())
                        } else {
                            Err(error!(ExpectedNumeric, self.name()))
                        }
                    }
                    Equal | NotEqual => {
                        if left == right || (left.is_numeric() && right.is_numeric()) {
                            Ok(())
                        } else {
                            Err(error!(ExpressionMismatch, self.name()))
                        }
                    }
                    And | Or | BitAnd | BitOr | Not => {
                        if matches!(left, Integer) && matches!(right, Integer) {
                            Ok(())
                        } else {
                            Err(error!(ExpectedInteger, self.name()))
                        }
                    }
                    Add | Sub => match (left, right) {
                        (Text, Text) if self == Add => Ok(()),
                        (Text, _) | (_, Text) => Err(error!(ExpressionMismatch, self.name())),
                        _ if left == right || (left.is_numeric() && right.is_numeric()) => {
                            Ok(())
                        }
                        _ => Err(error!(ExpressionMismatch, self.name())),
                    },
                    Mul => match (left, right) {
                        (Text, _) | (_, Text) => Err(error!(ExpressionMismatch, self.name())),
                        (Vector, Vector) | (Vector, Matrix) => {
                            Err(error!(ExpressionMismatch, self.name()))
                        }
                        _ => Ok(()),
                    },
                    Negate | Sign => match left {
                        Text => Err(error!(ExpressionMismatch, self.name())),
                        _ => Ok(()),
                    },
                    Take | Member => Ok(()),
                }
            }
        }
    }

    /// Result type of an operand pair that passed `check`.
    pub fn result_type(self, left: &Type, right: &Type) -> Type {
        use Operation::*;
        use Type::*;
        match self {
            Less | Greater | LessEq | GreaterEq | Equal | NotEqual | And | Or | BitAnd
            | BitOr | Not => Integer,
            Add | Sub | Div => match right {
                Real => Real,
                _ => left.clone(),
            },
            Mul => match (left, right) {
                (_, Vector) | (_, Matrix) => right.clone(),
                (Integer, Real) | (Real, Integer) => Real,
                _ => left.clone(),
            },
            Negate | Sign => left.clone(),
            Take => left.element().unwrap_or(Null),
            Member => match (left, right) {
                (Record(rec), Selector(name)) => {
                    rec.field(name).map(|(_, t)| t.clone()).unwrap_or(Null)
                }
                _ => Null,
            },
        }
    }

    /// Operand tag baked into the instruction. Member access and array
    /// indexing have none.
    pub fn tag(self, left: &Type, right: &Type) -> Option<LrType> {
        LrType::new(left, right)
    }
}
