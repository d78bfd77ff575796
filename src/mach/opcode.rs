use crate::lang::LrType;

/// ## Virtual machine instruction set
///
/// The machine has no registers. Every operation works on the evaluation
/// stack of the statement being executed.
///
/// An instruction is one 32-bit word: the opcode in the low 12 bits and
/// the operand type tag in the next 8. Some opcodes are followed by raw
/// operand words.
///
/// For example: `a = 3 * b;` with a Real `b` compiles to
/// `[IMMED, VAR 1, MUL.IR]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Push the next immediate value.
    Immed = 1,
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
    Not,
    /// Operands: function index, argument count.
    Fun,
    /// Operand: variable slot.
    Var,
    /// Vector component or matrix column by runtime index.
    Take,
    Neg,
    /// Operands: code length and immediate count of the guarded value.
    Guard,
    BitOr,
    BitAnd,
    Sign,
    /// Operand: field index.
    Member,
    /// Array element by runtime index.
    Index,
    /// Operand: element count.
    List,
    Vector,
    Matrix,
}

const ALL: [Opcode; 27] = [
    Opcode::Immed,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Equal,
    Opcode::NotEqual,
    Opcode::Less,
    Opcode::LessEq,
    Opcode::Greater,
    Opcode::GreaterEq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Fun,
    Opcode::Var,
    Opcode::Take,
    Opcode::Neg,
    Opcode::Guard,
    Opcode::BitOr,
    Opcode::BitAnd,
    Opcode::Sign,
    Opcode::Member,
    Opcode::Index,
    Opcode::List,
    Opcode::Vector,
    Opcode::Matrix,
];

const OPCODE_MASK: u32 = 0xfff;
const TAG_SHIFT: u32 = 12;
const TAG_MASK: u32 = 0xff;

impl Opcode {
    pub fn from_bits(bits: u32) -> Option<Opcode> {
        ALL.iter().copied().find(|op| *op as u32 == bits)
    }

    /// Number of raw operand words following the instruction.
    pub fn operands(self) -> usize {
        match self {
            Opcode::Var | Opcode::Member | Opcode::List => 1,
            Opcode::Fun | Opcode::Guard => 2,
            _ => 0,
        }
    }

    /// Whether the instruction carries a meaningful operand type tag.
    pub fn is_typed(self) -> bool {
        !matches!(
            self,
            Opcode::Immed
                | Opcode::Fun
                | Opcode::Var
                | Opcode::Guard
                | Opcode::Member
                | Opcode::Index
                | Opcode::List
                | Opcode::Vector
                | Opcode::Matrix
        )
    }

    pub fn encode(self, tag: Option<LrType>) -> u32 {
        let tag = tag.map_or(0, |t| t.index() as u32);
        (self as u32 & OPCODE_MASK) | ((tag & TAG_MASK) << TAG_SHIFT)
    }

    pub fn decode(word: u32) -> Option<(Opcode, LrType)> {
        let op = Opcode::from_bits(word & OPCODE_MASK)?;
        let tag = LrType::from_index((word >> TAG_SHIFT) & TAG_MASK)?;
        Some((op, tag))
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Opcode::*;
        let s = match self {
            Immed => "IMMED",
            Add => "ADD",
            Sub => "SUB",
            Mul => "MUL",
            Div => "DIV",
            Equal => "EQ",
            NotEqual => "NOTEQ",
            Less => "LT",
            LessEq => "LTEQ",
            Greater => "GT",
            GreaterEq => "GTEQ",
            And => "AND",
            Or => "OR",
            Not => "NOT",
            Fun => "FUN",
            Var => "VAR",
            Take => "TAKE",
            Neg => "NEG",
            Guard => "GUARD",
            BitOr => "BOR",
            BitAnd => "BAND",
            Sign => "SIGN",
            Member => "MEMBER",
            Index => "INDEX",
            List => "LIST",
            Vector => "VECTOR",
            Matrix => "MATRIX",
        };
        write!(f, "{}", s)
    }
}
