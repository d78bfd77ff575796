use super::{Opcode, Val};
use crate::error;
use crate::lang::{Error, LrType};
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

pub type Binary = fn(Val, Val) -> Result<Val>;
pub type Unary = fn(Val) -> Result<Val>;

type Table<F> = [Option<F>; LrType::COUNT];

// Operand pair positions, `left * 5 + right` over I R V M T.
const II: usize = 0;
const IR: usize = 1;
const IV: usize = 2;
const IM: usize = 3;
const RI: usize = 5;
const RR: usize = 6;
const RV: usize = 7;
const RM: usize = 8;
const VI: usize = 10;
const VR: usize = 11;
const VV: usize = 12;
const MI: usize = 15;
const MR: usize = 16;
const MV: usize = 17;
const MM: usize = 18;
const TT: usize = 24;

macro_rules! table {
    ($ty:ty; $($tag:ident => $f:expr),* $(,)?) => {{
        let mut t: Table<$ty> = [None; LrType::COUNT];
        $( t[$tag] = Some($f as $ty); )*
        t
    }};
}

macro_rules! binary {
    ($name:ident, $l:ident, $r:ident, |$a:ident, $b:ident| $body:expr) => {
        fn $name(lhs: Val, rhs: Val) -> Result<Val> {
            let $a = lhs.$l()?;
            let $b = rhs.$r()?;
            Ok(Val::from($body))
        }
    };
}

macro_rules! unary {
    ($name:ident, $v:ident, |$a:ident| $body:expr) => {
        fn $name(val: Val) -> Result<Val> {
            let $a = val.$v()?;
            Ok(Val::from($body))
        }
    };
}

fn truth(b: bool) -> i32 {
    b as i32
}

binary!(add_ii, integer, integer, |a, b| a.wrapping_add(b));
binary!(add_rr, real, real, |a, b| a + b);
binary!(add_vv, vector, vector, |a, b| a + b);
binary!(add_mm, matrix, matrix, |a, b| a + b);
fn add_tt(lhs: Val, rhs: Val) -> Result<Val> {
    let s = format!("{}{}", lhs.text()?, rhs.text()?);
    Ok(Val::from(s.as_str()))
}

binary!(sub_ii, integer, integer, |a, b| a.wrapping_sub(b));
binary!(sub_rr, real, real, |a, b| a - b);
binary!(sub_vv, vector, vector, |a, b| a - b);
binary!(sub_mm, matrix, matrix, |a, b| a - b);

binary!(mul_ii, integer, integer, |a, b| a.wrapping_mul(b));
binary!(mul_rr, real, real, |a, b| a * b);
binary!(mul_sv, real, vector, |a, b| b * a);
binary!(mul_sm, real, matrix, |a, b| b * a);
binary!(mul_vs, vector, real, |a, b| a * b);
binary!(mul_ms, matrix, real, |a, b| a * b);
binary!(mul_mv, matrix, vector, |a, b| a * b);
binary!(mul_mm, matrix, matrix, |a, b| a * b);

fn div_ii(lhs: Val, rhs: Val) -> Result<Val> {
    let (a, b) = (lhs.integer()?, rhs.integer()?);
    if b == 0 {
        return Err(error!(DivisionByZero));
    }
    Ok(Val::Integer(a.wrapping_div(b)))
}

fn div_rr(lhs: Val, rhs: Val) -> Result<Val> {
    let (a, b) = (lhs.real()?, rhs.real()?);
    if b == 0.0 {
        return Err(error!(DivisionByZero));
    }
    Ok(Val::Real(a / b))
}

binary!(lt_ii, integer, integer, |a, b| truth(a < b));
binary!(lt_rr, real, real, |a, b| truth(a < b));
binary!(gt_ii, integer, integer, |a, b| truth(a > b));
binary!(gt_rr, real, real, |a, b| truth(a > b));
binary!(le_ii, integer, integer, |a, b| truth(a <= b));
binary!(le_rr, real, real, |a, b| truth(a <= b));
binary!(ge_ii, integer, integer, |a, b| truth(a >= b));
binary!(ge_rr, real, real, |a, b| truth(a >= b));

binary!(eq_ii, integer, integer, |a, b| truth(a == b));
binary!(eq_rr, real, real, |a, b| truth(a == b));
binary!(eq_vv, vector, vector, |a, b| truth(a == b));
binary!(eq_mm, matrix, matrix, |a, b| truth(a == b));
binary!(eq_tt, text, text, |a, b| truth(a == b));
binary!(ne_ii, integer, integer, |a, b| truth(a != b));
binary!(ne_rr, real, real, |a, b| truth(a != b));
binary!(ne_vv, vector, vector, |a, b| truth(a != b));
binary!(ne_mm, matrix, matrix, |a, b| truth(a != b));
binary!(ne_tt, text, text, |a, b| truth(a != b));

binary!(and_ii, integer, integer, |a, b| truth(a != 0 && b != 0));
binary!(or_ii, integer, integer, |a, b| truth(a != 0 || b != 0));
binary!(band_ii, integer, integer, |a, b| a & b);
binary!(bor_ii, integer, integer, |a, b| a | b);

fn component(index: i32) -> Result<usize> {
    match usize::try_from(index) {
        Ok(i) if i < 4 => Ok(i),
        _ => Err(error!(OutOfRange; &format!("index {}", index))),
    }
}

fn take_vi(lhs: Val, rhs: Val) -> Result<Val> {
    let v = lhs.vector()?;
    Ok(Val::Real(v[component(rhs.integer()?)?]))
}

fn take_mi(lhs: Val, rhs: Val) -> Result<Val> {
    let m = lhs.matrix()?;
    Ok(Val::Vector(m.column(component(rhs.integer()?)?).into_owned()))
}

unary!(neg_i, integer, |a| a.wrapping_neg());
unary!(neg_r, real, |a| -a);
unary!(neg_v, vector, |a| -a);
unary!(neg_m, matrix, |a| -a);
unary!(not_i, integer, |a| truth(a == 0));

fn sign(val: Val) -> Result<Val> {
    Ok(val)
}

/// ## Typed operation tables
///
/// One table per opcode, 25 entries each. The compiler only emits tags
/// for which an entry exists.
pub struct Tables {
    add: Table<Binary>,
    sub: Table<Binary>,
    mul: Table<Binary>,
    div: Table<Binary>,
    lt: Table<Binary>,
    gt: Table<Binary>,
    le: Table<Binary>,
    ge: Table<Binary>,
    eq: Table<Binary>,
    ne: Table<Binary>,
    and: Table<Binary>,
    or: Table<Binary>,
    band: Table<Binary>,
    bor: Table<Binary>,
    take: Table<Binary>,
    neg: Table<Unary>,
    sign: Table<Unary>,
    not: Table<Unary>,
}

thread_local!(
    static TABLES: Tables = Tables::new();
);

impl Tables {
    fn new() -> Tables {
        Tables {
            add: table! { Binary;
                II => add_ii, IR => add_rr, RI => add_rr, RR => add_rr,
                VV => add_vv, MM => add_mm, TT => add_tt,
            },
            sub: table! { Binary;
                II => sub_ii, IR => sub_rr, RI => sub_rr, RR => sub_rr,
                VV => sub_vv, MM => sub_mm,
            },
            mul: table! { Binary;
                II => mul_ii, IR => mul_rr, RI => mul_rr, RR => mul_rr,
                IV => mul_sv, RV => mul_sv, IM => mul_sm, RM => mul_sm,
                VI => mul_vs, VR => mul_vs, MI => mul_ms, MR => mul_ms,
                MV => mul_mv, MM => mul_mm,
            },
            div: table! { Binary;
                II => div_ii, IR => div_rr, RI => div_rr, RR => div_rr,
            },
            lt: table! { Binary; II => lt_ii, IR => lt_rr, RI => lt_rr, RR => lt_rr },
            gt: table! { Binary; II => gt_ii, IR => gt_rr, RI => gt_rr, RR => gt_rr },
            le: table! { Binary; II => le_ii, IR => le_rr, RI => le_rr, RR => le_rr },
            ge: table! { Binary; II => ge_ii, IR => ge_rr, RI => ge_rr, RR => ge_rr },
            eq: table! { Binary;
                II => eq_ii, IR => eq_rr, RI => eq_rr, RR => eq_rr,
                VV => eq_vv, MM => eq_mm, TT => eq_tt,
            },
            ne: table! { Binary;
                II => ne_ii, IR => ne_rr, RI => ne_rr, RR => ne_rr,
                VV => ne_vv, MM => ne_mm, TT => ne_tt,
            },
            and: table! { Binary; II => and_ii },
            or: table! { Binary; II => or_ii },
            band: table! { Binary; II => band_ii },
            bor: table! { Binary; II => bor_ii },
            take: table! { Binary; VI => take_vi, MI => take_mi },
            neg: table! { Unary; II => neg_i, RR => neg_r, VV => neg_v, MM => neg_m },
            sign: table! { Unary; II => sign, RR => sign, VV => sign, MM => sign },
            not: table! { Unary; II => not_i },
        }
    }

    fn binary_table(&self, op: Opcode) -> Option<&Table<Binary>> {
        use Opcode::*;
        let table = match op {
            Add => &self.add,
            Sub => &self.sub,
            Mul => &self.mul,
            Div => &self.div,
            Less => &self.lt,
            Greater => &self.gt,
            LessEq => &self.le,
            GreaterEq => &self.ge,
            Equal => &self.eq,
            NotEqual => &self.ne,
            And => &self.and,
            Or => &self.or,
            BitAnd => &self.band,
            BitOr => &self.bor,
            Take => &self.take,
            _ => return None,
        };
        Some(table)
    }

    fn unary_table(&self, op: Opcode) -> Option<&Table<Unary>> {
        match op {
            Opcode::Neg => Some(&self.neg),
            Opcode::Sign => Some(&self.sign),
            Opcode::Not => Some(&self.not),
            _ => None,
        }
    }
}

fn missing(op: Opcode, tag: LrType) -> Error {
    error!(InternalError; &format!("no {} for {}", op, tag))
}

pub fn binary(op: Opcode, tag: LrType) -> Result<Binary> {
    TABLES.with(|t| {
        t.binary_table(op)
            .and_then(|table| table[tag.index()])
            .ok_or_else(|| missing(op, tag))
    })
}

pub fn unary(op: Opcode, tag: LrType) -> Result<Unary> {
    TABLES.with(|t| {
        t.unary_table(op)
            .and_then(|table| table[tag.index()])
            .ok_or_else(|| missing(op, tag))
    })
}

pub fn is_unary(op: Opcode) -> bool {
    matches!(op, Opcode::Neg | Opcode::Sign | Opcode::Not)
}
