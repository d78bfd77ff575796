use super::Detached;
use crate::lang::{ErrorCode, LrType, Position, Type};
use crate::mach::statement::Frame;
use crate::mach::{
    Kind, Link, Opcode, SharedTable, Slot, Stack, Statement, Target, Val, Var,
};

fn eval(link: Link) -> Result<Val, crate::lang::Error> {
    let statement = Statement::new(
        Kind::Assignment(Target::Slot { slot: 0, path: 0 }),
        link,
        Position::default(),
    )?;
    let mut var = Var::new(&[Slot::Local(Type::Real)], &SharedTable::new())?;
    let mut stack = Stack::new("test stack", statement.depth());
    let mut frame = Frame {
        var: &mut var,
        stack: &mut stack,
        functions: &[],
    };
    statement.exec(&mut frame, &mut Detached)?;
    var.fetch(0)
}

fn guard(link: &mut Link, cond: i32, val: f32) {
    let base = link.depth();
    link.immed(Val::Integer(cond)).unwrap();
    link.open_guard().unwrap();
    link.immed(Val::Real(val)).unwrap();
    link.close_guard().unwrap();
    link.set_depth(base);
}

#[test]
fn test_opcode_words() {
    let word = Opcode::Mul.encode(Some(LrType::MV));
    assert_eq!(Opcode::decode(word), Some((Opcode::Mul, LrType::MV)));
    assert_eq!(word >> 20, 0);
    assert_eq!(Opcode::Guard.operands(), 2);
    assert!(!Opcode::Var.is_typed());
}

#[test]
fn test_arithmetic() {
    let mut link = Link::new();
    link.immed(Val::Integer(3)).unwrap();
    link.immed(Val::Real(0.5)).unwrap();
    link.push(Opcode::Add, Some(LrType::IR), 2, 1).unwrap();
    assert_eq!(link.depth(), 1);
    assert_eq!(eval(link).unwrap(), Val::Real(3.5));
}

#[test]
fn test_division_by_zero() {
    let mut link = Link::new();
    link.immed(Val::Real(1.0)).unwrap();
    link.immed(Val::Integer(0)).unwrap();
    link.push(Opcode::Div, Some(LrType::RI), 2, 1).unwrap();
    assert!(eval(link).unwrap_err().is(ErrorCode::DivisionByZero));
}

#[test]
fn test_first_true_guard_wins() {
    let mut link = Link::new();
    guard(&mut link, 0, 1.0);
    guard(&mut link, 1, 2.0);
    guard(&mut link, 1, 3.0);
    link.set_depth(1);
    assert_eq!(eval(link).unwrap(), Val::Real(2.0));
}

#[test]
fn test_no_guard_taken() {
    let mut link = Link::new();
    guard(&mut link, 0, 1.0);
    guard(&mut link, 0, 2.0);
    link.set_depth(1);
    assert!(eval(link).unwrap_err().is(ErrorCode::NoValue));
}

#[test]
fn test_unclosed_guard() {
    let mut link = Link::new();
    link.immed(Val::Integer(1)).unwrap();
    link.open_guard().unwrap();
    assert!(link.finish().unwrap_err().is(ErrorCode::InternalError));
}

#[test]
fn test_literal_since() {
    let mut link = Link::new();
    link.immed(Val::Text("scene".into())).unwrap();
    assert_eq!(link.literal_since(0).as_deref(), Some("scene"));
    link.immed(Val::Text("x".into())).unwrap();
    link.push(Opcode::Add, Some(LrType::TT), 2, 1).unwrap();
    assert_eq!(link.literal_since(0), None);
}

#[test]
fn test_stack_limit() {
    let mut stack: Stack<i32> = Stack::new("tiny", 2);
    stack.push(1).unwrap();
    stack.push(2).unwrap();
    assert!(stack.push(3).unwrap_err().is(ErrorCode::StackOverflow));
    assert_eq!(stack.pop_2().unwrap(), (1, 2));
    assert!(stack.pop().unwrap_err().is(ErrorCode::InternalError));
}
