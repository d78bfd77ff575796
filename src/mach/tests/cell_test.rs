use crate::lang::{ErrorCode, RecordType, Type};
use crate::mach::{Cell, Val, MAX_LIST_LEN};
use nalgebra::{Matrix4, Vector4};
use std::rc::Rc;

#[test]
fn test_defaults() {
    assert_eq!(Cell::create(&Type::Integer).value(), Val::Integer(0));
    assert_eq!(Cell::create(&Type::Text).value(), Val::Text("".into()));
    assert_eq!(
        Cell::create(&Type::Matrix).value(),
        Val::Matrix(Matrix4::identity())
    );
    assert_eq!(
        Cell::create(&Type::Array(Box::new(Type::Real))).value(),
        Val::List(vec![Val::Real(0.0)])
    );
}

#[test]
fn test_widening() {
    let mut cell = Cell::create(&Type::Real);
    cell.set(Val::Integer(3), &[]).unwrap();
    assert_eq!(cell.value(), Val::Real(3.0));
    let mut cell = Cell::create(&Type::Vector);
    cell.set(Val::Integer(7), &[2]).unwrap();
    assert_eq!(cell.get(&[2]).unwrap(), Val::Real(7.0));
}

#[test]
fn test_matrix_paths() {
    let mut cell = Cell::create(&Type::Matrix);
    cell.set(Val::Vector(Vector4::new(1.0, 2.0, 3.0, 4.0)), &[3])
        .unwrap();
    assert_eq!(cell.get(&[3, 1]).unwrap(), Val::Real(2.0));
    cell.set(Val::Real(9.0), &[0, 2]).unwrap();
    assert_eq!(
        cell.get(&[0]).unwrap(),
        Val::Vector(Vector4::new(1.0, 0.0, 9.0, 0.0))
    );
    assert!(cell.get(&[0, 0, 0]).unwrap_err().is(ErrorCode::PathTooLong));
    assert!(cell.get(&[4]).unwrap_err().is(ErrorCode::OutOfBounds));
}

#[test]
fn test_list_growth() {
    let mut cell = Cell::create(&Type::Array(Box::new(Type::Real)));
    cell.set(Val::Real(2.5), &[3]).unwrap();
    assert_eq!(
        cell.value(),
        Val::List(vec![
            Val::Real(0.0),
            Val::Real(0.0),
            Val::Real(0.0),
            Val::Real(2.5)
        ])
    );
    assert!(cell.get(&[4]).unwrap_err().is(ErrorCode::OutOfBounds));
    assert!(cell.get(&[-1]).unwrap_err().is(ErrorCode::OutOfBounds));
    let err = cell.set(Val::Real(1.0), &[MAX_LIST_LEN as i32]).unwrap_err();
    assert!(err.is(ErrorCode::OutOfBounds));
}

#[test]
fn test_whole_list_assignment() {
    let mut cell = Cell::create(&Type::Array(Box::new(Type::Real)));
    cell.set(Val::List(vec![Val::Integer(1), Val::Real(1.5)]), &[])
        .unwrap();
    assert_eq!(
        cell.value(),
        Val::List(vec![Val::Real(1.0), Val::Real(1.5)])
    );
    cell.set(Val::List(vec![]), &[]).unwrap();
    assert_eq!(cell.value(), Val::List(vec![]));
}

#[test]
fn test_record() {
    let ty = Type::Record(Rc::new(RecordType::new(vec![
        ("x".into(), Type::Real),
        ("name".into(), Type::Text),
    ])));
    let mut cell = Cell::create(&ty);
    cell.set(Val::Text("cube".into()), &[1]).unwrap();
    assert_eq!(
        cell.value(),
        Val::List(vec![Val::Real(0.0), Val::Text("cube".into())])
    );
    assert!(cell.set(Val::Real(1.0), &[1, 0]).unwrap_err().is(ErrorCode::PathTooLong));
}

#[test]
fn test_null_resets() {
    let mut cell = Cell::create(&Type::Vector);
    cell.set(Val::Vector(Vector4::new(1.0, 1.0, 1.0, 1.0)), &[])
        .unwrap();
    cell.set(Val::List(vec![]), &[]).unwrap();
    assert_eq!(cell.value(), Val::Vector(Vector4::zeros()));
    let mut cell = Cell::create(&Type::Integer);
    cell.set(Val::Integer(5), &[]).unwrap();
    cell.set(Val::List(vec![]), &[]).unwrap();
    assert_eq!(cell.value(), Val::Integer(0));
}

#[test]
fn test_scalar_rejects_path() {
    let cell = Cell::create(&Type::Integer);
    assert!(cell.get(&[0]).unwrap_err().is(ErrorCode::PathTooLong));
}
