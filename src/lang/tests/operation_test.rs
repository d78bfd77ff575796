use crate::lang::{ErrorCode, LrType, Operation, RecordType, Type};
use std::rc::Rc;

#[test]
fn test_arithmetic_results() {
    use Operation::*;
    use Type::*;
    assert_eq!(Add.result_type(&Integer, &Integer), Integer);
    assert_eq!(Add.result_type(&Integer, &Real), Real);
    assert_eq!(Sub.result_type(&Real, &Integer), Real);
    assert_eq!(Div.result_type(&Integer, &Integer), Integer);
    assert_eq!(Mul.result_type(&Real, &Vector), Vector);
    assert_eq!(Mul.result_type(&Vector, &Real), Vector);
    assert_eq!(Mul.result_type(&Matrix, &Vector), Vector);
    assert_eq!(Mul.result_type(&Integer, &Real), Real);
    assert_eq!(Add.result_type(&Text, &Text), Text);
}

#[test]
fn test_multiply_rules() {
    use Operation::*;
    use Type::*;
    assert!(Mul.check(&Real, &Vector).is_ok());
    assert!(Mul.check(&Matrix, &Matrix).is_ok());
    assert!(Mul.check(&Vector, &Vector).unwrap_err().is(ErrorCode::ExpressionMismatch));
    assert!(Mul.check(&Vector, &Matrix).is_err());
    assert!(Mul.check(&Text, &Integer).is_err());
}

#[test]
fn test_check_errors() {
    use Operation::*;
    use Type::*;
    assert!(Less.check(&Vector, &Real).unwrap_err().is(ErrorCode::ExpectedNumeric));
    assert!(And.check(&Real, &Integer).unwrap_err().is(ErrorCode::ExpectedInteger));
    assert!(Add.check(&Text, &Integer).unwrap_err().is(ErrorCode::ExpressionMismatch));
    assert!(Sub.check(&Text, &Text).is_err());
    assert!(Add.check(&Array(Box::new(Real)), &Real).unwrap_err().is(ErrorCode::ExpectedBase));
    assert!(Equal.check(&Integer, &Real).is_ok());
    assert!(Equal.check(&Vector, &Matrix).is_err());
    assert!(Negate.check(&Text, &Text).is_err());
    assert!(Not.check(&Real, &Real).is_err());
}

#[test]
fn test_take_and_member() {
    use Operation::*;
    use Type::*;
    assert_eq!(Take.result_type(&Matrix, &Integer), Vector);
    assert!(Take.check(&Vector, &Real).unwrap_err().is(ErrorCode::ExpectedInteger));
    assert!(Take.check(&Text, &Integer).unwrap_err().is(ErrorCode::NotIndexable));
    let rec = Record(Rc::new(RecordType::new(vec![("w".into(), Real)])));
    assert!(Member.check(&rec, &Selector("w".into())).is_ok());
    assert_eq!(Member.result_type(&rec, &Selector("w".into())), Real);
    let err = Member.check(&rec, &Selector("q".into())).unwrap_err();
    assert!(err.is(ErrorCode::NoMember));
    assert_eq!(err.to_string(), "q is not a member.");
}

#[test]
fn test_lr_type() {
    use Type::*;
    assert_eq!(LrType::new(&Integer, &Integer), Some(LrType::II));
    assert_eq!(LrType::new(&Matrix, &Vector), Some(LrType::MV));
    assert_eq!(LrType::new(&Text, &Text), Some(LrType::TT));
    assert_eq!(LrType::new(&Array(Box::new(Real)), &Integer), None);
    assert_eq!(LrType::TT.index(), 24);
    assert_eq!(LrType::from_index(25), None);
    assert_eq!(LrType::RI.to_string(), "RI");
}
