use crate::lang::{RecordType, Type};
use std::rc::Rc;

fn record(fields: &[(&str, Type)]) -> Type {
    Type::Record(Rc::new(RecordType::new(
        fields.iter().map(|(n, t)| (Rc::from(*n), t.clone())).collect(),
    )))
}

fn list(types: &[Type]) -> Type {
    Type::Record(Rc::new(RecordType::from_list(types.to_vec())))
}

#[test]
fn test_scalars() {
    use Type::*;
    assert!(Real.assignable(&Integer));
    assert!(!Integer.assignable(&Real));
    assert!(Vector.assignable(&Vector));
    assert!(!Vector.assignable(&Matrix));
    assert!(!Text.assignable(&Integer));
}

#[test]
fn test_null_goes_anywhere() {
    use Type::*;
    for ty in &[Integer, Real, Vector, Matrix, Text, Array(Box::new(Real)), Null] {
        assert!(ty.assignable(&Null), "{}", ty);
    }
    assert!(!Null.assignable(&Integer));
}

#[test]
fn test_arrays() {
    use Type::*;
    let reals = Array(Box::new(Real));
    assert!(reals.assignable(&Array(Box::new(Integer))));
    assert!(!Array(Box::new(Integer)).assignable(&reals));
    assert!(reals.assignable(&list(&[Integer, Real, Integer])));
    assert!(!reals.assignable(&list(&[Integer, Text])));
}

#[test]
fn test_records() {
    use Type::*;
    let point = record(&[("x", Real), ("y", Real)]);
    assert!(point.assignable(&list(&[Integer, Real])));
    assert!(!point.assignable(&list(&[Real])));
    assert!(point.assignable(&record(&[("a", Real), ("b", Integer)])));
    assert!(!point.assignable(&list(&[Text, Real])));
}

#[test]
fn test_fields_and_elements() {
    use Type::*;
    let point = RecordType::new(vec![("x".into(), Real), ("name".into(), Text)]);
    assert_eq!(point.field("name"), Some((1, &Text)));
    assert_eq!(point.field("z"), None);
    assert_eq!(Vector.element(), Some(Real));
    assert_eq!(Matrix.element(), Some(Vector));
    assert_eq!(Array(Box::new(Text)).element(), Some(Text));
    assert_eq!(Integer.element(), None);
}

#[test]
fn test_display() {
    use Type::*;
    assert_eq!(Integer.to_string(), "Natural");
    assert_eq!(Array(Box::new(Array(Box::new(Real)))).to_string(), "Real[][]");
    assert_eq!(
        record(&[("p", Vector), ("n", Integer)]).to_string(),
        "record(Vector p, Natural n)"
    );
    assert_eq!(list(&[Real, Text]).to_string(), "record(Real 0, Text 1)");
}
