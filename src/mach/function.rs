use super::Val;
use crate::error;
use crate::lang::{Error, Type};
use nalgebra::{Matrix3, Matrix4, Rotation3, Unit, Vector3, Vector4};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Services a running script can ask of its host.
pub trait Context {
    /// Runs another compiled script to completion.
    fn dispatch(&mut self, script: &str) -> Result<()>;
}

/// ## Host function contract
///
/// `execute` reads exactly `args().len()` values from `vals` starting at
/// `offset` and returns one value.
pub trait Function {
    fn name(&self) -> &str;
    fn args(&self) -> &[Type];
    fn ret(&self) -> Type;
    fn execute(&self, vals: &[Val], offset: usize, ctx: &mut dyn Context) -> Result<Val>;
}

pub type Body = fn(&[Val]) -> Result<Val>;

/// A host function backed by a plain function pointer.
pub struct Builtin {
    name: &'static str,
    args: Vec<Type>,
    ret: Type,
    body: Body,
}

impl Builtin {
    pub fn new(name: &'static str, args: Vec<Type>, ret: Type, body: Body) -> Rc<dyn Function> {
        Rc::new(Builtin {
            name,
            args,
            ret,
            body,
        })
    }
}

fn arguments<'a>(name: &str, vals: &'a [Val], offset: usize, arity: usize) -> Result<&'a [Val]> {
    match vals.get(offset..offset + arity) {
        Some(args) => Ok(args),
        None => Err(error!(InternalError, name; "missing arguments")),
    }
}

impl Function for Builtin {
    fn name(&self) -> &str {
        self.name
    }
    fn args(&self) -> &[Type] {
        &self.args
    }
    fn ret(&self) -> Type {
        self.ret.clone()
    }
    fn execute(&self, vals: &[Val], offset: usize, _ctx: &mut dyn Context) -> Result<Val> {
        let args = arguments(self.name, vals, offset, self.args.len())?;
        (self.body)(args)
    }
}

/// `dispatch(name)` runs the named script and yields zero.
pub struct Dispatcher {
    args: [Type; 1],
}

impl Dispatcher {
    pub const NAME: &'static str = "dispatch";

    pub fn new() -> Rc<dyn Function> {
        Rc::new(Dispatcher { args: [Type::Text] })
    }
}

impl Function for Dispatcher {
    fn name(&self) -> &str {
        Dispatcher::NAME
    }
    fn args(&self) -> &[Type] {
        &self.args
    }
    fn ret(&self) -> Type {
        Type::Integer
    }
    fn execute(&self, vals: &[Val], offset: usize, ctx: &mut dyn Context) -> Result<Val> {
        let args = arguments(Dispatcher::NAME, vals, offset, 1)?;
        let script = args[0].text()?;
        ctx.dispatch(&script)?;
        Ok(Val::Integer(0))
    }
}

fn failure(name: &str, msg: &str) -> Error {
    error!(HostFailure, name; msg)
}

fn xyz(v: &Vector4<f32>) -> Vector3<f32> {
    Vector3::new(v[0], v[1], v[2])
}

fn direction(v: Vector3<f32>) -> Vector4<f32> {
    Vector4::new(v[0], v[1], v[2], 0.0)
}

fn rotation(args: &[Val]) -> Result<Val> {
    let degrees = args[0].real()?;
    let axis = xyz(&args[1].vector()?);
    if axis.norm() == 0.0 {
        return Err(failure("rotation", "zero length axis"));
    }
    let rot = Rotation3::from_axis_angle(&Unit::new_normalize(axis), degrees.to_radians());
    Ok(Val::Matrix(rot.to_homogeneous()))
}

fn normalize(args: &[Val]) -> Result<Val> {
    let v = args[0].vector()?;
    let n = xyz(&v).norm();
    if n == 0.0 {
        return Err(failure("normalize", "zero length vector"));
    }
    Ok(Val::Vector(Vector4::new(v[0] / n, v[1] / n, v[2] / n, v[3])))
}

/// Cofactor matrix of the upper 3x3, used to carry normals through a
/// transform.
fn normal_transform(args: &[Val]) -> Result<Val> {
    let m = args[0].matrix()?;
    let a = Vector3::new(m[(0, 0)], m[(1, 0)], m[(2, 0)]);
    let b = Vector3::new(m[(0, 1)], m[(1, 1)], m[(2, 1)]);
    let c = Vector3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]);
    let cof = Matrix3::from_columns(&[b.cross(&c), c.cross(&a), a.cross(&b)]);
    Ok(Val::Matrix(cof.to_homogeneous()))
}

/// Mirror through the plane with the given normal passing through a point.
fn reflection(args: &[Val]) -> Result<Val> {
    let n = xyz(&args[0].vector()?);
    let p = xyz(&args[1].vector()?);
    if n.norm() == 0.0 {
        return Err(failure("reflection", "zero length normal"));
    }
    let n = n.normalize();
    let r = Matrix3::identity() - n * n.transpose() * 2.0;
    let t = n * (2.0 * n.dot(&p));
    let mut m = r.to_homogeneous();
    m[(0, 3)] = t[0];
    m[(1, 3)] = t[1];
    m[(2, 3)] = t[2];
    Ok(Val::Matrix(m))
}

fn inverse(args: &[Val]) -> Result<Val> {
    match args[0].matrix()?.try_inverse() {
        Some(m) => Ok(Val::Matrix(m)),
        None => Err(failure("inverse", "singular matrix")),
    }
}

macro_rules! real_fn {
    ($name:expr, $f:expr) => {
        Builtin::new($name, vec![Type::Real], Type::Real, |args| {
            let f: fn(f32) -> f32 = $f;
            Ok(Val::Real(f(args[0].real()?)))
        })
    };
}

/// Functions every scope starts with.
pub fn library() -> Vec<Rc<dyn Function>> {
    use Type::*;
    vec![
        real_fn!("sin", f32::sin),
        real_fn!("cos", f32::cos),
        real_fn!("tan", f32::tan),
        real_fn!("asin", f32::asin),
        real_fn!("acos", f32::acos),
        real_fn!("atan", f32::atan),
        real_fn!("exp", f32::exp),
        real_fn!("log", f32::ln),
        real_fn!("log10", f32::log10),
        real_fn!("sqrt", f32::sqrt),
        real_fn!("abs", f32::abs),
        real_fn!("ceil", f32::ceil),
        real_fn!("floor", f32::floor),
        real_fn!("sinh", f32::sinh),
        real_fn!("cosh", f32::cosh),
        real_fn!("tanh", f32::tanh),
        Builtin::new("vec", vec![Real, Real, Real, Real], Vector, |args| {
            Ok(Val::Vector(Vector4::new(
                args[0].real()?,
                args[1].real()?,
                args[2].real()?,
                args[3].real()?,
            )))
        }),
        Builtin::new("mat", vec![Vector, Vector, Vector, Vector], Matrix, |args| {
            Ok(Val::Matrix(Matrix4::from_columns(&[
                args[0].vector()?,
                args[1].vector()?,
                args[2].vector()?,
                args[3].vector()?,
            ])))
        }),
        Builtin::new("rotation", vec![Real, Vector], Matrix, rotation),
        Builtin::new("translation", vec![Vector], Matrix, |args| {
            Ok(Val::Matrix(Matrix4::new_translation(&xyz(&args[0].vector()?))))
        }),
        Builtin::new("scaling", vec![Real, Real, Real], Matrix, |args| {
            let s = Vector3::new(args[0].real()?, args[1].real()?, args[2].real()?);
            Ok(Val::Matrix(Matrix4::new_nonuniform_scaling(&s)))
        }),
        Builtin::new("normalize", vec![Vector], Vector, normalize),
        Builtin::new("normal_transform", vec![Matrix], Matrix, normal_transform),
        Builtin::new("reflection", vec![Vector, Vector], Matrix, reflection),
        Builtin::new("length", vec![Vector], Real, |args| {
            Ok(Val::Real(xyz(&args[0].vector()?).norm()))
        }),
        Builtin::new("dot", vec![Vector, Vector], Real, |args| {
            Ok(Val::Real(xyz(&args[0].vector()?).dot(&xyz(&args[1].vector()?))))
        }),
        Builtin::new("cross", vec![Vector, Vector], Vector, |args| {
            let c = xyz(&args[0].vector()?).cross(&xyz(&args[1].vector()?));
            Ok(Val::Vector(direction(c)))
        }),
        Builtin::new("transpose", vec![Matrix], Matrix, |args| {
            Ok(Val::Matrix(args[0].matrix()?.transpose()))
        }),
        Builtin::new("inverse", vec![Matrix], Matrix, inverse),
        Builtin::new("random", vec![], Real, |_| Ok(Val::Real(rand::random::<f32>()))),
        Dispatcher::new(),
    ]
}
