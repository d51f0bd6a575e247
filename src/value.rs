use std::{
    fmt::{self, Display, Formatter},
    ops::{Div, Mul, Neg, Sub},
};

use thiserror::Error;

use crate::{heap::Heap, object::ObjRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("Operand must be a number.")]
    Number,
    #[error("Operands must be numbers.")]
    Numbers,
    #[error("Operands must be two strings.")]
    Strings,
    #[error("Expected {expected} but found {found}.")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// A runtime value.
///
/// Objects are held by handle. The [`Heap`] that allocated them is their
/// only owner, so copying a `Value` never copies or frees the object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(f64),
    Obj(ObjRef),
}

impl Default for Value {
    fn default() -> Value {
        Value::Nil
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::Obj(_) => "object",
        }
    }

    fn mismatch(&self, expected: &'static str) -> TypeError {
        TypeError::Mismatch {
            expected,
            found: self.type_name(),
        }
    }

    /// Formats the value, resolving objects through `heap`.
    pub fn display<'a>(&self, heap: &'a Heap) -> ValueDisplay<'a> {
        ValueDisplay { value: *self, heap }
    }
}

impl Value {
    pub fn greater_than(self, other: Value) -> Result<Self, TypeError> {
        use Value::{Boolean, Number};

        if let (Number(l), Number(r)) = (self, other) {
            Ok(Boolean(l > r))
        } else {
            Err(TypeError::Numbers)
        }
    }

    pub fn less_than(self, other: Value) -> Result<Self, TypeError> {
        use Value::{Boolean, Number};

        if let (Number(l), Number(r)) = (self, other) {
            Ok(Boolean(l < r))
        } else {
            Err(TypeError::Numbers)
        }
    }

    pub fn add(self, other: Value) -> Result<Self, TypeError> {
        use Value::Number;
        match (self, other) {
            (Number(l), Number(r)) => Ok(Number(l + r)),
            _ => Err(TypeError::Numbers),
        }
    }
}

impl Sub for Value {
    type Output = Result<Self, TypeError>;
    fn sub(self, rhs: Self) -> Self::Output {
        use Value::Number;
        match (self, rhs) {
            (Number(l), Number(r)) => Ok(Number(l - r)),
            _ => Err(TypeError::Numbers),
        }
    }
}

impl Mul for Value {
    type Output = Result<Self, TypeError>;
    fn mul(self, rhs: Self) -> Self::Output {
        use Value::Number;
        match (self, rhs) {
            (Number(l), Number(r)) => Ok(Number(l * r)),
            _ => Err(TypeError::Numbers),
        }
    }
}

// IEEE-754 semantics: x / 0.0 is an infinity or NaN, never an error.
impl Div for Value {
    type Output = Result<Self, TypeError>;
    fn div(self, rhs: Self) -> Self::Output {
        use Value::Number;
        match (self, rhs) {
            (Number(l), Number(r)) => Ok(Number(l / r)),
            _ => Err(TypeError::Numbers),
        }
    }
}

impl Neg for Value {
    type Output = Result<Self, TypeError>;
    fn neg(self) -> Self::Output {
        match self {
            Value::Number(n) => Ok(Value::Number(-n)),
            _ => Err(TypeError::Number),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl Value {
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    pub fn as_bool(&self) -> Result<bool, TypeError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            _ => Err(self.mismatch("boolean")),
        }
    }

    pub fn is_falsey(&self) -> bool {
        self.is_nil() || matches!(self, Value::Boolean(false))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Number(f)
    }
}

impl Value {
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn as_number(&self) -> Result<f64, TypeError> {
        match self {
            Value::Number(n) => Ok(*n),
            _ => Err(self.mismatch("number")),
        }
    }
}

impl From<ObjRef> for Value {
    fn from(obj: ObjRef) -> Self {
        Value::Obj(obj)
    }
}

impl Value {
    pub fn is_obj(&self) -> bool {
        matches!(self, Value::Obj(_))
    }

    pub fn as_obj(&self) -> Result<ObjRef, TypeError> {
        match self {
            Value::Obj(obj) => Ok(*obj),
            _ => Err(self.mismatch("object")),
        }
    }
}

pub struct ValueDisplay<'a> {
    value: Value,
    heap: &'a Heap,
}

impl Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.value {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Obj(obj) => match self.heap.get(obj) {
                Ok(obj) => write!(f, "{}", obj),
                Err(_) => write!(f, "<dangling {}>", obj),
            },
        }
    }
}
