use std::fmt;

/// Declared type of a handler parameter or binding-model field
///
/// The scalar tags are the only types the coercion table knows how to build
/// from a raw string. Everything else is `Other`, carrying the type's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 64-bit floating point
    Double,
    /// Boolean
    Bool,
    /// String, passed through untouched
    Str,
    /// Context object or binding model, by type name
    Other(&'static str),
}

impl TypeTag {
    /// Whether values of this type can be produced by coercion
    #[inline]
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        !matches!(self, TypeTag::Other(_))
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Long => "long",
            TypeTag::Double => "double",
            TypeTag::Bool => "boolean",
            TypeTag::Str => "string",
            TypeTag::Other(name) => name,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A coerced scalar value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Double(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Int(_) => TypeTag::Int,
            Value::Long(_) => TypeTag::Long,
            Value::Double(_) => TypeTag::Double,
            Value::Bool(_) => TypeTag::Bool,
            Value::Str(_) => TypeTag::Str,
        }
    }
}

/// Rust types that map onto a scalar [`TypeTag`]
///
/// Implemented for `i32`, `i64`, `f64`, `bool` and `String`. Path variables and
/// binding-model fields are restricted to these types.
pub trait Scalar: Sized + Send + 'static {
    /// Tag used for coercion
    const TAG: TypeTag;

    /// Unwrap a coerced value, `None` if it holds a different type
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! scalar {
    ($ty:ty, $tag:ident) => {
        impl Scalar for $ty {
            const TAG: TypeTag = TypeTag::$tag;

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$tag(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

scalar!(i32, Int);
scalar!(i64, Long);
scalar!(f64, Double);
scalar!(bool, Bool);
scalar!(String, Str);
