//! Named struct fields: a type signature plus a default-value policy.

use crate::arch::TypeTable;
use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

/// An owned field value. Cloning always yields an independent duplicate, so
/// defaults handed out from the same policy never alias each other.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Uint(u64),
    Int(i64),
    Float(f64),
    Bytes(Vec<u8>),
    Str(String),
    List(Vec<Value>),
}

/// Field map of one struct instance, keyed by member name.
pub type Fields = BTreeMap<String, Value>;

/// Shape of one member: a lone scalar, a fixed-count array, or a
/// variable-count range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSig {
    Scalar(String),
    Array(String, usize),
    Range(String, Range<usize>),
}

impl TypeSig {
    pub fn type_name(&self) -> &str {
        match self {
            TypeSig::Scalar(name) | TypeSig::Array(name, _) | TypeSig::Range(name, _) => name,
        }
    }

    /// Fixed byte size under `table`, or `None` for variable-count members.
    /// Resolving the type name may fail like any table lookup.
    pub fn byte_size(&self, table: &TypeTable) -> Result<Option<usize>> {
        let scalar = table.get(self.type_name())?;
        Ok(match self {
            TypeSig::Scalar(_) => Some(scalar.size as usize),
            TypeSig::Array(_, count) => Some(scalar.size as usize * count),
            TypeSig::Range(..) => None,
        })
    }
}

/// How a member obtains its value when the owning struct is built without an
/// explicit one.
pub enum DefaultPolicy {
    /// A fixed value, duplicated fresh for every struct instance.
    Static(Value),
    /// Computed from nothing each time.
    Generate(Box<dyn Fn() -> Value>),
    /// Computed from the owning struct instance each time.
    GenerateWith(Box<dyn Fn(&Fields) -> Value>),
}

impl fmt::Debug for DefaultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultPolicy::Static(value) => f.debug_tuple("Static").field(value).finish(),
            DefaultPolicy::Generate(_) => f.write_str("Generate(..)"),
            DefaultPolicy::GenerateWith(_) => f.write_str("GenerateWith(..)"),
        }
    }
}

/// One named field of a struct layout.
#[derive(Debug)]
pub struct Member {
    pub name: String,
    pub sig: TypeSig,
    default: DefaultPolicy,
}

impl Member {
    pub fn new(name: impl Into<String>, sig: TypeSig, default: DefaultPolicy) -> Self {
        Member {
            name: name.into(),
            sig,
            default,
        }
    }

    /// Evaluates the default policy for one struct instance.
    ///
    /// Called once per instance construction and never cached: a static
    /// default comes back as a fresh duplicate every time, and generators run
    /// on every call.
    pub fn default_value(&self, owner: &Fields) -> Value {
        match &self.default {
            DefaultPolicy::Static(value) => value.clone(),
            DefaultPolicy::Generate(generate) => generate(),
            DefaultPolicy::GenerateWith(generate) => generate(owner),
        }
    }
}
