use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::llvm::Llvm;
use crate::types::Type;

/// A named SSA register or global, carrying the `Type` that resolves
/// its LLVM representation. `value` is set for compile-time constants
/// (global variables); it's `None` for a register produced by an
/// instruction.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub value: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty, value: None }
    }

    pub fn with_value(name: impl Into<String>, ty: Type, value: impl Into<String>) -> Self {
        Self { name: name.into(), ty, value: Some(value.into()) }
    }

    pub fn is_void(&self) -> bool {
        self.ty.name == "%void"
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            None => write!(f, "{{{}: {}}}", self.name, self.ty.to_llvm_ir()),
            Some(v) => write!(f, "{{{}: {} = {}}}", self.name, self.ty.to_llvm_ir(), v),
        }
    }
}

/// An emission target: either a user/built-in function with its own
/// private instruction buffer and local scope, or the implicit `@main`
/// the driver emits the top-level block into.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub llvm: Llvm,
    pub args: IndexMap<String, Variable>,
    pub rtype: Type,
    pub variables: HashMap<String, Variable>,
    pub internal: bool,
    pub used: bool,
}

impl Function {
    pub fn new(name: impl Into<String>, rtype: Type) -> Self {
        Self {
            name: name.into(),
            llvm: Llvm::new(),
            args: IndexMap::new(),
            rtype,
            variables: HashMap::new(),
            internal: false,
            used: false,
        }
    }
}

/// A declared `extern` C function: name, return type, and argument
/// types (an arg type of `%vararg` marks a C varargs tail).
#[derive(Debug, Clone)]
pub struct External {
    pub name: String,
    pub rtype: Type,
    pub args: Vec<Type>,
}
