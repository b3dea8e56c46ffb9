use std::fmt;

/// A type known to the IR module: a name (`%i32`, `%list.i32`, ...), its
/// concrete LLVM representation, and whether that representation is a
/// primitive scalar (emitted inline) or a named aggregate (emitted as a
/// `%name = type ...` declaration).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    pub name: String,
    pub repr: String,
    pub primitive: bool,
}

impl Type {
    pub fn new(name: impl Into<String>, repr: impl Into<String>, primitive: bool) -> Self {
        Self { name: name.into(), repr: repr.into(), primitive }
    }

    /// The pointer-to-this-type, e.g. `%i32` -> `%i32.ptr` / `i32*`.
    pub fn ptr(&self) -> Type {
        Type::new(format!("{}.ptr", self.name), format!("{}*", self.repr), true)
    }

    pub fn to_llvm_ir(&self) -> &str {
        if self.primitive {
            &self.repr
        } else {
            &self.name
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
