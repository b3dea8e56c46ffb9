//! AST-to-native-code pipeline for the Infix compiler: the [`generator`]
//! module walks the parsed AST to produce textual LLVM IR via `infix-ir`,
//! and [`link`] drives `llc`/`cc` to turn that IR into a native executable.

pub mod generator;
pub mod link;

pub use generator::Generator;
