pub mod error;
pub mod span;
pub mod token;

pub use error::Diagnostic;
pub use span::LineIndex;
pub use token::{Token, TokenKind};
