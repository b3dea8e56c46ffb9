/// Common surface every phase error implements so the driver can render
/// any of them as a labeled source span without matching on each phase's
/// concrete error type.
///
/// Each phase (lexer, parser, IR module) defines its own error enum with
/// `impl fmt::Display` and `impl std::error::Error`, the way the rest of
/// this compiler's error types are written; this trait only adds the
/// position and a short machine-readable code on top of that.
pub trait Diagnostic: std::error::Error {
    /// 1-based source row the error should be underlined at.
    fn row(&self) -> u32;
    /// 1-based source column the error should be underlined at.
    fn col(&self) -> u32;
    /// Short stable code, e.g. `"E0201"`, shown alongside the message.
    fn code(&self) -> &'static str;
}
