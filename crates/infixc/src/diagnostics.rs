//! Renders any phase's [`Diagnostic`] as a labeled source span via
//! `ariadne`, rather than a bare `Debug` dump.

use std::path::Path;

use ariadne::{Label, Report, ReportKind, Source};
use infix_common::{Diagnostic, LineIndex};

pub fn report<E: Diagnostic>(path: &Path, source: &str, err: &E) {
    let index = LineIndex::new(source);
    let start = index.offset(err.row(), err.col()) as usize;
    let end = (start + 1).min(source.len().max(1));

    let _ = Report::<std::ops::Range<usize>>::build(ReportKind::Error, start..end)
        .with_message(format!("{} [{}] in {}", err, err.code(), path.display()))
        .with_label(Label::new(start..end).with_message(err.to_string()))
        .finish()
        .eprint(Source::from(source));
}

#[cfg(test)]
mod tests {
    use super::*;
    use infix_lexer::tokenize;

    #[test]
    fn reports_a_lex_error_without_panicking() {
        let src = "x = \"unterminated";
        let err = tokenize(src).unwrap_err();
        report(Path::new("test.ifx"), src, &err);
    }
}
