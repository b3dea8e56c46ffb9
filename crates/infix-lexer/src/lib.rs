// Infix lexer -- two-pass tokenizer for the Infix language.

mod cursor;
pub mod error;

use cursor::Cursor;
use infix_common::token::{CLOSE_BRACKETS, OPEN_BRACKETS, SEPARATORS};
use infix_common::{Token, TokenKind};

pub use error::{LexError, LexErrorKind};

/// Tokenize `source` into a finished, fully classified token stream.
///
/// Runs the first pass (character accumulation into raw runs, with
/// brackets/separators/strings handled immediately) and then the second
/// pass (reclassifying every `Unknown` run as `Null`, `Boolean`,
/// `Integer`, `Float`, or `Identifier`), so no `Unknown` token is ever
/// returned to a caller.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let raw = first_pass(source)?;
    Ok(raw.into_iter().map(reclassify).collect())
}

/// First pass: accumulate characters into runs, recognizing brackets,
/// separators, and string literals as they're encountered. Anything
/// else accumulates into an `Unknown` token until whitespace, a
/// bracket, or a separator flushes it.
fn first_pass(source: &str) -> Result<Vec<Token>, LexError> {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();
    let mut acc = String::new();
    let mut acc_row = 1;
    let mut acc_col = 1;

    macro_rules! flush {
        () => {
            if !acc.is_empty() {
                tokens.push(Token::new(TokenKind::Unknown, acc.clone(), acc_row, acc_col));
                acc.clear();
            }
        };
    }

    while let Some(c) = cursor.peek() {
        match c {
            '#' => {
                flush!();
                while let Some(c) = cursor.peek() {
                    if c == '\n' {
                        break;
                    }
                    cursor.advance();
                }
            }
            '"' => {
                flush!();
                let (row, col) = (cursor.row(), cursor.col());
                cursor.advance(); // opening quote
                let mut value = String::new();
                loop {
                    match cursor.peek() {
                        None => return Err(LexError::new(LexErrorKind::UnterminatedString, row, col)),
                        Some('"') => {
                            cursor.advance();
                            break;
                        }
                        Some(c) => {
                            value.push(c);
                            cursor.advance();
                        }
                    }
                }
                tokens.push(Token::new(TokenKind::String, value, row, col));
            }
            c if c.is_whitespace() => {
                flush!();
                cursor.advance();
            }
            c if OPEN_BRACKETS.contains(&c) || CLOSE_BRACKETS.contains(&c) => {
                flush!();
                let (row, col) = (cursor.row(), cursor.col());
                cursor.advance();
                tokens.push(Token::new(TokenKind::Bracket, c.to_string(), row, col));
            }
            c if SEPARATORS.contains(&c) => {
                flush!();
                let (row, col) = (cursor.row(), cursor.col());
                cursor.advance();
                tokens.push(Token::new(TokenKind::Identifier, c.to_string(), row, col));
            }
            c => {
                if acc.is_empty() {
                    acc_row = cursor.row();
                    acc_col = cursor.col();
                }
                acc.push(c);
                cursor.advance();
            }
        }
    }
    flush!();

    Ok(tokens)
}

/// Second pass: reclassify one `Unknown` token (leaving non-`Unknown`
/// tokens, i.e. brackets/separators/strings, untouched).
fn reclassify(token: Token) -> Token {
    if token.kind != TokenKind::Unknown {
        return token;
    }
    let kind = match token.value.as_str() {
        "null" => TokenKind::Null,
        "true" | "false" => TokenKind::Boolean,
        v if v.parse::<i64>().is_ok() => TokenKind::Integer,
        v if v.parse::<f64>().is_ok() => TokenKind::Float,
        _ => TokenKind::Identifier,
    };
    Token { kind, ..token }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_literals() {
        assert_eq!(kinds("null true false 1 1.5 foo"), vec![
            TokenKind::Null,
            TokenKind::Boolean,
            TokenKind::Boolean,
            TokenKind::Integer,
            TokenKind::Float,
            TokenKind::Identifier,
        ]);
    }

    #[test]
    fn brackets_and_separators_flush_immediately() {
        let toks = tokenize("foo(1,2)").unwrap();
        let values: Vec<_> = toks.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["foo", "(", "1", ",", "2", ")"]);
        assert_eq!(toks[1].kind, TokenKind::Bracket);
        assert_eq!(toks[3].kind, TokenKind::Identifier);
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(kinds("1 # a comment\n2"), vec![TokenKind::Integer, TokenKind::Integer]);
    }

    #[test]
    fn strings_are_not_reclassified() {
        let toks = tokenize(r#""hello""#).unwrap();
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].value, "hello");
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize(r#""hello"#).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!((err.row, err.col), (1, 1));
    }

    #[test]
    fn positions_track_rows_and_columns() {
        let toks = tokenize("a\nbb").unwrap();
        assert_eq!((toks[0].row, toks[0].col), (1, 1));
        assert_eq!((toks[1].row, toks[1].col), (2, 1));
    }

    #[test]
    fn semicolon_and_comma_are_identifier_kind() {
        let toks = tokenize(", ;").unwrap();
        assert!(toks.iter().all(|t| t.kind == TokenKind::Identifier));
    }
}
