// Infix parser -- bracket- and separator-driven recursive descent that
// normalizes every construct into `(op, [left, right])`, plus the
// synthetic `list` and `block` umbrella nodes.

pub mod ast;
pub mod error;

use infix_common::token::{matching_close, CLOSE_BRACKETS, OPEN_BRACKETS};
use infix_common::{Token, TokenKind};

pub use ast::{ExprType, Node};
pub use error::{ParseError, ParseErrorKind};

/// Parse a complete token stream into the root `block` node.
pub fn parse(tokens: Vec<Token>) -> Result<Node, ParseError> {
    let mut parser = Parser::new(tokens);
    let (node, _) = parser.region(None)?;
    Ok(node)
}

/// One term accumulated in the current region: either a raw token
/// (operator or literal, not yet wrapped into a leaf node) or a node
/// produced by a nested bracketed region.
enum Term {
    Tok(Token),
    Node(Node),
}

impl Term {
    fn into_node(self) -> Node {
        match self {
            Term::Tok(t) => Node::leaf(t),
            Term::Node(n) => n,
        }
    }
}

#[derive(PartialEq, Clone, Copy)]
enum Sep {
    Comma,
    Semicolon,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Parse one bracket-delimited region (or, at the top level, the
    /// whole token stream with `open == None`). Returns the node that
    /// represents the region and whether it was closed by a comma
    /// (i.e. produced a `list`) so the caller can tell a `list` apart
    /// from a `block`/single expression without re-inspecting it.
    fn region(&mut self, open: Option<char>) -> Result<(Node, bool), ParseError> {
        let mut statements: Vec<Node> = Vec::new();
        let mut expr: Vec<Term> = Vec::new();
        let mut sep: Option<Sep> = None;

        while let Some(token) = self.peek().cloned() {
            let ch = token.value.chars().next().filter(|_| token.value.chars().count() == 1);

            if token.kind == TokenKind::Bracket && ch.is_some_and(|c| OPEN_BRACKETS.contains(&c)) {
                let open_ch = ch.unwrap();

                // Call sugar: `name(args)` where `name` is the sole
                // leading term of this statement desugars to the
                // binary form `name(left, right)` that every other
                // operator application already has -- one arg supplies
                // `right` with an implicit `void` `left`, two args
                // supply `left` and `right` directly. An identifier
                // that already has something before it (an infix
                // operator's left operand, or another operator) is
                // left alone; `(` just closes a normal sub-expression.
                let call_name = if open_ch == '(' && expr.len() == 1 {
                    match &expr[0] {
                        Term::Tok(t) if t.kind == TokenKind::Identifier => Some(t.clone()),
                        _ => None,
                    }
                } else {
                    None
                };

                self.pos += 1;
                let (child, _) = self.region(Some(open_ch))?;
                self.pos += 1; // skip the matching close bracket

                if let Some(name) = call_name {
                    expr.pop();
                    let (left, right) = if child.is_list() {
                        let mut args = child.children;
                        match args.len() {
                            1 => (Node::void(name.row, name.col), args.remove(0)),
                            2 => {
                                let right = args.remove(1);
                                let left = args.remove(0);
                                (left, right)
                            }
                            _ => (Node::void(name.row, name.col), Node::list(child.token, args)),
                        }
                    } else {
                        (Node::void(name.row, name.col), child)
                    };
                    expr.push(Term::Node(Node::binary(name, left, right)));
                } else {
                    expr.push(Term::Node(child));
                }
                continue;
            }

            if token.kind == TokenKind::Bracket && ch.is_some_and(|c| CLOSE_BRACKETS.contains(&c)) {
                let close_ch = ch.unwrap();
                let expected = open.and_then(matching_close);
                if expected != Some(close_ch) {
                    return match open {
                        Some(o) => Err(ParseError::new(
                            ParseErrorKind::MismatchedBracket {
                                expected: matching_close(o).unwrap(),
                                found: close_ch,
                            },
                            token.row,
                            token.col,
                        )),
                        None => Err(ParseError::new(
                            ParseErrorKind::UnmatchedBracket { found: close_ch },
                            token.row,
                            token.col,
                        )),
                    };
                }
                return self.close_region(statements, expr, sep, &token);
            }

            if token.is_char(',') {
                match sep {
                    None | Some(Sep::Comma) => sep = Some(Sep::Comma),
                    Some(Sep::Semicolon) => {
                        return Err(ParseError::new(ParseErrorKind::MixedSeparators, token.row, token.col))
                    }
                }
                self.pos += 1;
                continue;
            }

            if token.is_char(';') {
                match sep {
                    None | Some(Sep::Semicolon) => {
                        sep = Some(Sep::Semicolon);
                        let node = self.build_binary(expr, &token)?;
                        statements.push(node);
                        expr = Vec::new();
                    }
                    Some(Sep::Comma) => {
                        return Err(ParseError::new(ParseErrorKind::MixedSeparators, token.row, token.col))
                    }
                }
                self.pos += 1;
                continue;
            }

            expr.push(Term::Tok(token));
            self.pos += 1;
        }

        // End of input: only the top-level (unbracketed) region reaches
        // here without having returned from the close-bracket branch.
        if !expr.is_empty() {
            let last_token = match expr.last().unwrap() {
                Term::Tok(t) => t.clone(),
                Term::Node(n) => n.token.clone(),
            };
            let node = self.build_binary(expr, &last_token)?;
            statements.push(node);
        }
        let block_token = Token::new(TokenKind::Identifier, "block", 1, 1);
        Ok((Node::block(block_token, statements), false))
    }

    /// Finish a region once its matching close bracket has been found.
    fn close_region(
        &mut self,
        mut statements: Vec<Node>,
        expr: Vec<Term>,
        sep: Option<Sep>,
        close_token: &Token,
    ) -> Result<(Node, bool), ParseError> {
        match sep {
            None => match expr.len() {
                0 => Ok((Node::void(close_token.row, close_token.col), false)),
                1 => Ok((expr.into_iter().next().unwrap().into_node(), false)),
                _ => Ok((self.build_binary(expr, close_token)?, false)),
            },
            Some(Sep::Comma) => {
                let children: Vec<Node> = expr.into_iter().map(Term::into_node).collect();
                let list_token = Token::new(TokenKind::Identifier, "list", close_token.row, close_token.col);
                Ok((Node::list(list_token, children), true))
            }
            Some(Sep::Semicolon) => {
                // Every trailing term after the last `;` is itself one
                // more statement; fold it in before returning the block,
                // rather than discarding the earlier statements.
                if !expr.is_empty() {
                    let node = self.build_binary(expr, close_token)?;
                    statements.push(node);
                }
                let block_token = Token::new(TokenKind::Identifier, "block", close_token.row, close_token.col);
                Ok((Node::block(block_token, statements), false))
            }
        }
    }

    /// Right-fold `expr` into a single binary-operator node: pop right,
    /// op, left; wrap; push back; repeat until one term remains.
    fn build_binary(&self, mut expr: Vec<Term>, fallback_token: &Token) -> Result<Node, ParseError> {
        while expr.len() > 1 {
            if expr.len() < 3 {
                return Err(ParseError::new(
                    ParseErrorKind::InsufficientTerms,
                    fallback_token.row,
                    fallback_token.col,
                ));
            }
            let right = expr.pop().unwrap().into_node();
            let op = expr.pop().unwrap();
            let left = expr.pop().unwrap().into_node();

            let op_token = match op {
                Term::Tok(t) if t.kind == TokenKind::Identifier => t,
                Term::Tok(t) => return Err(ParseError::new(ParseErrorKind::ExpectedOperator, t.row, t.col)),
                Term::Node(n) => {
                    return Err(ParseError::new(ParseErrorKind::ExpectedOperator, n.token.row, n.token.col))
                }
            };

            expr.push(Term::Node(Node::binary(op_token, left, right)));
        }

        if expr.is_empty() {
            Ok(Node::void(fallback_token.row, fallback_token.col))
        } else {
            Ok(expr.into_iter().next().unwrap().into_node())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infix_lexer::tokenize;

    fn parse_src(src: &str) -> Node {
        parse(tokenize(src).unwrap()).unwrap()
    }

    #[test]
    fn single_binary_expression() {
        let ast = parse_src("1 + 2;");
        assert_eq!(ast.children.len(), 1);
        let stmt = &ast.children[0];
        assert_eq!(stmt.token.value, "+");
        assert_eq!(stmt.children[0].token.value, "1");
        assert_eq!(stmt.children[1].token.value, "2");
    }

    #[test]
    fn nested_parens_produce_single_child() {
        let ast = parse_src("(1 + 2);");
        let stmt = &ast.children[0];
        assert_eq!(stmt.token.value, "+");
    }

    #[test]
    fn list_node_from_commas() {
        let ast = parse_src("print(1, 2, 3);");
        let call = &ast.children[0];
        assert_eq!(call.token.value, "print");
        let list = &call.children[1];
        assert!(list.is_list());
        assert_eq!(list.children.len(), 3);
    }

    #[test]
    fn nested_block_keeps_all_statements() {
        // Regression: a `;`-separated block used as a nested expression
        // (e.g. a `repeat` body) must retain every statement, not just
        // the last one.
        let ast = parse_src("repeat(i < 3, {print(i); i = i + 1});");
        let call = &ast.children[0];
        assert_eq!(call.token.value, "repeat");
        let body = &call.children[1];
        assert!(body.is_block());
        assert_eq!(body.children.len(), 2);
    }

    #[test]
    fn empty_parens_is_void() {
        let ast = parse_src("x = ();");
        let assign = &ast.children[0];
        assert_eq!(assign.children[1].expr_type, ExprType::Void);
    }

    #[test]
    fn mismatched_bracket_is_an_error() {
        let err = parse(tokenize("(1 + 2}").unwrap()).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MismatchedBracket { .. }));
    }

    #[test]
    fn mixed_separators_is_an_error() {
        let err = parse(tokenize("(1, 2; 3)").unwrap()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MixedSeparators);
    }

    #[test]
    fn insufficient_terms_is_an_error() {
        let err = parse(tokenize("(1 2)").unwrap()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InsufficientTerms);
    }
}
