use crate::expression::ast::{BinaryOp, Expr, UnaryOp};
use crate::expression::error::ExprError;
use crate::expression::lexer::{Span, Token, TokenKind, lex};
use crate::foundation::value::number_value;
use serde_json::Value;

/// Parse one expression. A single surrounding `{{ }}` pair is accepted and stripped.
pub(crate) fn parse_expr(src: &str) -> Result<Expr, ExprError> {
    let src = src.trim();
    let src = src
        .strip_prefix("{{")
        .and_then(|s| s.strip_suffix("}}"))
        .unwrap_or(src);
    let tokens = lex(src)?;
    let mut p = Parser { tokens, pos: 0 };
    let expr = p.parse_conditional()?;
    p.expect(TokenKind::Eof)?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> &Token {
        let t = &self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn span(&self) -> Span {
        self.peek().span
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ExprError> {
        if self.peek().kind == kind {
            self.bump();
            Ok(())
        } else {
            Err(ExprError::new(
                self.span().start,
                format!("expected {kind:?}, found {:?}", self.peek().kind),
            ))
        }
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn parse_conditional(&mut self) -> Result<Expr, ExprError> {
        let cond = self.parse_or()?;
        if !self.consume(TokenKind::Question) {
            return Ok(cond);
        }
        let then = self.parse_conditional()?;
        self.expect(TokenKind::Colon)?;
        let otherwise = self.parse_conditional()?;
        Ok(Expr::Cond {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn binary_level(
        &mut self,
        ops: &[(TokenKind, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, ExprError>,
    ) -> Result<Expr, ExprError> {
        let mut e = next(self)?;
        'outer: loop {
            for (kind, op) in ops {
                if self.consume(kind.clone()) {
                    let r = next(self)?;
                    e = Expr::Binary {
                        op: *op,
                        left: Box::new(e),
                        right: Box::new(r),
                    };
                    continue 'outer;
                }
            }
            break;
        }
        Ok(e)
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        self.binary_level(&[(TokenKind::OrOr, BinaryOp::Or)], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        self.binary_level(&[(TokenKind::AndAnd, BinaryOp::And)], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Expr, ExprError> {
        self.binary_level(
            &[
                (TokenKind::EqEqEq, BinaryOp::StrictEq),
                (TokenKind::NeEq, BinaryOp::StrictNe),
                (TokenKind::EqEq, BinaryOp::Eq),
                (TokenKind::Ne, BinaryOp::Ne),
            ],
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        self.binary_level(
            &[
                (TokenKind::Lt, BinaryOp::Lt),
                (TokenKind::Le, BinaryOp::Le),
                (TokenKind::Gt, BinaryOp::Gt),
                (TokenKind::Ge, BinaryOp::Ge),
            ],
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> Result<Expr, ExprError> {
        self.binary_level(
            &[
                (TokenKind::Plus, BinaryOp::Add),
                (TokenKind::Minus, BinaryOp::Sub),
            ],
            Self::parse_factor,
        )
    }

    fn parse_factor(&mut self) -> Result<Expr, ExprError> {
        self.binary_level(
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::Percent, BinaryOp::Mod),
            ],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.consume(TokenKind::Minus) {
            let e = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(e),
            });
        }
        if self.consume(TokenKind::Bang) {
            let e = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(e),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExprError> {
        let mut e = self.parse_primary()?;

        while self.consume(TokenKind::Dot) {
            let t = self.bump().clone();
            let segment = match t.kind {
                TokenKind::Ident(s) => s,
                TokenKind::Number(n) if n.fract() == 0.0 && n >= 0.0 => format!("{}", n as u64),
                other => {
                    return Err(ExprError::new(
                        t.span.start,
                        format!("expected property name after '.', found {other:?}"),
                    ));
                }
            };
            e = match e {
                Expr::Path(mut segments) => {
                    segments.push(segment);
                    Expr::Path(segments)
                }
                _ => {
                    return Err(ExprError::new(
                        t.span.start,
                        "member access base must be an identifier path",
                    ));
                }
            };
        }

        Ok(e)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let t = self.bump().clone();
        match t.kind {
            TokenKind::Number(v) => Ok(Expr::Lit(number_value(v))),
            TokenKind::Str(s) => Ok(Expr::Lit(Value::String(s))),
            TokenKind::True => Ok(Expr::Lit(Value::Bool(true))),
            TokenKind::False => Ok(Expr::Lit(Value::Bool(false))),
            TokenKind::Null => Ok(Expr::Lit(Value::Null)),
            TokenKind::Undefined => Ok(Expr::Undefined),
            TokenKind::Ident(s) => Ok(Expr::Path(vec![s])),
            TokenKind::LParen => {
                let e = self.parse_conditional()?;
                self.expect(TokenKind::RParen)?;
                Ok(e)
            }
            other => Err(ExprError::new(
                t.span.start,
                format!("unexpected token {other:?}"),
            )),
        }
    }
}
