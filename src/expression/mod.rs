//! Reaction expressions.
//!
//! A small JavaScript-flavoured language: literals, `$namespace.path` lookups, arithmetic,
//! comparisons, `&&`/`||` (returning an operand), `!` and `?:`. Paths are resolved through a
//! [`ResolveVariable`], so the same namespaces that back `{{ }}` templates are available here.

pub(crate) mod ast;
pub(crate) mod error;
pub(crate) mod eval;
pub(crate) mod lexer;
pub(crate) mod parser;

use crate::foundation::error::FormResult;
use crate::template::resolver::ResolveVariable;
use serde_json::Value;

/// A parsed reaction expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    src: String,
    ast: ast::Expr,
}

impl Expression {
    /// Parse `src`; a surrounding `{{ }}` is optional.
    pub fn parse(src: &str) -> FormResult<Self> {
        let ast = parser::parse_expr(src)?;
        Ok(Self {
            src: src.to_owned(),
            ast,
        })
    }

    /// Source text as given to [`Expression::parse`].
    pub fn source(&self) -> &str {
        &self.src
    }

    /// Evaluate against `resolver`. `Ok(None)` is undefined.
    pub fn evaluate<R>(&self, resolver: &R) -> FormResult<Option<Value>>
    where
        R: ResolveVariable + ?Sized,
    {
        eval::eval(&self.ast, resolver)
    }
}
