//! Native SQL expression AST.
//!
//! This is the structured output of the translator: every fragment the
//! compiler produces is an `Expr`, serialized only at the very end.
//! Exhaustive pattern matching is enforced by the compiler.

use super::dialect::SqlDialect;
use super::token::{Token, TokenStream};

// =============================================================================
// Expression AST
// =============================================================================

/// A native SQL expression.
///
/// Every variant must be handled in `to_tokens()` - the compiler enforces this.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference: optional_table.column
    Column {
        table: Option<String>,
        column: String,
    },

    /// Literal values
    Literal(Literal),

    /// Named parameter placeholder
    Param(String),

    /// Binary operation: left op right
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Unary operation: op expr
    UnaryOp { op: UnaryOperator, expr: Box<Expr> },

    /// Function call: name(args...)
    Function {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
    },

    /// CASE WHEN... THEN... ELSE... END
    Case {
        operand: Option<Box<Expr>>,
        when_clauses: Vec<(Expr, Expr)>,
        else_clause: Option<Box<Expr>>,
    },

    /// CAST(expr AS type)
    Cast { expr: Box<Expr>, data_type: String },

    /// IN: expr IN (values...)
    In {
        expr: Box<Expr>,
        values: Vec<Expr>,
        negated: bool,
    },

    /// IS NULL / IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },

    /// Wildcard: * or table.*
    Star { table: Option<String> },

    /// Parenthesized expression
    Paren(Box<Expr>),

    /// Raw SQL expression passed directly to output without escaping.
    ///
    /// # Security Warning
    ///
    /// **Never pass user input to this variant.** Only static keyword
    /// fragments (date part units) are emitted through it.
    Raw(String),
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    /// ISO date, `YYYY-MM-DD`
    Date(String),
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    // Logical
    And,
    Or,
    // Arithmetic
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    // String
    Concat,
    Like,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
}

impl Expr {
    /// `left op right`
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// `CAST(self AS data_type)`
    pub fn cast(self, data_type: impl Into<String>) -> Expr {
        Expr::Cast {
            expr: Box::new(self),
            data_type: data_type.into(),
        }
    }

    /// `CASE WHEN cond THEN then ELSE otherwise END`
    pub fn case_when(cond: Expr, then: Expr, otherwise: Expr) -> Expr {
        Expr::Case {
            operand: None,
            when_clauses: vec![(cond, then)],
            else_clause: Some(Box::new(otherwise)),
        }
    }

    /// Wrap in parentheses when this is a compound binary expression.
    pub fn nested(self) -> Expr {
        match self {
            Expr::BinaryOp { .. } | Expr::UnaryOp { .. } => Expr::Paren(Box::new(self)),
            other => other,
        }
    }

    /// Convert this expression to a token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        match self {
            Expr::Column { table, column } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Ident(column.clone()));
            }

            Expr::Literal(lit) => {
                ts.push(match lit {
                    Literal::Int(n) => Token::LitInt(*n),
                    Literal::Float(f) => Token::LitFloat(*f),
                    Literal::String(s) => Token::LitString(s.clone()),
                    Literal::Bool(b) => Token::LitBool(*b),
                    Literal::Date(d) => Token::LitDate(d.clone()),
                    Literal::Null => Token::LitNull,
                });
            }

            Expr::Param(name) => {
                ts.push(Token::Param(name.clone()));
            }

            Expr::BinaryOp { left, op, right } => {
                ts.append(&left.to_tokens());
                ts.space();
                ts.push(binary_op_to_token(*op));
                ts.space();
                ts.append(&right.to_tokens());
            }

            Expr::UnaryOp { op, expr } => match op {
                UnaryOperator::Not => {
                    ts.push(Token::Not).space();
                    ts.append(&expr.to_tokens());
                }
                UnaryOperator::Minus => {
                    ts.push(Token::Minus);
                    ts.append(&expr.to_tokens());
                }
            },

            Expr::Function {
                name,
                args,
                distinct,
            } => {
                ts.push(Token::FunctionName(name.clone()));
                ts.lparen();
                if *distinct {
                    ts.push(Token::Distinct).space();
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens());
                }
                ts.rparen();
            }

            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                ts.push(Token::Case);
                if let Some(op) = operand {
                    ts.space().append(&op.to_tokens());
                }
                for (when, then) in when_clauses {
                    ts.space().push(Token::When).space();
                    ts.append(&when.to_tokens());
                    ts.space().push(Token::Then).space();
                    ts.append(&then.to_tokens());
                }
                if let Some(else_expr) = else_clause {
                    ts.space().push(Token::Else).space();
                    ts.append(&else_expr.to_tokens());
                }
                ts.space().push(Token::End);
            }

            Expr::Cast { expr, data_type } => {
                ts.push(Token::Cast).lparen();
                ts.append(&expr.to_tokens());
                ts.space()
                    .push(Token::As)
                    .space()
                    .push(Token::TypeName(data_type.clone()))
                    .rparen();
            }

            Expr::In {
                expr,
                values,
                negated,
            } => {
                // "x IN ()" is invalid SQL; an empty list never matches
                if values.is_empty() {
                    ts.push(Token::LitInt(1))
                        .space()
                        .push(if *negated { Token::Eq } else { Token::Ne })
                        .space()
                        .push(Token::LitInt(1));
                } else {
                    ts.append(&expr.to_tokens());
                    if *negated {
                        ts.space().push(Token::Not);
                    }
                    ts.space().push(Token::In).space().lparen();
                    for (i, val) in values.iter().enumerate() {
                        if i > 0 {
                            ts.comma().space();
                        }
                        ts.append(&val.to_tokens());
                    }
                    ts.rparen();
                }
            }

            Expr::IsNull { expr, negated } => {
                ts.append(&expr.to_tokens());
                ts.space();
                ts.push(if *negated {
                    Token::IsNotNull
                } else {
                    Token::IsNull
                });
            }

            Expr::Star { table } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Star);
            }

            Expr::Paren(inner) => {
                ts.lparen();
                ts.append(&inner.to_tokens());
                ts.rparen();
            }

            Expr::Raw(sql) => {
                ts.push(Token::Raw(sql.clone()));
            }
        }

        ts
    }

    /// Render this expression for a dialect.
    pub fn to_sql(&self, dialect: &dyn SqlDialect) -> String {
        self.to_tokens().serialize(dialect)
    }
}

fn binary_op_to_token(op: BinaryOperator) -> Token {
    match op {
        BinaryOperator::Eq => Token::Eq,
        BinaryOperator::Ne => Token::Ne,
        BinaryOperator::Lt => Token::Lt,
        BinaryOperator::Gt => Token::Gt,
        BinaryOperator::Lte => Token::Lte,
        BinaryOperator::Gte => Token::Gte,
        BinaryOperator::And => Token::And,
        BinaryOperator::Or => Token::Or,
        BinaryOperator::Plus => Token::Plus,
        BinaryOperator::Minus => Token::Minus,
        BinaryOperator::Mul => Token::Mul,
        BinaryOperator::Div => Token::Div,
        BinaryOperator::Mod => Token::Mod,
        BinaryOperator::Concat => Token::Concat,
        BinaryOperator::Like => Token::Like,
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Column reference without table qualifier.
pub fn col(name: &str) -> Expr {
    Expr::Column {
        table: None,
        column: name.into(),
    }
}

/// Column reference with table qualifier.
pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

/// Integer literal.
pub fn lit_int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

/// String literal.
pub fn lit_str(s: &str) -> Expr {
    Expr::Literal(Literal::String(s.into()))
}

/// NULL literal.
pub fn lit_null() -> Expr {
    Expr::Literal(Literal::Null)
}

/// Function call.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
        distinct: false,
    }
}

/// Raw SQL fragment from a trusted static source.
pub fn raw_sql(sql: &str) -> Expr {
    Expr::Raw(sql.into())
}

/// Wildcard qualified by a table alias.
pub fn table_star(table: &str) -> Expr {
    Expr::Star {
        table: Some(table.into()),
    }
}

// =============================================================================
// Fluent API
// =============================================================================

/// Fluent combinators for building predicates.
pub trait ExprExt: Sized {
    fn eq(self, other: impl Into<Expr>) -> Expr;
    fn and(self, other: impl Into<Expr>) -> Expr;
    fn minus(self, other: impl Into<Expr>) -> Expr;
}

impl ExprExt for Expr {
    fn eq(self, other: impl Into<Expr>) -> Expr {
        Expr::binary(self, BinaryOperator::Eq, other.into())
    }

    fn and(self, other: impl Into<Expr>) -> Expr {
        Expr::binary(self, BinaryOperator::And, other.into())
    }

    fn minus(self, other: impl Into<Expr>) -> Expr {
        Expr::binary(self, BinaryOperator::Minus, other.into())
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        lit_int(n)
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        lit_int(n.into())
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        lit_str(s)
    }
}
