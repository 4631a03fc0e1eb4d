//! Cut strings over table columns
//!
//! The grammar, loosest binding first:
//!
//! ```text
//! or         := and ("||" and)*
//! and        := comparison ("&&" comparison)*
//! comparison := sum (("<=" | ">=" | "==" | "!=" | "<" | ">") sum)*
//! sum        := product (("+" | "-") product)*
//! product    := unary (("*" | "/") unary)*
//! unary      := ("-" | "!") unary | primary
//! primary    := number | function "(" args ")" | column | "(" or ")"
//! ```
//!
//! Anything non-zero is true, comparisons and logical operators give `1.0`
//! or `0.0`.

// crate modules
use crate::error::{Error, Result};
use mutomo_grid::Table;
use mutomo_utils::f;

// nom parser combinators
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, char, digit1, multispace0};
use nom::combinator::{map, map_res, peek, recognize, value};
use nom::multi::{fold_many0, many0_count, separated_list0};
use nom::number::complete::recognize_float;
use nom::sequence::{delimited, pair, preceded};
use nom::IResult;

/// Parsed syntax, column names not yet resolved
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Number(f64),
    Column(String),
    Neg(Box<Node>),
    Not(Box<Node>),
    Binary(BinOp, Box<Node>, Box<Node>),
    Call(String, Vec<Node>),
}

/// Resolved syntax, columns replaced with row positions
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Var(usize),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
    Abs,
    Sqrt,
    Log,
    Exp,
    Pow,
    Min,
    Max,
}

impl Func {
    fn from_name(name: &str) -> Option<Self> {
        let func = match name {
            "abs" => Self::Abs,
            "sqrt" => Self::Sqrt,
            "log" => Self::Log,
            "exp" => Self::Exp,
            "pow" => Self::Pow,
            "min" => Self::Min,
            "max" => Self::Max,
            _ => return None,
        };
        Some(func)
    }

    fn arity(&self) -> usize {
        match self {
            Self::Pow | Self::Min | Self::Max => 2,
            _ => 1,
        }
    }
}

/// Compiled cut expression
///
/// ```rust
/// # use mutomo_region::CutExpr;
/// let cut = CutExpr::parse("((z*z)+(y*y)<(300*300))&&(x>-480)&&(x<480)").unwrap();
/// assert_eq!(cut.columns(), &["z", "y", "x"]);
///
/// // values in the order of columns()
/// assert!(cut.passes(&[0.0, 100.0, 0.0]));
/// assert!(!cut.passes(&[0.0, 300.0, 0.0]));
/// assert!(!cut.passes(&[0.0, 0.0, 480.0]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CutExpr {
    source: String,
    ast: Expr,
    columns: Vec<String>,
}

impl CutExpr {
    /// Parse a cut string
    pub fn parse(expression: &str) -> Result<Self> {
        let (remainder, node) =
            or_expr(expression).map_err(|e| Error::expression(expression, f!("{e:?}")))?;

        if !remainder.trim().is_empty() {
            return Err(Error::expression(
                expression,
                f!("unexpected input at \"{}\"", remainder.trim()),
            ));
        }

        let mut columns = Vec::new();
        let ast = resolve(node, &mut columns)
            .map_err(|reason| Error::expression(expression, reason))?;

        Ok(Self {
            source: expression.to_string(),
            ast,
            columns,
        })
    }

    /// Cut that accepts everything
    pub fn always() -> Self {
        Self {
            source: "1".to_string(),
            ast: Expr::Number(1.0),
            columns: Vec::new(),
        }
    }

    /// Original expression text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Columns used, in order of first appearance
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Evaluate with `row` holding one value per [column](CutExpr::columns)
    pub fn eval(&self, row: &[f64]) -> f64 {
        eval(&self.ast, row)
    }

    /// True if the expression is non-zero
    pub fn passes(&self, row: &[f64]) -> bool {
        self.eval(row) != 0.0
    }

    /// Evaluate against every row of a table
    ///
    /// Fails with `ColumnNotFound` if the table lacks any column used.
    pub fn select(&self, table: &Table) -> Result<Vec<bool>> {
        let columns = self
            .columns
            .iter()
            .map(|name| table.column(name))
            .collect::<core::result::Result<Vec<&[f64]>, _>>()?;

        let mut row = vec![0.0; columns.len()];
        let selection = (0..table.n_rows())
            .map(|i| {
                for (value, column) in row.iter_mut().zip(&columns) {
                    *value = column[i];
                }
                self.passes(&row)
            })
            .collect();
        Ok(selection)
    }
}

impl std::str::FromStr for CutExpr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for CutExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

fn truth(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn eval(expr: &Expr, row: &[f64]) -> f64 {
    match expr {
        Expr::Number(n) => *n,
        Expr::Var(i) => row.get(*i).copied().unwrap_or(f64::NAN),
        Expr::Neg(a) => -eval(a, row),
        Expr::Not(a) => truth(eval(a, row) == 0.0),
        Expr::Binary(op, a, b) => {
            let lhs = eval(a, row);
            // short circuit the logical operators
            match op {
                BinOp::And if lhs == 0.0 => return 0.0,
                BinOp::Or if lhs != 0.0 => return 1.0,
                _ => (),
            }
            let rhs = eval(b, row);
            match op {
                BinOp::Add => lhs + rhs,
                BinOp::Sub => lhs - rhs,
                BinOp::Mul => lhs * rhs,
                BinOp::Div => lhs / rhs,
                BinOp::Lt => truth(lhs < rhs),
                BinOp::Le => truth(lhs <= rhs),
                BinOp::Gt => truth(lhs > rhs),
                BinOp::Ge => truth(lhs >= rhs),
                BinOp::Eq => truth(lhs == rhs),
                BinOp::Ne => truth(lhs != rhs),
                BinOp::And | BinOp::Or => truth(rhs != 0.0),
            }
        }
        Expr::Call(func, args) => {
            let a = eval(&args[0], row);
            match func {
                Func::Abs => a.abs(),
                Func::Sqrt => a.sqrt(),
                Func::Log => a.ln(),
                Func::Exp => a.exp(),
                Func::Pow => a.powf(eval(&args[1], row)),
                Func::Min => a.min(eval(&args[1], row)),
                Func::Max => a.max(eval(&args[1], row)),
            }
        }
    }
}

/// Swap column names for positions and check function calls
fn resolve(node: Node, columns: &mut Vec<String>) -> core::result::Result<Expr, String> {
    let expr = match node {
        Node::Number(n) => Expr::Number(n),
        Node::Column(name) => match columns.iter().position(|c| *c == name) {
            Some(i) => Expr::Var(i),
            None => {
                columns.push(name);
                Expr::Var(columns.len() - 1)
            }
        },
        Node::Neg(a) => Expr::Neg(Box::new(resolve(*a, columns)?)),
        Node::Not(a) => Expr::Not(Box::new(resolve(*a, columns)?)),
        Node::Binary(op, a, b) => Expr::Binary(
            op,
            Box::new(resolve(*a, columns)?),
            Box::new(resolve(*b, columns)?),
        ),
        Node::Call(name, args) => {
            let func = Func::from_name(&name).ok_or_else(|| f!("unknown function \"{name}\""))?;
            if args.len() != func.arity() {
                return Err(f!(
                    "{name}() takes {} argument(s), found {}",
                    func.arity(),
                    args.len()
                ));
            }
            let args = args
                .into_iter()
                .map(|a| resolve(a, columns))
                .collect::<core::result::Result<Vec<Expr>, String>>()?;
            Expr::Call(func, args)
        }
    };
    Ok(expr)
}

/// Strip whitespace either side of a parser
fn ws<'a, O>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(multispace0, parser, multispace0)
}

/// Left associative chain of `operand (operator operand)*`
fn chain<'a>(
    operand: fn(&'a str) -> IResult<&'a str, Node>,
    operator: fn(&'a str) -> IResult<&'a str, BinOp>,
) -> impl FnMut(&'a str) -> IResult<&'a str, Node> {
    move |i: &'a str| {
        let (i, first) = operand(i)?;
        fold_many0(
            pair(operator, operand),
            move || first.clone(),
            |lhs, (op, rhs)| Node::Binary(op, Box::new(lhs), Box::new(rhs)),
        )(i)
    }
}

fn or_expr(i: &str) -> IResult<&str, Node> {
    chain(and_expr, |i| value(BinOp::Or, ws(tag("||")))(i))(i)
}

fn and_expr(i: &str) -> IResult<&str, Node> {
    chain(comparison, |i| value(BinOp::And, ws(tag("&&")))(i))(i)
}

fn comparison(i: &str) -> IResult<&str, Node> {
    chain(sum, |i| {
        ws(alt((
            value(BinOp::Le, tag("<=")),
            value(BinOp::Ge, tag(">=")),
            value(BinOp::Eq, tag("==")),
            value(BinOp::Ne, tag("!=")),
            value(BinOp::Lt, tag("<")),
            value(BinOp::Gt, tag(">")),
        )))(i)
    })(i)
}

fn sum(i: &str) -> IResult<&str, Node> {
    chain(product, |i| {
        ws(alt((value(BinOp::Add, char('+')), value(BinOp::Sub, char('-')))))(i)
    })(i)
}

fn product(i: &str) -> IResult<&str, Node> {
    chain(unary, |i| {
        ws(alt((value(BinOp::Mul, char('*')), value(BinOp::Div, char('/')))))(i)
    })(i)
}

fn unary(i: &str) -> IResult<&str, Node> {
    ws(alt((
        map(preceded(char('-'), unary), |n| Node::Neg(Box::new(n))),
        map(preceded(char('!'), unary), |n| Node::Not(Box::new(n))),
        primary,
    )))(i)
}

fn primary(i: &str) -> IResult<&str, Node> {
    alt((
        number,
        call,
        map(identifier, |name: &str| Node::Column(name.to_string())),
        delimited(char('('), or_expr, char(')')),
    ))(i)
}

/// Unsigned literal, sign is handled as a unary operator
fn number(i: &str) -> IResult<&str, Node> {
    let (i, _) = peek(alt((digit1, tag("."))))(i)?;
    map_res(recognize_float, |s: &str| s.parse::<f64>().map(Node::Number))(i)
}

fn identifier(i: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_"), tag(".")))),
    ))(i)
}

fn call(i: &str) -> IResult<&str, Node> {
    let (i, name) = identifier(i)?;
    let (i, args) = delimited(
        ws(char('(')),
        separated_list0(char(','), or_expr),
        char(')'),
    )(i)?;
    Ok((i, Node::Call(name.to_string(), args)))
}
