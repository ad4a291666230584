//! Abstract Syntax Tree definitions

use pest::iterators::{Pair, Pairs};
use rust_decimal::Decimal;

use super::{number_literal, quantity_uncertainty, set_uncertainty, Rule};
use crate::error::{Error, Result};

/// Top-level AST node for a line
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// Empty line or comment
    Empty,
    /// Variable assignment: name = expr
    Assignment { name: String, expr: Box<Expr> },
    /// Expression to evaluate
    Expression(Expr),
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Number with optional uncertainty and the unit string written after it
    Quantity {
        number: Decimal,
        uncertainty: Option<Decimal>,
        unit: Option<String>,
    },
    /// Point on a scale: `25 @ °C`
    OnScale {
        number: Decimal,
        uncertainty: Option<Decimal>,
        scale: String,
    },
    /// Variable, unit or constant name
    Variable(String),
    Negate(Box<Expr>),
    BinaryOp {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `5 km to m`, `300 K on °C`
    Conversion {
        value: Box<Expr>,
        target: String,
        mode: ConversionMode,
    },
    /// Function call: sqrt(), log()
    FunctionCall { name: String, args: Vec<Expr> },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

/// What a conversion suffix asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionMode {
    /// `to` / `in`: same quantity, other unit
    To,
    /// `on`: place the value on a temperature or logarithmic scale
    OnScale,
}

fn expected(what: &str) -> Error {
    Error::Parsing(format!("expected {what}"))
}

/// Build AST from parsed pairs
pub fn build_ast(pairs: Pairs<'_, Rule>) -> Result<Ast> {
    for pair in pairs {
        if pair.as_rule() == Rule::line {
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::assignment => return build_assignment(inner.into_inner()),
                    Rule::expression => {
                        return Ok(Ast::Expression(build_expression(inner.into_inner())?))
                    }
                    _ => {}
                }
            }
            return Ok(Ast::Empty);
        }
    }
    Ok(Ast::Empty)
}

fn build_assignment(mut pairs: Pairs<'_, Rule>) -> Result<Ast> {
    let name = pairs
        .next()
        .ok_or_else(|| expected("identifier"))?
        .as_str()
        .to_string();

    let expr_pair = pairs.next().ok_or_else(|| expected("expression"))?;
    let expr = build_expression(expr_pair.into_inner())?;

    Ok(Ast::Assignment {
        name,
        expr: Box::new(expr),
    })
}

fn build_expression(pairs: Pairs<'_, Rule>) -> Result<Expr> {
    let mut calculation = None;
    let mut conversion = None;

    for pair in pairs {
        match pair.as_rule() {
            Rule::calculation => calculation = Some(build_calculation(pair.into_inner())?),
            Rule::conversion_suffix => {
                let mut mode = ConversionMode::To;
                let mut target = None;
                for p in pair.into_inner() {
                    match p.as_rule() {
                        Rule::convert_on => mode = ConversionMode::OnScale,
                        Rule::target_unit => target = Some(p.as_str().trim().to_string()),
                        _ => {}
                    }
                }
                conversion = Some((target.ok_or_else(|| expected("target unit"))?, mode));
            }
            _ => {}
        }
    }

    let expr = calculation.ok_or_else(|| expected("calculation"))?;
    match conversion {
        Some((target, mode)) => Ok(Expr::Conversion {
            value: Box::new(expr),
            target,
            mode,
        }),
        None => Ok(expr),
    }
}

fn build_calculation(pairs: Pairs<'_, Rule>) -> Result<Expr> {
    let mut terms: Vec<Expr> = Vec::new();
    let mut ops: Vec<BinaryOp> = Vec::new();

    for pair in pairs {
        match pair.as_rule() {
            Rule::term => terms.push(build_term(pair)?),
            Rule::add => ops.push(BinaryOp::Add),
            Rule::subtract => ops.push(BinaryOp::Subtract),
            Rule::multiply => ops.push(BinaryOp::Multiply),
            Rule::divide => ops.push(BinaryOp::Divide),
            Rule::power => ops.push(BinaryOp::Power),
            _ => {}
        }
    }

    if terms.is_empty() {
        return Err(Error::Parsing("empty expression".to_string()));
    }

    // Pass 1: Power, right to left
    process_powers(&mut terms, &mut ops);

    // Pass 2: Multiply, Divide
    process_ops(&mut terms, &mut ops, &[BinaryOp::Multiply, BinaryOp::Divide]);

    // Pass 3: Add, Subtract
    process_ops(&mut terms, &mut ops, &[BinaryOp::Add, BinaryOp::Subtract]);

    if terms.len() != 1 {
        return Err(Error::Parsing("failed to reduce expression".to_string()));
    }
    Ok(terms.remove(0))
}

fn process_ops(terms: &mut Vec<Expr>, ops: &mut Vec<BinaryOp>, target_ops: &[BinaryOp]) {
    let mut i = 0;
    while i < ops.len() {
        if target_ops.contains(&ops[i]) {
            let op = ops.remove(i);
            let left = terms.remove(i);
            let right = terms.remove(i);
            terms.insert(
                i,
                Expr::BinaryOp {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            );
        } else {
            i += 1;
        }
    }
}

/// `2^3^2` is `2^(3^2)`, and `-2^2` is `-(2^2)`
fn process_powers(terms: &mut Vec<Expr>, ops: &mut Vec<BinaryOp>) {
    let mut i = ops.len();
    while i > 0 {
        i -= 1;
        if ops[i] != BinaryOp::Power {
            continue;
        }
        ops.remove(i);
        let left = terms.remove(i);
        let right = terms.remove(i);
        terms.insert(i, power(left, right));
    }
}

fn power(base: Expr, exponent: Expr) -> Expr {
    match base {
        Expr::Negate(inner) => Expr::Negate(Box::new(power(*inner, exponent))),
        base => Expr::BinaryOp {
            op: BinaryOp::Power,
            left: Box::new(base),
            right: Box::new(exponent),
        },
    }
}

fn build_term(pair: Pair<'_, Rule>) -> Result<Expr> {
    let mut negations = 0;
    let mut atom = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::negate => negations += 1,
            _ => atom = Some(build_atom(inner)?),
        }
    }
    let mut expr = atom.ok_or_else(|| expected("value"))?;
    for _ in 0..negations {
        expr = Expr::Negate(Box::new(expr));
    }
    Ok(expr)
}

fn build_atom(pair: Pair<'_, Rule>) -> Result<Expr> {
    match pair.as_rule() {
        Rule::quantity_literal => parse_quantity_literal(pair),
        Rule::scale_literal => parse_scale_literal(pair),
        Rule::function_call => parse_function_call(pair),
        Rule::variable_ref => Ok(Expr::Variable(pair.as_str().to_string())),
        Rule::parenthesized => {
            let inner = pair.into_inner().next().ok_or_else(|| expected("expression"))?;
            build_expression(inner.into_inner())
        }
        rule => Err(Error::Parsing(format!("unexpected rule: {rule:?}"))),
    }
}

fn parse_quantity_literal(pair: Pair<'_, Rule>) -> Result<Expr> {
    let text = pair.as_str().to_string();
    let mut number = Decimal::ZERO;
    let mut uncertainty = None;
    let mut unit = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::number_literal => {
                let (n, concise) = number_literal(inner)?;
                number = n;
                uncertainty = concise;
            }
            Rule::quantity_uncertainty => {
                set_uncertainty(&mut uncertainty, quantity_uncertainty(inner)?, &text)?
            }
            Rule::calc_unit => unit = Some(inner.as_str().trim().to_string()),
            _ => {}
        }
    }

    Ok(Expr::Quantity {
        number,
        uncertainty,
        unit,
    })
}

fn parse_scale_literal(pair: Pair<'_, Rule>) -> Result<Expr> {
    let text = pair.as_str().to_string();
    let mut number = Decimal::ZERO;
    let mut uncertainty = None;
    let mut scale = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::number_literal => {
                let (n, concise) = number_literal(inner)?;
                number = n;
                uncertainty = concise;
            }
            Rule::quantity_uncertainty => {
                set_uncertainty(&mut uncertainty, quantity_uncertainty(inner)?, &text)?
            }
            Rule::unit_symbol => scale = Some(inner.as_str().to_string()),
            _ => {}
        }
    }

    Ok(Expr::OnScale {
        number,
        uncertainty,
        scale: scale.ok_or_else(|| expected("scale after '@'"))?,
    })
}

fn parse_function_call(pair: Pair<'_, Rule>) -> Result<Expr> {
    let mut inner = pair.into_inner();
    let name = inner
        .next()
        .ok_or_else(|| expected("function name"))?
        .as_str()
        .to_string();

    let mut args = Vec::new();
    for arg_pair in inner {
        if arg_pair.as_rule() == Rule::expression {
            args.push(build_expression(arg_pair.into_inner())?);
        }
    }

    Ok(Expr::FunctionCall { name, args })
}
