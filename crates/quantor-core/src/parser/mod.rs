//! Parsers for unit strings, quantity strings and calculator lines, using pest

mod ast;

pub use ast::{Ast, BinaryOp, ConversionMode, Expr};

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::format::parse_exponent;
use crate::types::decimal::parse_decimal;
use crate::types::{Atom, Exponent, Factor, Quantity, Unit};

#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
pub struct QuantorParser;

fn syntax_error(what: &str, input: &str, e: pest::error::Error<Rule>) -> Error {
    Error::Parsing(format!("invalid {what} '{input}': {}", e.variant.message()))
}

/// Parse a single calculator line
pub fn parse_line(input: &str) -> Result<Ast> {
    let pairs =
        QuantorParser::parse(Rule::line, input).map_err(|e| syntax_error("expression", input, e))?;
    ast::build_ast(pairs)
}

/// Parse a unit string such as `"kg m2 / s"`, resolving each symbol with `resolve`.
///
/// The factors are kept as written (divisor exponents negated); nothing is cancelled.
pub fn parse_unit_with(input: &str, resolve: &dyn Fn(&str) -> Result<Atom>) -> Result<Unit> {
    let pair = QuantorParser::parse(Rule::unit_string, input)
        .map_err(|e| syntax_error("unit string", input, e))?
        .next()
        .ok_or_else(|| Error::Parsing(format!("empty unit string '{input}'")))?;
    let expression = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::unit_expression)
        .ok_or_else(|| Error::Parsing(format!("empty unit string '{input}'")))?;
    build_unit(expression, resolve)
}

/// Parse `"1.234(56) m"`, `"8.293 ± 0.010 V"`, `"20 m +/- 2"` or a bare number
pub fn parse_quantity_with(input: &str, resolve: &dyn Fn(&str) -> Result<Atom>) -> Result<Quantity> {
    let pair = QuantorParser::parse(Rule::quantity_string, input)
        .map_err(|e| syntax_error("quantity string", input, e))?
        .next()
        .ok_or_else(|| Error::Parsing(format!("empty quantity string '{input}'")))?;

    let mut number = None;
    let mut uncertainty = None;
    let mut unit = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::number_literal => {
                let (n, concise) = number_literal(inner)?;
                number = Some(n);
                uncertainty = concise;
            }
            Rule::quantity_uncertainty => {
                set_uncertainty(&mut uncertainty, quantity_uncertainty(inner)?, input)?;
            }
            Rule::unit_expression => unit = Some(build_unit(inner, resolve)?),
            _ => {}
        }
    }

    let number = number.ok_or_else(|| Error::Parsing(format!("missing number in '{input}'")))?;
    let unit = unit.unwrap_or_else(Unit::unitless);
    Ok(Quantity::new(number, unit).with_uncertainty(uncertainty.unwrap_or(Decimal::ZERO)))
}

pub(crate) fn set_uncertainty(slot: &mut Option<Decimal>, value: Decimal, input: &str) -> Result<()> {
    if slot.is_some() {
        return Err(Error::Parsing(format!("more than one uncertainty in '{input}'")));
    }
    *slot = Some(value);
    Ok(())
}

/// A decimal mantissa as written, made acceptable to the decimal parser (`5.` and `.5`)
fn clean_mantissa(s: &str) -> String {
    let s = s.strip_suffix('.').unwrap_or(s);
    if s.starts_with('.') {
        format!("0{s}")
    } else {
        s.to_string()
    }
}

/// Number and the uncertainty given in concise `1.234(56)` notation, if any
pub(crate) fn number_literal(pair: Pair<'_, Rule>) -> Result<(Decimal, Option<Decimal>)> {
    let mut negative = false;
    let mut mantissa = String::new();
    let mut concise = None;
    let mut exponent = "";

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::number_sign => negative = inner.as_str() != "+",
            Rule::mantissa => mantissa = clean_mantissa(inner.as_str()),
            Rule::concise_uncertainty => {
                concise = Some(inner.as_str().trim_matches(|c| c == '(' || c == ')'))
            }
            Rule::sci_exponent => exponent = inner.as_str(),
            _ => {}
        }
    }

    let number = parse_decimal(&format!("{mantissa}{exponent}"))?;
    let number = if negative { -number } else { number };

    let uncertainty = match concise {
        Some(digits) => {
            let places = mantissa.split_once('.').map_or(0, |(_, f)| f.len());
            let value: i64 = digits
                .parse()
                .map_err(|_| Error::Parsing(format!("uncertainty ({digits}) is too long")))?;
            let aligned = Decimal::try_new(value, places as u32)
                .map_err(|e| Error::Parsing(format!("uncertainty ({digits}): {e}")))?;
            Some(parse_decimal(&format!("{aligned}{exponent}"))?)
        }
        None => None,
    };
    Ok((number, uncertainty))
}

/// The `± 0.1` part of a quantity
pub(crate) fn quantity_uncertainty(pair: Pair<'_, Rule>) -> Result<Decimal> {
    let value = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::uncertainty_value)
        .ok_or_else(|| Error::Parsing("missing uncertainty after ±".to_string()))?;
    let text = value.as_str();
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(i) => text.split_at(i),
        None => (text, ""),
    };
    parse_decimal(&format!("{}{exponent}", clean_mantissa(mantissa)))
}

fn build_unit(expression: Pair<'_, Rule>, resolve: &dyn Fn(&str) -> Result<Atom>) -> Result<Unit> {
    let text = expression.as_str().to_string();
    let mut factors = Vec::new();
    let mut solidi = 0;
    for inner in expression.into_inner() {
        match inner.as_rule() {
            Rule::solidus => {
                solidi += 1;
                if solidi > 1 {
                    return Err(Error::Parsing(format!(
                        "more than one '/' in unit string '{text}'"
                    )));
                }
            }
            Rule::unit_product => {
                let sign = if solidi == 0 { 1 } else { -1 };
                collect_product(inner, Exponent::from_integer(sign), &mut factors, resolve)?;
            }
            _ => {}
        }
    }
    Unit::new(factors)
}

fn collect_product(
    product: Pair<'_, Rule>,
    sign: Exponent,
    factors: &mut Vec<Factor>,
    resolve: &dyn Fn(&str) -> Result<Atom>,
) -> Result<()> {
    for term in product.into_inner() {
        match term.as_rule() {
            Rule::unit_group => {
                for inner in term.into_inner() {
                    if inner.as_rule() == Rule::unit_product {
                        collect_product(inner, sign, factors, resolve)?;
                    }
                }
            }
            Rule::unit_factor => {
                let mut atom = None;
                let mut exponent = Exponent::from_integer(1);
                for part in term.into_inner() {
                    match part.as_rule() {
                        Rule::unit_symbol => atom = Some(resolve(part.as_str())?),
                        Rule::unit_exponent => {
                            exponent = parse_exponent(&part.as_str().replace(['(', ')'], ""))?
                        }
                        _ => {}
                    }
                }
                if let Some(atom) = atom {
                    factors.push(Factor::new(atom, exponent * sign));
                }
            }
            _ => {}
        }
    }
    Ok(())
}
