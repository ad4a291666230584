//! Expression evaluation engine

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config;
use crate::error::{Error, Result};
use crate::parser::{Ast, BinaryOp, ConversionMode, Expr};
use crate::registry::registry;
use crate::types::decimal::decimal_to_ratio;
use crate::types::{Exponent, LogarithmicQuantity, Quantity, Temperature, Unit, Value};

/// Evaluation context holding the variables assigned so far
#[derive(Clone, Default)]
pub struct EvalContext {
    pub(crate) variables: HashMap<String, Value>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a variable value
    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Set a variable
    pub fn set_variable(&mut self, name: String, value: Value) {
        self.variables.insert(name, value);
    }

    /// Clear all variables
    pub fn clear_variables(&mut self) {
        self.variables.clear();
    }

    /// All variables, sorted by name
    pub fn variables(&self) -> Vec<(&str, &Value)> {
        let mut vars: Vec<_> = self.variables.iter().map(|(k, v)| (k.as_str(), v)).collect();
        vars.sort_by(|a, b| a.0.cmp(b.0));
        vars
    }
}

/// Evaluate an AST node
pub fn evaluate(ast: &Ast, ctx: &mut EvalContext) -> Value {
    let result = match ast {
        Ast::Empty => Ok(Value::Empty),
        Ast::Assignment { name, expr } => eval_expr(expr, ctx).inspect(|value| {
            ctx.set_variable(name.clone(), value.clone());
        }),
        Ast::Expression(expr) => eval_expr(expr, ctx),
    };
    result.unwrap_or_else(|e| Value::Error(e.to_string()))
}

fn eval_expr(expr: &Expr, ctx: &EvalContext) -> Result<Value> {
    match expr {
        Expr::Quantity {
            number,
            uncertainty,
            unit,
        } => eval_quantity(*number, *uncertainty, unit.as_deref(), ctx),

        Expr::OnScale {
            number,
            uncertainty,
            scale,
        } => eval_on_scale(*number, *uncertainty, scale),

        Expr::Variable(name) => resolve_name(name, ctx),

        Expr::Negate(inner) => negate(eval_expr(inner, ctx)?),

        Expr::BinaryOp { op, left, right } => {
            let lval = eval_expr(left, ctx)?;
            let rval = eval_expr(right, ctx)?;
            eval_binary_op(*op, lval, rval)
        }

        Expr::Conversion {
            value,
            target,
            mode,
        } => {
            let val = eval_expr(value, ctx)?;
            match mode {
                ConversionMode::To => eval_conversion(val, target),
                ConversionMode::OnScale => eval_on_conversion(val, target),
            }
        }

        Expr::FunctionCall { name, args } => {
            let evaluated = args
                .iter()
                .map(|a| eval_expr(a, ctx))
                .collect::<Result<Vec<_>>>()?;
            eval_function(name, &evaluated)
        }
    }
}

/// A plain identifier, usable as a variable name
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn eval_quantity(
    number: Decimal,
    uncertainty: Option<Decimal>,
    unit: Option<&str>,
    ctx: &EvalContext,
) -> Result<Value> {
    let uncertainty = uncertainty.unwrap_or(Decimal::ZERO);
    let Some(unit) = unit else {
        return Ok(Quantity::dimensionless(number).with_uncertainty(uncertainty).into());
    };

    match registry().parse_unit(unit) {
        Ok(unit) => Ok(Quantity::new(number, unit).with_uncertainty(uncertainty).into()),
        // Treat as implicit multiplication with a variable or constant: `2 x`, `3 c`
        Err(_)
            if is_identifier(unit)
                && (ctx.get_variable(unit).is_some() || registry().constant(unit).is_some()) =>
        {
            let factor = Quantity::dimensionless(number).with_uncertainty(uncertainty);
            eval_binary_op(BinaryOp::Multiply, factor.into(), resolve_name(unit, ctx)?)
        }
        Err(e) => Err(e),
    }
}

fn eval_on_scale(number: Decimal, uncertainty: Option<Decimal>, scale: &str) -> Result<Value> {
    if let Some(atom) = registry().temperature(scale) {
        let t = Temperature::new(number, &atom)?;
        return Ok(t.with_uncertainty(uncertainty.unwrap_or(Decimal::ZERO)).into());
    }
    if let Some(unit) = registry().logarithmic(scale) {
        if uncertainty.is_some() {
            return Err(Error::Parsing(format!(
                "give the uncertainty of a {} level as an absolute quantity",
                unit.symbol
            )));
        }
        return Ok(LogarithmicQuantity::new(number, &unit).into());
    }
    Err(Error::Parsing(format!("unknown scale '{scale}'")))
}

/// Variable, then unit (as one of that unit), then constant
fn resolve_name(name: &str, ctx: &EvalContext) -> Result<Value> {
    if let Some(value) = ctx.get_variable(name) {
        return Ok(value.clone());
    }
    if let Some(atom) = registry().unit(name) {
        return Ok(Quantity::new(Decimal::ONE, atom).into());
    }
    if let Some(constant) = registry().constant(name) {
        return Ok(constant.value.clone().into());
    }
    Err(Error::Parsing(format!("unknown variable or unit '{name}'")))
}

/// Any value as an absolute quantity; temperatures go to kelvin
fn to_quantity(value: Value) -> Result<Quantity> {
    match value {
        Value::Quantity(q) => Ok(q),
        Value::Temperature(t) => t.to_kelvin(),
        Value::Logarithmic(l) => l.to_absolute(),
        Value::Empty => Err(Error::Parsing("expected a value".to_string())),
        Value::Error(msg) => Err(Error::Parsing(msg)),
    }
}

fn negate(value: Value) -> Result<Value> {
    match value {
        Value::Quantity(q) => Ok(q.neg().into()),
        Value::Temperature(t) => Ok(t.neg().into()),
        Value::Logarithmic(l) if l.uncertainty().is_none() => {
            Ok(LogarithmicQuantity::new(-l.number(), l.unit()).into())
        }
        Value::Logarithmic(l) => Err(Error::arithmetic(format!(
            "cannot negate the uncertain level {l}"
        ))),
        other => to_quantity(other).map(|q| q.neg().into()),
    }
}

/// Exponent as an exact rational, if the quantity is an exact dimensionless number
fn exact_exponent(q: &Quantity) -> Result<Option<Exponent>> {
    if !q.is_dimensionless() {
        return Err(Error::NotDimensionless(format!("exponent {q} must be dimensionless")));
    }
    if !q.is_exact() {
        return Ok(None);
    }
    Ok(decimal_to_ratio(q.base()?.number()))
}

fn power(base: Quantity, exponent: &Quantity) -> Result<Quantity> {
    match exact_exponent(exponent)? {
        Some(k) => base.pow(k),
        None => exponent.rpow(&base),
    }
}

fn eval_binary_op(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
    use BinaryOp::*;

    match (op, left, right) {
        // Temperatures: relative quantities shift them, differences of two are relative
        (Add, Value::Temperature(t), Value::Quantity(q))
        | (Add, Value::Quantity(q), Value::Temperature(t)) => Ok(t.add(&q)?.into()),
        (Subtract, Value::Temperature(t), Value::Quantity(q)) => Ok(t.sub(&q)?.into()),
        (Subtract, Value::Temperature(a), Value::Temperature(b)) => Ok(a.difference(&b)?.into()),
        (Add, Value::Temperature(a), Value::Temperature(b)) => Ok(a.sum(&b)?.into()),
        (Multiply, Value::Temperature(t), Value::Quantity(q))
        | (Multiply, Value::Quantity(q), Value::Temperature(t)) => Ok(t.mul(&q)?.into()),
        (Divide, Value::Temperature(t), Value::Quantity(q)) => Ok(t.div(&q)?.into()),
        (Power, Value::Temperature(t), Value::Quantity(q)) => match exact_exponent(&q)? {
            Some(k) => Ok(t.pow(k)?.into()),
            None => Ok(power(t.to_kelvin()?, &q)?.into()),
        },

        // Logarithmic levels combine with each other on the log scale
        (Add, Value::Logarithmic(a), Value::Logarithmic(b)) => Ok(a.add(&b)?.into()),
        (Subtract, Value::Logarithmic(a), Value::Logarithmic(b)) => Ok(a.sub(&b)?.into()),
        (Multiply, Value::Logarithmic(a), Value::Logarithmic(b)) => Ok(a.mul(&b)?.into()),
        (Divide, Value::Logarithmic(a), Value::Logarithmic(b)) => Ok(a.div(&b)?.into()),

        // Everything else on absolute quantities
        (op, left, right) => {
            let l = to_quantity(left)?;
            let r = to_quantity(right)?;
            let result = match op {
                Add => l.add(&r)?,
                Subtract => l.sub(&r)?,
                Multiply => l.mul(&r)?,
                Divide => l.div(&r)?,
                Power => power(l, &r)?,
            };
            Ok(result.into())
        }
    }
}

/// `to` / `in`: express the same quantity in another unit
fn eval_conversion(value: Value, target: &str) -> Result<Value> {
    let unit = match registry().parse_unit(target) {
        Ok(unit) => unit,
        Err(e) => {
            return match registry().logarithmic(target) {
                Some(_) => eval_on_conversion(value, target),
                None => Err(e),
            }
        }
    };

    match value {
        Value::Temperature(t) => match unit.as_atom().filter(|a| a.temperature_scale().is_some()) {
            Some(atom) => Ok(t.to_scale(atom)?.into()),
            None => Ok(t.to(&unit)?.into()),
        },
        other => Ok(to_quantity(other)?.to(&unit)?.into()),
    }
}

/// `on`: place the value on a temperature or logarithmic scale
fn eval_on_conversion(value: Value, target: &str) -> Result<Value> {
    if let Some(atom) = registry().temperature(target) {
        return match value {
            Value::Temperature(t) => Ok(t.to_scale(&atom)?.into()),
            other => Ok(to_quantity(other)?.on_temperature_scale(&atom)?.into()),
        };
    }
    if let Some(unit) = registry().logarithmic(target) {
        let q = to_quantity(value)?;
        return Ok(q.on_logarithmic_scale(&unit)?.into());
    }
    if let Some(atom) = registry().unit(target) {
        if atom.is_base() {
            return Ok(to_quantity(value)?.to(&Unit::from(atom))?.into());
        }
    }
    Err(Error::Parsing(format!(
        "'{target}' is not a temperature or logarithmic scale"
    )))
}

fn eval_function(name: &str, args: &[Value]) -> Result<Value> {
    let arg = |i: usize| -> Result<Quantity> {
        args.get(i)
            .cloned()
            .ok_or_else(|| Error::Parsing(format!("{name} needs {} argument(s)", i + 1)))
            .and_then(to_quantity)
    };
    if args.is_empty() {
        return Err(Error::Parsing(format!("{name} needs an argument")));
    }

    let result = match name {
        "sqrt" => arg(0)?.sqrt()?,
        "exp" => arg(0)?.exp()?,
        "ln" => arg(0)?.ln()?,
        "log10" => arg(0)?.log10()?,
        "log" if args.len() == 1 => arg(0)?.ln()?,
        "log" => {
            let base = arg(1)?;
            if !base.is_dimensionless() {
                return Err(Error::NotDimensionless(format!("logarithm base {base}")));
            }
            arg(0)?.log(base.base()?.number())?
        }
        "abs" => match args.first() {
            Some(Value::Temperature(t)) if t.number().is_sign_negative() => {
                return Ok(t.neg().into())
            }
            Some(Value::Temperature(t)) => return Ok(t.clone().into()),
            _ => arg(0)?.abs(),
        },
        "cancel" => arg(0)?.cancel(),
        "fully_cancel" => arg(0)?.fully_cancel()?,
        "base" => arg(0)?.base()?,
        "canonical" => arg(0)?.canonical(),
        "round" if args.len() == 1 => arg(0)?.round()?,
        "round" => {
            let figures = arg(1)?
                .to_integer()?
                .to_u32()
                .filter(|f| *f > 0)
                .ok_or_else(|| Error::Parsing("round needs a positive number of figures".into()))?;
            let rounding = &config::current().rounding;
            arg(0)?.round_to_figures(figures, rounding.pad, rounding.mode)?
        }
        _ => return Err(Error::Parsing(format!("unknown function: {name}"))),
    };
    Ok(result.into())
}
