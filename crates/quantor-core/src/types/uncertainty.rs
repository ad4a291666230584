//! First-order propagation of standard uncertainties
//!
//! `propagate` is a pure function of the operand values, their uncertainties,
//! the already computed result and an optional correlation coefficient.
//! The covariance term is `ρ·σa·σb`.

use rust_decimal::Decimal;

use super::decimal::{add, div, ln, mul, sqrt, sub};
use crate::error::Result;

/// Operation whose result uncertainty is being computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    /// `A / B` or `A / x`
    Div,
    /// `x / A`
    RDiv,
    /// `A ^ B` or `A ^ x`
    Pow,
    /// `B ^ A` or `x ^ A`, where the first operand is the exponent
    RPow,
    Ln,
    Log10,
    /// Logarithm to the base given as the exact second operand
    Log,
    Exp,
}

/// A value with its standard uncertainty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measured {
    pub value: Decimal,
    pub uncertainty: Decimal,
}

impl Measured {
    pub fn new(value: Decimal, uncertainty: Decimal) -> Self {
        Self { value, uncertainty }
    }

    pub fn exact(value: Decimal) -> Self {
        Self::new(value, Decimal::ZERO)
    }
}

/// The second operand of an operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Measured(Measured),
    /// A plain number without uncertainty
    Exact(Decimal),
    /// Unary operations
    None,
}

impl Operand {
    fn uncertainty(&self) -> Decimal {
        match self {
            Operand::Measured(m) => m.uncertainty,
            Operand::Exact(_) | Operand::None => Decimal::ZERO,
        }
    }
}

fn square(x: Decimal) -> Result<Decimal> {
    mul(x, x)
}

/// Uncertainty of `result = op(a, b)`
pub fn propagate(
    op: Operation,
    a: Measured,
    b: Operand,
    result: Decimal,
    correlation: Decimal,
) -> Result<Decimal> {
    let sa = a.uncertainty;
    let sb = b.uncertainty();
    if sa.is_zero() && sb.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let covariance = mul(mul(correlation, sa)?, sb)?;
    let two = Decimal::TWO;

    let sigma = match (op, b) {
        (Operation::Add, _) => sqrt(add(add(square(sa)?, square(sb)?)?, mul(two, covariance)?)?)?,
        (Operation::Sub, _) => sqrt(sub(add(square(sa)?, square(sb)?)?, mul(two, covariance)?)?)?,

        (Operation::Mul, Operand::Measured(bm)) => {
            let radicand = add(
                add(square(div(sa, a.value)?)?, square(div(sb, bm.value)?)?)?,
                div(mul(two, covariance)?, result)?,
            )?;
            mul(result.abs(), sqrt(radicand)?)?
        }
        (Operation::Mul, Operand::Exact(x)) => mul(x.abs(), sa)?,

        (Operation::Div, Operand::Measured(bm)) => {
            let radicand = sub(
                add(square(div(sa, a.value)?)?, square(div(sb, bm.value)?)?)?,
                div(mul(two, covariance)?, result)?,
            )?;
            mul(result.abs(), sqrt(radicand)?)?
        }
        (Operation::Div, Operand::Exact(x)) => div(sa, x.abs())?,

        (Operation::RDiv, _) => div(mul(result, sa)?, a.value)?.abs(),

        (Operation::Pow, Operand::Measured(bm)) => {
            // A^B: partials are B·A^(B-1) and ln(A)·A^B
            let ln_a = ln(a.value)?;
            let base_term = square(mul(div(bm.value, a.value)?, sa)?)?;
            let exponent_term = square(mul(ln_a, sb)?)?;
            let cross = mul(mul(two, div(mul(bm.value, ln_a)?, a.value)?)?, covariance)?;
            mul(result.abs(), sqrt(add(add(base_term, exponent_term)?, cross)?)?)?
        }
        (Operation::Pow, Operand::Exact(x)) => div(mul(mul(result, x)?, sa)?, a.value)?.abs(),

        (Operation::RPow, Operand::Measured(bm)) => {
            // B^A with `a` the exponent and `b` the base
            let ln_b = ln(bm.value)?;
            let base_term = square(mul(div(a.value, bm.value)?, sb)?)?;
            let exponent_term = square(mul(ln_b, sa)?)?;
            let cross = mul(mul(two, div(mul(a.value, ln_b)?, bm.value)?)?, covariance)?;
            mul(result.abs(), sqrt(add(add(base_term, exponent_term)?, cross)?)?)?
        }
        (Operation::RPow, Operand::Exact(x)) => mul(result.abs(), mul(ln(x)?, sa)?.abs())?,

        (Operation::Ln, _) => div(sa, a.value)?.abs(),
        (Operation::Log10, _) => div(sa, mul(ln(Decimal::TEN)?, a.value)?)?.abs(),
        (Operation::Log, Operand::Exact(base)) => div(sa, mul(ln(base)?, a.value)?)?.abs(),
        (Operation::Exp, _) => mul(result.abs(), sa)?,

        (Operation::Mul | Operation::Div | Operation::Pow | Operation::RPow, Operand::None)
        | (Operation::Log, _) => {
            return Err(crate::error::Error::arithmetic(format!(
                "{op:?} needs a second operand for uncertainty propagation"
            )))
        }
    };
    Ok(sigma)
}
