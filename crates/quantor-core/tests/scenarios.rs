//! End-to-end behaviour of the quantity engine through the public API

use pretty_assertions::assert_eq;
use quantor_core::types::decimal::parse_decimal;
use quantor_core::{registry, Dimensions, Engine, Error, Quantity, Temperature, Value};
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    parse_decimal(s).unwrap()
}

fn q(s: &str) -> Quantity {
    Quantity::parse(s).unwrap()
}

#[test]
fn test_product_of_quantities() {
    let speed = q("4 m").mul(&q("1 s-1")).unwrap();
    assert_eq!(speed.to_string(), "4 m s⁻¹");
    assert_eq!(speed.dimensions(), Dimensions::from_integers([1, 0, -1, 0, 0, 0, 0]));
}

#[test]
fn test_sum_with_uncertainty() {
    let total = q("20 m ± 2").add(&q("30 m ± 5")).unwrap();
    assert_eq!(total.number(), d("50"));
    assert_eq!(total.uncertainty().round_dp(4), d("5.3852"));
    assert_eq!(total.unit().symbol_with(false), "m");
}

#[test]
fn test_square_with_uncertainty() {
    let area = q("20 m ± 2").powi(2).unwrap();
    assert_eq!(area.number(), d("400"));
    assert_eq!(area.uncertainty(), d("80"));
    assert_eq!(area.unit().symbol_with(false), "m2");
}

#[test]
fn test_conversion_to_prefixed_unit() {
    let kj = registry().parse_unit("kJ").unwrap();
    let energy = q("400 J").to(&kj).unwrap();
    assert_eq!(energy.number(), d("0.4"));
    assert_eq!(energy.unit().symbol_with(false), "kJ");
}

#[test]
fn test_temperature_plus_difference() {
    let celsius = registry().temperature("°C").unwrap();
    let warm = Temperature::new(d("50"), &celsius).unwrap();
    let hotter = warm.add(&q("50 K")).unwrap();
    assert_eq!(hotter.number(), d("100"));
    assert_eq!(hotter.unit().symbol, "°C");
}

#[test]
fn test_parsed_unit_equals_built_unit() {
    let parsed = registry().parse_unit("kg m2 / s").unwrap();
    let kg = registry().parse_unit("kg").unwrap();
    let m = registry().parse_unit("m").unwrap();
    let s = registry().parse_unit("s").unwrap();
    let built = kg.multiply(&m.multiply(&m).unwrap()).unwrap().divide(&s).unwrap();
    assert_eq!(parsed, built);
    assert_eq!(parsed.dimensions(), Dimensions::from_integers([2, 1, -1, 0, 0, 0, 0]));
}

#[test]
fn test_mismatched_units() {
    assert!(matches!(q("1 m").add(&q("1 s")), Err(Error::MismatchedUnits { .. })));
    assert!(matches!(q("1 m").compare(&q("1 kg")), Err(Error::MismatchedUnits { .. })));
    assert!(q("1 km").gt(&q("999 m")).unwrap());
}

#[test]
fn test_not_dimensionless() {
    assert!(matches!(q("2 m").exp(), Err(Error::NotDimensionless(_))));
    assert!(matches!(q("2 s").ln(), Err(Error::NotDimensionless(_))));
    assert_eq!(q("1000 m").div(&q("1 km")).unwrap().log10().unwrap().number().round_dp(10), d("0"));
}

#[test]
fn test_equality_reduces_to_base() {
    assert_eq!(q("1 km"), q("1000 m"));
    assert_eq!(q("1 J"), q("1 kg m2 s-2"));
    assert_ne!(q("1 km"), q("1 m"));
    // Uncertainty does not take part in equality
    assert_eq!(q("1.0(1) m"), q("1.0 m"));
}

#[test]
fn test_engine_scenarios() {
    let mut engine = Engine::new();
    assert_eq!(engine.eval("4 m * 1 s-1").to_string(), "4 m s⁻¹");
    assert_eq!(engine.eval("400 J to kJ").as_decimal(), Some(d("0.4")));

    let v = engine.eval("50 @ °C + 50 K");
    assert!(matches!(v, Value::Temperature(_)));
    assert_eq!(v.as_decimal(), Some(d("100")));
}
