//! Conversion between units.

use thiserror::Error;

use crate::overrides::{ConversionOverride, OverrideMatch, find_override};
use crate::unit::{Dimension, Unit};

/// Why a conversion could not be performed.
///
/// This is a recoverable, per-line outcome: callers flag the affected line
/// ("quantity unknown") and continue with the rest of the batch.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConversionFailure {
    #[error("cannot convert {from} to {to}: incompatible dimensions")]
    IncompatibleDimensions { from: Unit, to: Unit },

    #[error("cannot convert {from} to {to} without a piece weight")]
    MissingPieceWeight { from: Unit, to: Unit },

    #[error("piece weight must be a positive number of ounces (got {0})")]
    InvalidPieceWeight(f64),

    #[error("override factor must be a positive finite number (got {0})")]
    InvalidOverrideFactor(f64),

    #[error("value must be finite (got {0})")]
    NonFiniteValue(f64),
}

/// Convert `value` from one unit to another.
///
/// Resolution order:
/// 1. identical units return `value` untouched;
/// 2. an ingredient override recorded `from -> to`, else the reciprocal of one
///    recorded `to -> from`;
/// 3. the standard dimensional graph (piece counts reach weight through
///    `piece_weight_oz`);
/// 4. an override hop composed with a standard hop (e.g. bunch -> oz -> lb).
pub fn convert(
    value: f64,
    from: &Unit,
    to: &Unit,
    piece_weight_oz: Option<f64>,
    overrides: Option<&[ConversionOverride]>,
) -> Result<f64, ConversionFailure> {
    if from == to {
        return Ok(value);
    }
    if !value.is_finite() {
        return Err(ConversionFailure::NonFiniteValue(value));
    }

    let overrides = overrides.unwrap_or(&[]);
    if let Some(m) = find_override(overrides, from, to) {
        tracing::trace!(%from, %to, ?m, "conversion resolved by ingredient override");
        return apply_override(value, m);
    }

    match standard(value, from, to, piece_weight_oz) {
        Ok(converted) => Ok(converted),
        Err(failure) => bridge(value, from, to, piece_weight_oz, overrides).unwrap_or(Err(failure)),
    }
}

/// [`convert`] over raw unit names.
pub fn convert_str(
    value: f64,
    from: &str,
    to: &str,
    piece_weight_oz: Option<f64>,
    overrides: Option<&[ConversionOverride]>,
) -> Result<f64, ConversionFailure> {
    convert(value, &Unit::parse(from), &Unit::parse(to), piece_weight_oz, overrides)
}

/// Whether `a` and `b` convert through the identity or standard linear path.
///
/// Piece-to-weight needs an ingredient's piece weight and is therefore not
/// reported here; see [`are_units_compatible_with`].
pub fn are_units_compatible(a: &Unit, b: &Unit) -> bool {
    if a == b {
        return true;
    }
    let dimension = a.dimension();
    dimension != Dimension::Custom && dimension == b.dimension()
}

/// Like [`are_units_compatible`], also accepting count <-> weight when a valid
/// piece weight is known for the ingredient.
pub fn are_units_compatible_with(a: &Unit, b: &Unit, piece_weight_oz: Option<f64>) -> bool {
    if are_units_compatible(a, b) {
        return true;
    }
    let valid_weight = piece_weight_oz.is_some_and(|w| w.is_finite() && w > 0.0);
    valid_weight
        && matches!(
            (a.dimension(), b.dimension()),
            (Dimension::Count, Dimension::Weight) | (Dimension::Weight, Dimension::Count)
        )
}

fn standard(
    value: f64,
    from: &Unit,
    to: &Unit,
    piece_weight_oz: Option<f64>,
) -> Result<f64, ConversionFailure> {
    match (from.dimension(), to.dimension()) {
        (Dimension::Custom, _) | (_, Dimension::Custom) => {
            Err(ConversionFailure::IncompatibleDimensions {
                from: from.clone(),
                to: to.clone(),
            })
        }
        (Dimension::Count, Dimension::Weight) => {
            let weight = piece_weight(from, to, piece_weight_oz)?;
            let pieces = linear(value, from, &Unit::Piece)?;
            linear(pieces * weight, &Unit::Ounce, to)
        }
        (Dimension::Weight, Dimension::Count) => {
            let weight = piece_weight(from, to, piece_weight_oz)?;
            let ounces = linear(value, from, &Unit::Ounce)?;
            linear(ounces / weight, &Unit::Piece, to)
        }
        (a, b) if a == b => linear(value, from, to),
        _ => Err(ConversionFailure::IncompatibleDimensions {
            from: from.clone(),
            to: to.clone(),
        }),
    }
}

fn linear(value: f64, from: &Unit, to: &Unit) -> Result<f64, ConversionFailure> {
    match (from.base_factor(), to.base_factor()) {
        (Some(f), Some(t)) if from.dimension() == to.dimension() => Ok(value * (f / t)),
        _ => Err(ConversionFailure::IncompatibleDimensions {
            from: from.clone(),
            to: to.clone(),
        }),
    }
}

fn piece_weight(from: &Unit, to: &Unit, piece_weight_oz: Option<f64>) -> Result<f64, ConversionFailure> {
    match piece_weight_oz {
        None => Err(ConversionFailure::MissingPieceWeight {
            from: from.clone(),
            to: to.clone(),
        }),
        Some(w) if w.is_finite() && w > 0.0 => Ok(w),
        Some(w) => Err(ConversionFailure::InvalidPieceWeight(w)),
    }
}

fn apply_override(value: f64, m: OverrideMatch) -> Result<f64, ConversionFailure> {
    let factor = match m {
        OverrideMatch::Exact(f) | OverrideMatch::Reverse(f) => f,
    };
    if !(factor.is_finite() && factor > 0.0) {
        return Err(ConversionFailure::InvalidOverrideFactor(factor));
    }
    Ok(match m {
        OverrideMatch::Exact(_) => value * factor,
        OverrideMatch::Reverse(_) => value / factor,
    })
}

/// Compose one override hop with one standard hop, either order.
fn bridge(
    value: f64,
    from: &Unit,
    to: &Unit,
    piece_weight_oz: Option<f64>,
    overrides: &[ConversionOverride],
) -> Option<Result<f64, ConversionFailure>> {
    for o in overrides {
        let hop = if &o.from_unit == from {
            Some((&o.to_unit, OverrideMatch::Exact(o.factor)))
        } else if &o.to_unit == from {
            Some((&o.from_unit, OverrideMatch::Reverse(o.factor)))
        } else {
            None
        };
        if let Some((via, m)) = hop {
            if standard(1.0, via, to, piece_weight_oz).is_ok() {
                return Some(
                    apply_override(value, m).and_then(|v| standard(v, via, to, piece_weight_oz)),
                );
            }
        }
    }

    for o in overrides {
        let hop = if &o.to_unit == to {
            Some((&o.from_unit, OverrideMatch::Exact(o.factor)))
        } else if &o.from_unit == to {
            Some((&o.to_unit, OverrideMatch::Reverse(o.factor)))
        } else {
            None
        };
        if let Some((via, m)) = hop {
            if let Ok(v) = standard(value, from, via, piece_weight_oz) {
                return Some(apply_override(v, m));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitchenplan_core::IngredientId;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let nan = convert(f64::NAN, &Unit::Gram, &Unit::Kilogram, None, None);
        assert!(matches!(nan, Err(ConversionFailure::NonFiniteValue(v)) if v.is_nan()));

        let inf = convert(f64::INFINITY, &Unit::Cup, &Unit::Milliliter, None, None);
        assert!(matches!(inf, Err(ConversionFailure::NonFiniteValue(v)) if v.is_infinite()));
    }

    #[test]
    fn ounces_to_pounds() {
        let lb = convert_str(16.0, "oz", "lb", None, None).unwrap();
        assert!(approx(lb, 1.0), "got {lb}");
    }

    #[test]
    fn gallon_to_fluid_ounces() {
        let fl_oz = convert_str(1.0, "gal", "fl oz", None, None).unwrap();
        assert!(approx(fl_oz, 128.0), "got {fl_oz}");
    }

    #[test]
    fn metric_and_us_volume_agree() {
        let tsp = convert_str(1.0, "tbsp", "tsp", None, None).unwrap();
        assert!(approx(tsp, 3.0));
        let cups = convert_str(1.0, "qt", "cup", None, None).unwrap();
        assert!(approx(cups, 4.0));
        let ml = convert_str(2.0, "L", "ml", None, None).unwrap();
        assert!(approx(ml, 2000.0));
    }

    #[test]
    fn identity_returns_input_even_for_custom_units() {
        assert_eq!(convert_str(3.25, "bunch", "Bunch", None, None), Ok(3.25));
        assert_eq!(convert_str(7.0, "g", "grams", None, None), Ok(7.0));
    }

    #[test]
    fn pieces_to_ounces_use_piece_weight() {
        let oz = convert_str(5.0, "pc", "oz", Some(1.5), None).unwrap();
        assert!(approx(oz, 7.5));
    }

    #[test]
    fn pieces_to_pounds_compose_two_hops() {
        let lb = convert_str(32.0, "each", "lb", Some(2.0), None).unwrap();
        assert!(approx(lb, 4.0));
    }

    #[test]
    fn weight_to_pieces_divides_by_piece_weight() {
        let pcs = convert_str(3.0, "lb", "pc", Some(4.0), None).unwrap();
        assert!(approx(pcs, 12.0));
    }

    #[test]
    fn pieces_without_piece_weight_fail() {
        let err = convert_str(5.0, "pc", "oz", None, None).unwrap_err();
        assert!(matches!(err, ConversionFailure::MissingPieceWeight { .. }));
    }

    #[test]
    fn non_positive_piece_weight_fails() {
        for weight in [0.0, -1.0, f64::NAN] {
            let err = convert_str(5.0, "pc", "oz", Some(weight), None).unwrap_err();
            assert!(matches!(err, ConversionFailure::InvalidPieceWeight(_)));
        }
    }

    #[test]
    fn volume_to_weight_is_incompatible() {
        let err = convert_str(1.0, "cup", "g", None, None).unwrap_err();
        assert_eq!(
            err,
            ConversionFailure::IncompatibleDimensions {
                from: Unit::Cup,
                to: Unit::Gram
            }
        );
    }

    #[test]
    fn override_exact_and_reverse_lookup() {
        let id = IngredientId::new();
        let overrides = vec![ConversionOverride::new(id, Unit::parse("bunch"), Unit::Ounce, 4.0)];

        let oz = convert_str(2.0, "bunch", "oz", None, Some(&overrides)).unwrap();
        assert!(approx(oz, 8.0));

        let bunches = convert_str(2.0, "oz", "bunch", None, Some(&overrides)).unwrap();
        assert!(approx(bunches, 0.5));
    }

    #[test]
    fn override_supersedes_standard_factor() {
        let id = IngredientId::new();
        // A "cup" of shredded cheese packs lighter than the liquid measure implies.
        let overrides = vec![ConversionOverride::new(id, Unit::Cup, Unit::FluidOunce, 6.0)];
        let fl_oz = convert(1.0, &Unit::Cup, &Unit::FluidOunce, None, Some(&overrides)).unwrap();
        assert!(approx(fl_oz, 6.0));
    }

    #[test]
    fn override_hop_composes_with_standard_hop() {
        let id = IngredientId::new();
        let overrides = vec![ConversionOverride::new(id, Unit::parse("bunch"), Unit::Ounce, 4.0)];

        let lb = convert_str(8.0, "bunch", "lb", None, Some(&overrides)).unwrap();
        assert!(approx(lb, 2.0));

        let bunches = convert_str(1.0, "lb", "bunch", None, Some(&overrides)).unwrap();
        assert!(approx(bunches, 4.0));
    }

    #[test]
    fn custom_unit_without_override_fails() {
        let err = convert_str(1.0, "bunch", "oz", None, None).unwrap_err();
        assert!(matches!(err, ConversionFailure::IncompatibleDimensions { .. }));
    }

    #[test]
    fn non_positive_override_factor_fails() {
        let id = IngredientId::new();
        let overrides = vec![ConversionOverride::new(id, Unit::parse("case"), Unit::Each, 0.0)];
        let err = convert_str(1.0, "case", "each", None, Some(&overrides)).unwrap_err();
        assert_eq!(err, ConversionFailure::InvalidOverrideFactor(0.0));
    }

    #[test]
    fn compatibility_agrees_with_conversion() {
        let units = [
            Unit::Gram,
            Unit::Pound,
            Unit::Cup,
            Unit::Teaspoon,
            Unit::Each,
            Unit::Dozen,
            Unit::parse("bunch"),
        ];
        for a in &units {
            for b in &units {
                let ok = convert(1.0, a, b, None, None).is_ok();
                assert_eq!(are_units_compatible(a, b), ok, "{a} -> {b}");
            }
        }
    }

    #[test]
    fn compatibility_with_piece_weight_admits_count_to_weight() {
        assert!(!are_units_compatible(&Unit::Piece, &Unit::Ounce));
        assert!(are_units_compatible_with(&Unit::Piece, &Unit::Ounce, Some(1.5)));
        assert!(!are_units_compatible_with(&Unit::Piece, &Unit::Ounce, Some(0.0)));
        assert!(!are_units_compatible_with(&Unit::Piece, &Unit::Cup, Some(1.5)));
    }

    fn standard_unit() -> impl Strategy<Value = Unit> {
        prop::sample::select(vec![
            Unit::Milligram,
            Unit::Gram,
            Unit::Kilogram,
            Unit::Ounce,
            Unit::Pound,
            Unit::Milliliter,
            Unit::Liter,
            Unit::Teaspoon,
            Unit::Tablespoon,
            Unit::FluidOunce,
            Unit::Cup,
            Unit::Pint,
            Unit::Quart,
            Unit::Gallon,
            Unit::Each,
            Unit::Piece,
            Unit::Dozen,
        ])
    }

    fn same_dimension_pair() -> impl Strategy<Value = (Unit, Unit)> {
        prop::sample::select(vec![Dimension::Weight, Dimension::Volume, Dimension::Count])
            .prop_flat_map(|d| {
                let units = crate::unit::units_in(d).to_vec();
                (
                    prop::sample::select(units.clone()),
                    prop::sample::select(units),
                )
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: converting there and back within a dimension recovers the value.
        #[test]
        fn conversion_is_invertible_within_dimension(
            value in 0.001f64..100_000.0,
            (from, to) in same_dimension_pair(),
        ) {
            let there = convert(value, &from, &to, None, None).unwrap();
            let back = convert(there, &to, &from, None, None).unwrap();
            prop_assert!((back - value).abs() <= 1e-9 * value.max(1.0));
        }

        /// Property: never panics, and succeeds exactly when the predicate says so.
        #[test]
        fn compatibility_predicts_success(
            value in -1_000.0f64..1_000.0,
            from in standard_unit(),
            to in standard_unit(),
        ) {
            let result = convert(value, &from, &to, None, None);
            prop_assert_eq!(result.is_ok(), are_units_compatible(&from, &to));
        }
    }
}
