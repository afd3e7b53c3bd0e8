//! End-to-end scenarios exercising the crate's public API across all seven
//! components together, rather than one module at a time.

use siquant::{parse_scalar, parse_unit, ParseOptions, PeriodicTable, SiqError, UnitLibrary, VolumeFamily};

fn lib() -> UnitLibrary {
    UnitLibrary::new_with_locale(VolumeFamily::UsCustomary)
}

/// S1: parsing `"m/s"` resolves both symbols against the library, reduces to
/// L¹T⁻¹, and carries a coherent (multiplier-1) scale.
#[test]
fn parses_meters_per_second() {
    let mut l = lib();
    let unit = parse_unit("m/s", &mut l, ParseOptions::default()).unwrap();
    assert_eq!(unit.dimensionality().symbol(), "L/T");
    assert_eq!(unit.symbol(), "m/s");
    assert!((unit.scale_to_coherent_si() - 1.0).abs() < 1e-12);
}

/// S2: `"km/h"` converted into `"m/s"` carries the 1000/3600 multiplier.
#[test]
fn converts_kilometers_per_hour_to_meters_per_second() {
    let mut l = lib();
    let km_per_h = parse_unit("km/h", &mut l, ParseOptions::default()).unwrap();
    let m_per_s = parse_unit("m/s", &mut l, ParseOptions::default()).unwrap();
    let factor = km_per_h.conversion_factor(&m_per_s).unwrap();
    assert!((factor - 1000.0 / 3600.0).abs() < 1e-9);
    assert_eq!(m_per_s.symbol(), "m/s");
}

/// S3: cleaning groups and sorts terms without cancelling across sides.
#[test]
fn cleans_repeated_terms_without_cancelling() {
    assert_eq!(siquant::clean("m*m*kg/s/s"), "kg·m^2/s^2");
}

/// S4: clean-and-reduce additionally cancels shared numerator/denominator terms.
#[test]
fn cleans_and_reduces_shared_terms() {
    assert_eq!(siquant::clean_and_reduce("kg*m^2/m"), "kg·m");
}

/// S5: `lb·ft^2/s^2` (an imperial moment-of-inertia-per-time-squared unit)
/// converted to joules comes out to the textbook 0.0421401 J-per-unit figure.
#[test]
fn converts_pound_foot_squared_per_second_squared_to_joules() {
    let mut l = lib();
    let table = PeriodicTable::new();
    let joule = parse_unit("J", &mut l, ParseOptions::default()).unwrap();
    let value = parse_scalar("1 lb*ft^2/s^2", &mut l, &table).unwrap();
    let converted = value.convert_to(&joule).unwrap();
    assert!((converted.real_part() - 0.0421401).abs() < 1e-6, "got {}", converted.real_part());
}

/// S6: the proton's gyromagnetic ratio is about 2.6752219e8 rad/(s·T).
#[test]
fn proton_gyromagnetic_ratio_matches_known_value() {
    let table = PeriodicTable::new();
    let gamma = table.gyromagnetic_ratio("1H").unwrap();
    assert!((gamma - 2.6752219e8).abs() / 2.6752219e8 < 1e-4, "got {}", gamma);
}

/// S7: `cos(0)` evaluates to the dimensionless real value 1.
#[test]
fn cosine_of_zero_is_one() {
    let mut l = lib();
    let table = PeriodicTable::new();
    let s = parse_scalar("cos(0)", &mut l, &table).unwrap();
    assert!((s.real_part() - 1.0).abs() < 1e-12);
    assert!(s.unit.is_dimensionless());
}

/// S8: `sin` of a length-valued argument is rejected, not silently evaluated.
#[test]
fn sine_of_a_length_is_rejected() {
    let mut l = lib();
    let table = PeriodicTable::new();
    assert!(matches!(
        parse_scalar("sin(1 m)", &mut l, &table),
        Err(SiqError::IncompatibleDimensionality { .. })
    ));
}

/// S9: a fractional unit exponent is rejected outright.
#[test]
fn fractional_unit_exponent_is_rejected() {
    let mut l = lib();
    assert_eq!(
        parse_unit("m^(1/2)", &mut l, ParseOptions::default()),
        Err(SiqError::FractionalExponent)
    );
}

/// S10: switching to the imperial volume family changes the gallon-to-liter
/// multiplier to 4.54609.
#[test]
fn imperial_gallon_converts_to_liter_at_4_54609() {
    let mut l = UnitLibrary::new_with_locale(VolumeFamily::Imperial);
    let gallon = parse_unit("gal", &mut l, ParseOptions::default()).unwrap();
    let liter = parse_unit("L", &mut l, ParseOptions::default()).unwrap();
    let factor = gallon.conversion_factor(&liter).unwrap();
    assert!((factor - 4.54609).abs() < 1e-9);
}
