//! Interned unit handles (C2).

use crate::dimensionality::{BaseDimension, Dimensionality, BASE_DIMENSIONS};
use crate::errors::SiqError;
use crate::library::UnitLibrary;
use crate::prefix::SiPrefix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Per-dimension SI prefix exponents carried by a unit's numerator/denominator,
/// e.g. `km/s` carries `Kilo` on length's numerator and `None` everywhere else.
pub type PrefixRow = [SiPrefix; 7];

pub const NO_PREFIXES: PrefixRow = [SiPrefix::None; 7];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct UnitInner {
    dimensionality: Dimensionality,
    #[serde(with = "prefix_row_serde")]
    num_prefix: PrefixRow,
    #[serde(with = "prefix_row_serde")]
    den_prefix: PrefixRow,
    root_name: Option<String>,
    root_plural_name: Option<String>,
    root_symbol: Option<String>,
    root_symbol_prefix: SiPrefix,
    allows_si_prefix: bool,
    is_special_si_symbol: bool,
    scale_to_coherent_si: f64,
    symbol: String,
    key: String,
}

/// A canonically-interned unit handle.
///
/// Two `Unit`s with the same `key()` are the same unit: cloning is cheap
/// (`Rc` bump), and equality compares the interned key rather than contents.
#[derive(Debug, Clone)]
pub struct Unit(pub(crate) Rc<UnitInner>);

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.0.key == other.0.key
    }
}
impl Eq for Unit {}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.symbol)
    }
}

mod prefix_row_serde {
    use crate::prefix::SiPrefix;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(row: &[SiPrefix; 7], s: S) -> Result<S::Ok, S::Error> {
        let exps: Vec<i32> = row.iter().map(|p| p.exponent()).collect();
        exps.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[SiPrefix; 7], D::Error> {
        let exps: Vec<i32> = Vec::deserialize(d)?;
        if exps.len() != 7 {
            return Err(serde::de::Error::custom("prefix row must have 7 entries"));
        }
        let mut row = [SiPrefix::None; 7];
        for (i, e) in exps.into_iter().enumerate() {
            row[i] = SiPrefix::from_exponent(e)
                .ok_or_else(|| serde::de::Error::custom("invalid SI prefix exponent"))?;
        }
        Ok(row)
    }
}

impl Unit {
    pub(crate) fn from_parts(
        dimensionality: Dimensionality,
        num_prefix: PrefixRow,
        den_prefix: PrefixRow,
        root_name: Option<String>,
        root_plural_name: Option<String>,
        root_symbol: Option<String>,
        root_symbol_prefix: SiPrefix,
        allows_si_prefix: bool,
        is_special_si_symbol: bool,
        scale_to_coherent_si: f64,
    ) -> Unit {
        let symbol = build_symbol(
            &dimensionality,
            &num_prefix,
            &den_prefix,
            root_symbol.as_deref(),
            root_symbol_prefix,
            is_special_si_symbol,
        );
        let key = build_key(&num_prefix, &den_prefix, root_symbol.as_deref(), &dimensionality);
        Unit(Rc::new(UnitInner {
            dimensionality,
            num_prefix,
            den_prefix,
            root_name,
            root_plural_name,
            root_symbol,
            root_symbol_prefix,
            allows_si_prefix,
            is_special_si_symbol,
            scale_to_coherent_si,
            symbol,
            key,
        }))
    }

    /// The pure-number unit: no dimensionality, no symbol, unity scale.
    pub fn dimensionless() -> Unit {
        Unit::from_parts(
            Dimensionality::DIMENSIONLESS,
            NO_PREFIXES,
            NO_PREFIXES,
            None,
            None,
            None,
            SiPrefix::None,
            false,
            false,
            1.0,
        )
    }

    pub fn dimensionality(&self) -> Dimensionality {
        self.0.dimensionality
    }
    pub fn num_prefix(&self) -> PrefixRow {
        self.0.num_prefix
    }
    pub fn den_prefix(&self) -> PrefixRow {
        self.0.den_prefix
    }
    pub fn root_name(&self) -> Option<&str> {
        self.0.root_name.as_deref()
    }
    pub fn root_plural_name(&self) -> Option<&str> {
        self.0.root_plural_name.as_deref()
    }
    pub fn root_symbol(&self) -> Option<&str> {
        self.0.root_symbol.as_deref()
    }
    pub fn root_symbol_prefix(&self) -> SiPrefix {
        self.0.root_symbol_prefix
    }
    pub fn allows_si_prefix(&self) -> bool {
        self.0.allows_si_prefix
    }
    pub fn is_special_si_symbol(&self) -> bool {
        self.0.is_special_si_symbol
    }
    pub fn scale_to_coherent_si(&self) -> f64 {
        self.0.scale_to_coherent_si
    }
    pub fn symbol(&self) -> &str {
        &self.0.symbol
    }
    pub fn key(&self) -> &str {
        &self.0.key
    }

    /// A unit is a *coherent derived* unit iff its scale is 1, it carries no
    /// root/special symbol of its own, all prefixes are none (mass excepted,
    /// which is coherent at kilo), and it is not itself one of the bases.
    pub fn is_coherent_derived(&self) -> bool {
        if self.0.root_symbol.is_some() || self.0.is_special_si_symbol {
            return false;
        }
        if (self.0.scale_to_coherent_si - 1.0).abs() > f64::EPSILON {
            return false;
        }
        for dim in BASE_DIMENSIONS {
            let expected = if dim == BaseDimension::Mass {
                SiPrefix::Kilo
            } else {
                SiPrefix::None
            };
            if self.0.num_prefix[dim.index()] != expected && self.0.num_prefix[dim.index()] != SiPrefix::None {
                return false;
            }
            if self.0.den_prefix[dim.index()] != expected && self.0.den_prefix[dim.index()] != SiPrefix::None {
                return false;
            }
        }
        true
    }

    /// Dimensionless check that also requires unity scale (a "pure number" unit).
    pub fn is_dimensionless(&self) -> bool {
        self.0.dimensionality.is_dimensionless()
    }

    pub fn multiply_without_reducing(&self, other: &Unit, lib: &UnitLibrary) -> Result<Unit, SiqError> {
        combine(self, other, 1, lib)
    }

    pub fn multiply(&self, other: &Unit, lib: &UnitLibrary) -> Result<Unit, SiqError> {
        self.multiply_without_reducing(other, lib).map(|u| u.reduce(lib))
    }

    pub fn divide_without_reducing(&self, other: &Unit, lib: &UnitLibrary) -> Result<Unit, SiqError> {
        combine(self, other, -1, lib)
    }

    pub fn divide(&self, other: &Unit, lib: &UnitLibrary) -> Result<Unit, SiqError> {
        self.divide_without_reducing(other, lib).map(|u| u.reduce(lib))
    }

    pub fn power_without_reducing(&self, n: i32) -> Unit {
        let dimensionality = self.0.dimensionality.power_without_reducing(n);
        let mut num_prefix = self.0.num_prefix;
        let mut den_prefix = self.0.den_prefix;
        if n < 0 {
            std::mem::swap(&mut num_prefix, &mut den_prefix);
        }
        Unit::from_parts(
            dimensionality,
            num_prefix,
            den_prefix,
            None,
            None,
            None,
            SiPrefix::None,
            false,
            false,
            self.0.scale_to_coherent_si.powi(n),
        )
    }

    pub fn power(&self, n: i32, lib: &UnitLibrary) -> Unit {
        self.power_without_reducing(n).reduce(lib)
    }

    pub fn nth_root(&self, n: u32) -> Result<Unit, SiqError> {
        let dimensionality = self.0.dimensionality.nth_root(n)?;
        let scale = self.0.scale_to_coherent_si.powf(1.0 / n as f64);
        Ok(Unit::from_parts(
            dimensionality,
            self.0.num_prefix,
            self.0.den_prefix,
            None,
            None,
            None,
            SiPrefix::None,
            false,
            false,
            scale,
        ))
    }

    /// Cancels identical dimensions between numerator and denominator, then
    /// hands the result to `lib` to find the shortest-symbol unit this
    /// reduced quantity is equivalent to (same dimensionality, same
    /// coherent-SI scale) — mirrors `SIUnitByReducing`.
    pub fn reduce(&self, lib: &UnitLibrary) -> Unit {
        let reduced = self.0.dimensionality.reduce();
        if reduced == self.0.dimensionality {
            return lib.find_equivalent_unit_with_shortest_symbol(self);
        }
        let candidate = Unit::from_parts(
            reduced,
            self.0.num_prefix,
            self.0.den_prefix,
            None,
            None,
            None,
            SiPrefix::None,
            false,
            false,
            self.0.scale_to_coherent_si,
        );
        lib.find_equivalent_unit_with_shortest_symbol(&candidate)
    }

    /// Two units are equivalent iff same reduced dimensionality and equal
    /// (to within floating point tolerance) coherent-SI scale.
    pub fn equivalent(&self, other: &Unit) -> bool {
        self.0.dimensionality.has_same_reduced(&other.0.dimensionality)
            && (self.0.scale_to_coherent_si - other.0.scale_to_coherent_si).abs()
                <= 1e-12 * self.0.scale_to_coherent_si.abs().max(other.0.scale_to_coherent_si.abs()).max(1.0)
    }

    /// Multiply-by factor to convert a value expressed in `self` into `other`.
    pub fn conversion_factor(&self, other: &Unit) -> Result<f64, SiqError> {
        if !self.0.dimensionality.has_same_reduced(&other.0.dimensionality) {
            return Err(SiqError::IncompatibleDimensionality {
                a: self.0.dimensionality,
                b: other.0.dimensionality,
            });
        }
        Ok(self.0.scale_to_coherent_si / other.0.scale_to_coherent_si)
    }
}

fn combine(a: &Unit, b: &Unit, sign: i32, lib: &UnitLibrary) -> Result<Unit, SiqError> {
    if sign < 0 && b.0.scale_to_coherent_si == 0.0 {
        return Err(SiqError::DivisionByZero);
    }

    // Multiplying/dividing by the dimensionless, underived identity leaves
    // the other operand untouched.
    let dimless = Unit::dimensionless();
    if *a == dimless {
        if sign > 0 {
            return Ok(b.clone());
        }
    } else if *b == dimless {
        return Ok(a.clone());
    }

    let scale = if sign > 0 {
        a.0.scale_to_coherent_si * b.0.scale_to_coherent_si
    } else {
        a.0.scale_to_coherent_si / b.0.scale_to_coherent_si
    };

    // Work from each operand's "pure" derived form, so a named unit that is
    // just a re-export of an already-anonymous combination (e.g. a
    // user-registered "m/s") composes as its underlying dimensions rather
    // than growing another symbol layer.
    let d1 = find_equivalent_derived(a, lib);
    let d2 = find_equivalent_derived(b, lib);

    let dimensionality = if sign > 0 {
        d1.0.dimensionality.multiply_without_reducing(&d2.0.dimensionality)
    } else {
        d1.0.dimensionality.divide_without_reducing(&d2.0.dimensionality)
    };

    let mut num_prefix = NO_PREFIXES;
    let mut den_prefix = NO_PREFIXES;
    for dim in BASE_DIMENSIONS {
        let idx = dim.index();
        let (a_num_prefix, a_den_prefix) = (d1.0.num_prefix[idx], d1.0.den_prefix[idx]);
        let (a_num_exp, a_den_exp) = (d1.0.dimensionality.num_exp(dim), d1.0.dimensionality.den_exp(dim));
        let (b_num_prefix, b_den_prefix) = (d2.0.num_prefix[idx], d2.0.den_prefix[idx]);
        let (b_num_exp, b_den_exp) = (d2.0.dimensionality.num_exp(dim), d2.0.dimensionality.den_exp(dim));
        if sign > 0 {
            num_prefix[idx] = weighted_prefix(a_num_prefix, a_num_exp, b_num_prefix, b_num_exp, dimensionality.num_exp(dim), dim);
            den_prefix[idx] = weighted_prefix(a_den_prefix, a_den_exp, b_den_prefix, b_den_exp, dimensionality.den_exp(dim), dim);
        } else {
            num_prefix[idx] = weighted_prefix(a_num_prefix, a_num_exp, b_den_prefix, b_den_exp, dimensionality.num_exp(dim), dim);
            den_prefix[idx] = weighted_prefix(a_den_prefix, a_den_exp, b_num_prefix, b_num_exp, dimensionality.den_exp(dim), dim);
        }
    }

    // Both operands carry their own named symbol (e.g. `N`, `hp`): preserve
    // a composite symbol instead of falling back to the generic per-dimension
    // rendering, so `newton * meter` reads `N·m`, not an exponent splice.
    if let (Some(s1), Some(s2)) = (d1.root_symbol(), d2.root_symbol()) {
        let separator = if sign > 0 { "\u{b7}" } else { "/" };
        let symbol = format!(
            "{}{}{}{}{}",
            d1.root_symbol_prefix().symbol(),
            s1,
            separator,
            d2.root_symbol_prefix().symbol(),
            s2
        );
        return Ok(Unit::from_parts(
            dimensionality,
            num_prefix,
            den_prefix,
            None,
            None,
            Some(symbol),
            SiPrefix::None,
            false,
            false,
            scale,
        ));
    }

    Ok(Unit::from_parts(
        dimensionality,
        num_prefix,
        den_prefix,
        None,
        None,
        None,
        SiPrefix::None,
        false,
        false,
        scale,
    ))
}

/// The unit `a.divide_without_reducing`/`multiply_without_reducing` should
/// actually combine against: `unit` itself unless the library holds a
/// coherent derived (anonymous, scale-1) unit of the same dimensionality
/// whose scale is closer to `unit`'s — mirrors `SIUnitFindEquivalentDerivedSIUnit`.
fn find_equivalent_derived(unit: &Unit, lib: &UnitLibrary) -> Unit {
    if unit.root_symbol().is_none() {
        return unit.clone();
    }
    let mut best: Option<Unit> = None;
    let mut best_log_ratio = f64::INFINITY;
    for candidate in lib.equivalent_units(unit) {
        if !candidate.is_coherent_derived() {
            continue;
        }
        let ratio = (candidate.scale_to_coherent_si() / unit.scale_to_coherent_si()).ln().abs();
        if ratio < best_log_ratio {
            best_log_ratio = ratio;
            best = Some(candidate);
        }
    }
    best.unwrap_or_else(|| unit.clone())
}

/// Per-dimension prefix for a combined unit: a weighted average of the two
/// operands' prefixes, weighted by each operand's own exponent contribution
/// in that dimension, then clamped to the nearest representable SI prefix.
/// When the dimension cancels entirely in the result, there is nothing to
/// weight by, so it falls back to the coherent default (kilo for mass, none
/// otherwise) — mirrors the `raw_prefix / exp` step in `SIUnitByMultiplyingWithoutReducing`.
fn weighted_prefix(a: SiPrefix, a_exp: i16, b: SiPrefix, b_exp: i16, result_exp: i16, dim: BaseDimension) -> SiPrefix {
    if result_exp == 0 {
        return if dim == BaseDimension::Mass { SiPrefix::Kilo } else { SiPrefix::None };
    }
    let raw = a.exponent() * a_exp as i32 + b.exponent() * b_exp as i32;
    SiPrefix::closest_for(raw / result_exp as i32)
}

fn build_key(
    num_prefix: &PrefixRow,
    den_prefix: &PrefixRow,
    root_symbol: Option<&str>,
    dimensionality: &Dimensionality,
) -> String {
    match root_symbol {
        Some(sym) => {
            let num: String = num_prefix.iter().map(|p| p.symbol()).collect();
            let den: String = den_prefix.iter().map(|p| p.symbol()).collect();
            format!("{}|{}|{}", num, sym, den)
        }
        None => format!("derived:{}", dimensionality.symbol()),
    }
}

/// Ports `SIUnitCreateSymbol`'s branching: any unit carrying its own root
/// symbol (special SI symbols, named non-SI units, and composite symbols
/// built by `combine`) renders as `prefix + symbol` unconditionally;
/// otherwise the canonical dimensionality symbol is built with per-dimension
/// prefixes spliced onto the base unit symbols.
fn build_symbol(
    dimensionality: &Dimensionality,
    num_prefix: &PrefixRow,
    den_prefix: &PrefixRow,
    root_symbol: Option<&str>,
    root_symbol_prefix: SiPrefix,
    _is_special_si_symbol: bool,
) -> String {
    if let Some(sym) = root_symbol {
        return format!("{}{}", root_symbol_prefix.symbol(), sym);
    }
    if dimensionality.is_dimensionless_and_not_derived() {
        return String::new();
    }

    let side = |exps: &dyn Fn(BaseDimension) -> i16, prefixes: &PrefixRow| -> Vec<String> {
        BASE_DIMENSIONS
            .iter()
            .filter_map(|&d| {
                let e = exps(d);
                if e == 0 {
                    return None;
                }
                let base = d.base_unit_root_symbol();
                let p = prefixes[d.index()].symbol();
                if e == 1 {
                    Some(format!("{}{}", p, base))
                } else {
                    Some(format!("{}{}^{}", p, base, e))
                }
            })
            .collect()
    };

    let num_parts = side(&|d| dimensionality.num_exp(d), num_prefix);
    let den_parts = side(&|d| dimensionality.den_exp(d), den_prefix);

    let num_str = if num_parts.is_empty() {
        "1".to_string()
    } else {
        num_parts.join("·")
    };
    if den_parts.is_empty() {
        num_str
    } else if den_parts.len() == 1 {
        format!("{}/{}", num_str, den_parts[0])
    } else {
        format!("{}/({})", num_str, den_parts.join("·"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meter() -> Unit {
        Unit::from_parts(
            Dimensionality::for_base(BaseDimension::Length),
            NO_PREFIXES,
            NO_PREFIXES,
            Some("meter".into()),
            Some("meters".into()),
            Some("m".into()),
            SiPrefix::None,
            true,
            false,
            1.0,
        )
    }

    fn second() -> Unit {
        Unit::from_parts(
            Dimensionality::for_base(BaseDimension::Time),
            NO_PREFIXES,
            NO_PREFIXES,
            Some("second".into()),
            Some("seconds".into()),
            Some("s".into()),
            SiPrefix::None,
            true,
            false,
            1.0,
        )
    }

    fn kilometer() -> Unit {
        let mut num = NO_PREFIXES;
        num[BaseDimension::Length.index()] = SiPrefix::Kilo;
        Unit::from_parts(
            Dimensionality::for_base(BaseDimension::Length),
            num,
            NO_PREFIXES,
            Some("meter".into()),
            Some("meters".into()),
            Some("m".into()),
            SiPrefix::None,
            true,
            false,
            1000.0,
        )
    }

    fn newton() -> Unit {
        let dim = Dimensionality::for_base(BaseDimension::Mass)
            .multiply_without_reducing(&Dimensionality::for_base(BaseDimension::Length))
            .divide_without_reducing(&Dimensionality::for_base(BaseDimension::Time).power_without_reducing(2));
        Unit::from_parts(
            dim,
            NO_PREFIXES,
            NO_PREFIXES,
            Some("newton".into()),
            Some("newtons".into()),
            Some("N".into()),
            SiPrefix::None,
            true,
            true,
            1.0,
        )
    }

    #[test]
    fn conversion_factor_between_meter_and_kilometer() {
        let m = meter();
        let km = kilometer();
        assert!((m.conversion_factor(&km).unwrap() - 0.001).abs() < 1e-12);
        assert!((km.conversion_factor(&m).unwrap() - 1000.0).abs() < 1e-12);
    }

    #[test]
    fn incompatible_dimensionality_errors() {
        let m = meter();
        let s = second();
        assert!(matches!(
            m.conversion_factor(&s),
            Err(SiqError::IncompatibleDimensionality { .. })
        ));
    }

    #[test]
    fn division_by_itself_reduces_to_dimensionless() {
        let lib = UnitLibrary::new();
        let m = meter();
        let ratio = m.divide(&m, &lib).unwrap();
        assert!(ratio.dimensionality().is_dimensionless());
    }

    #[test]
    fn velocity_combines_length_and_time() {
        let lib = UnitLibrary::new();
        let m = meter();
        let s = second();
        let v = m.divide(&s, &lib).unwrap();
        assert_eq!(v.dimensionality().symbol(), "L/T");
        assert!((v.scale_to_coherent_si() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn dividing_named_units_preserves_a_composite_symbol() {
        let lib = UnitLibrary::new();
        let m = meter();
        let s = second();
        let v = m.divide(&s, &lib).unwrap();
        assert_eq!(v.root_symbol(), Some("m/s"));
        assert_eq!(v.symbol(), "m/s");
        assert!(!v.is_coherent_derived());
        assert!(!m.is_coherent_derived());
    }

    #[test]
    fn multiplying_named_units_preserves_a_composite_symbol() {
        let lib = UnitLibrary::new();
        let n = newton();
        let m = meter();
        let torque = n.multiply_without_reducing(&m, &lib).unwrap();
        assert_eq!(torque.root_symbol(), Some("N\u{b7}m"));
        assert_eq!(torque.symbol(), "N\u{b7}m");
        assert!((torque.scale_to_coherent_si() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn combining_with_dimensionless_identity_returns_other_operand_unchanged() {
        let lib = UnitLibrary::new();
        let m = meter();
        let one = Unit::dimensionless();
        assert_eq!(m.multiply_without_reducing(&one, &lib).unwrap(), m);
        assert_eq!(one.multiply_without_reducing(&m, &lib).unwrap(), m);
        assert_eq!(m.divide_without_reducing(&one, &lib).unwrap(), m);
    }

    #[test]
    fn prefix_averaging_is_weighted_by_exponent_contribution() {
        let lib = UnitLibrary::new();
        let mut km_num = NO_PREFIXES;
        km_num[BaseDimension::Length.index()] = SiPrefix::Kilo;
        let area_km2 = Unit::from_parts(
            Dimensionality::for_base(BaseDimension::Length).power_without_reducing(2),
            km_num,
            NO_PREFIXES,
            None,
            None,
            None,
            SiPrefix::None,
            false,
            false,
            1.0e6,
        );
        let m = meter();
        let volume = area_km2.multiply_without_reducing(&m, &lib).unwrap();
        assert_eq!(volume.num_prefix()[BaseDimension::Length.index()], SiPrefix::Hecto);
    }

    #[test]
    fn equal_keys_imply_equality() {
        let a = meter();
        let b = meter();
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn unit_inner_round_trips_through_json() {
        let km = kilometer();
        let json = serde_json::to_string(&*km.0).unwrap();
        let back: UnitInner = serde_json::from_str(&json).unwrap();
        assert_eq!(back, *km.0);
    }
}
