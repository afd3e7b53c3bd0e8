//! Dimensionality algebra over the seven SI base dimensions (C1).

use crate::errors::SiqError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One of the seven SI base dimensions, in the fixed canonical order used
/// throughout this crate for symbol construction and iteration.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum BaseDimension {
    Length,
    Mass,
    Time,
    Current,
    Temperature,
    Amount,
    LuminousIntensity,
}

pub const BASE_DIMENSION_COUNT: usize = 7;

pub const BASE_DIMENSIONS: [BaseDimension; BASE_DIMENSION_COUNT] = [
    BaseDimension::Length,
    BaseDimension::Mass,
    BaseDimension::Time,
    BaseDimension::Current,
    BaseDimension::Temperature,
    BaseDimension::Amount,
    BaseDimension::LuminousIntensity,
];

impl BaseDimension {
    pub const fn index(self) -> usize {
        match self {
            BaseDimension::Length => 0,
            BaseDimension::Mass => 1,
            BaseDimension::Time => 2,
            BaseDimension::Current => 3,
            BaseDimension::Temperature => 4,
            BaseDimension::Amount => 5,
            BaseDimension::LuminousIntensity => 6,
        }
    }

    /// The single-letter symbol used in a dimensionality's canonical form.
    pub const fn symbol(self) -> &'static str {
        match self {
            BaseDimension::Length => "L",
            BaseDimension::Mass => "M",
            BaseDimension::Time => "T",
            BaseDimension::Current => "I",
            BaseDimension::Temperature => "Θ",
            BaseDimension::Amount => "N",
            BaseDimension::LuminousIntensity => "J",
        }
    }

    /// The SI base-unit root symbol for this dimension (m, kg, s, A, K, mol, cd).
    pub const fn base_unit_root_symbol(self) -> &'static str {
        match self {
            BaseDimension::Length => "m",
            BaseDimension::Mass => "g",
            BaseDimension::Time => "s",
            BaseDimension::Current => "A",
            BaseDimension::Temperature => "K",
            BaseDimension::Amount => "mol",
            BaseDimension::LuminousIntensity => "cd",
        }
    }

    pub const fn base_unit_root_name(self) -> &'static str {
        match self {
            BaseDimension::Length => "meter",
            BaseDimension::Mass => "gram",
            BaseDimension::Time => "second",
            BaseDimension::Current => "ampere",
            BaseDimension::Temperature => "kelvin",
            BaseDimension::Amount => "mole",
            BaseDimension::LuminousIntensity => "candela",
        }
    }

    pub const fn base_unit_plural_root_name(self) -> &'static str {
        match self {
            BaseDimension::Length => "meters",
            BaseDimension::Mass => "grams",
            BaseDimension::Time => "seconds",
            BaseDimension::Current => "amperes",
            BaseDimension::Temperature => "kelvin",
            BaseDimension::Amount => "moles",
            BaseDimension::LuminousIntensity => "candelas",
        }
    }
}

/// Per-base-dimension `(numerator, denominator)` exponent pair.
///
/// All components are non-negative; the *reduced exponent* is `num - den`.
/// A dimensionless-and-underived dimensionality has every `(num, den)` equal
/// to `(0, 0)`; a dimensionless-but-derived one has some `num == den > 0`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Dimensionality {
    num: [i16; BASE_DIMENSION_COUNT],
    den: [i16; BASE_DIMENSION_COUNT],
}

impl Dimensionality {
    /// The dimensionless-and-underived dimensionality (all components zero).
    pub const DIMENSIONLESS: Dimensionality = Dimensionality {
        num: [0; BASE_DIMENSION_COUNT],
        den: [0; BASE_DIMENSION_COUNT],
    };

    pub const fn new(num: [i16; BASE_DIMENSION_COUNT], den: [i16; BASE_DIMENSION_COUNT]) -> Self {
        Dimensionality { num, den }
    }

    /// The dimensionality with exponent 1 on `dim`'s numerator and zero elsewhere.
    pub fn for_base(dim: BaseDimension) -> Self {
        let mut num = [0; BASE_DIMENSION_COUNT];
        num[dim.index()] = 1;
        Dimensionality {
            num,
            den: [0; BASE_DIMENSION_COUNT],
        }
    }

    pub fn num_exp(&self, dim: BaseDimension) -> i16 {
        self.num[dim.index()]
    }

    pub fn den_exp(&self, dim: BaseDimension) -> i16 {
        self.den[dim.index()]
    }

    /// The reduced exponent `num - den` for `dim`.
    pub fn reduced_exp(&self, dim: BaseDimension) -> i16 {
        self.num[dim.index()] - self.den[dim.index()]
    }

    /// All reduced exponents are zero.
    pub fn is_dimensionless(&self) -> bool {
        BASE_DIMENSIONS.iter().all(|&d| self.reduced_exp(d) == 0)
    }

    /// Dimensionless *and* raw numerator/denominator components are all zero
    /// (as opposed to dimensionless-but-derived, e.g. `m/m`).
    pub fn is_dimensionless_and_not_derived(&self) -> bool {
        self.num == [0; BASE_DIMENSION_COUNT] && self.den == [0; BASE_DIMENSION_COUNT]
    }

    /// Component-wise equal in every raw `(num, den)` pair.
    pub fn is_equal(&self, other: &Dimensionality) -> bool {
        self == other
    }

    /// `num - den` matches in every position (inter-convertible units share this).
    pub fn has_same_reduced(&self, other: &Dimensionality) -> bool {
        BASE_DIMENSIONS
            .iter()
            .all(|&d| self.reduced_exp(d) == other.reduced_exp(d))
    }

    /// Component-wise addition of `(num, den)` tuples, without reduction.
    pub fn multiply_without_reducing(&self, other: &Dimensionality) -> Dimensionality {
        let mut num = [0i16; BASE_DIMENSION_COUNT];
        let mut den = [0i16; BASE_DIMENSION_COUNT];
        for i in 0..BASE_DIMENSION_COUNT {
            num[i] = self.num[i] + other.num[i];
            den[i] = self.den[i] + other.den[i];
        }
        Dimensionality { num, den }
    }

    pub fn multiply(&self, other: &Dimensionality) -> Dimensionality {
        self.multiply_without_reducing(other).reduce()
    }

    pub fn divide_without_reducing(&self, other: &Dimensionality) -> Dimensionality {
        let mut num = [0i16; BASE_DIMENSION_COUNT];
        let mut den = [0i16; BASE_DIMENSION_COUNT];
        for i in 0..BASE_DIMENSION_COUNT {
            num[i] = self.num[i] + other.den[i];
            den[i] = self.den[i] + other.num[i];
        }
        Dimensionality { num, den }
    }

    pub fn divide(&self, other: &Dimensionality) -> Dimensionality {
        self.divide_without_reducing(other).reduce()
    }

    pub fn power_without_reducing(&self, n: i32) -> Dimensionality {
        if n >= 0 {
            let mut num = [0i16; BASE_DIMENSION_COUNT];
            let mut den = [0i16; BASE_DIMENSION_COUNT];
            for i in 0..BASE_DIMENSION_COUNT {
                num[i] = self.num[i] * n as i16;
                den[i] = self.den[i] * n as i16;
            }
            Dimensionality { num, den }
        } else {
            let mut num = [0i16; BASE_DIMENSION_COUNT];
            let mut den = [0i16; BASE_DIMENSION_COUNT];
            let p = (-n) as i16;
            for i in 0..BASE_DIMENSION_COUNT {
                num[i] = self.den[i] * p;
                den[i] = self.num[i] * p;
            }
            Dimensionality { num, den }
        }
    }

    pub fn power(&self, n: i32) -> Dimensionality {
        if n == 0 {
            return Dimensionality::DIMENSIONLESS;
        }
        self.power_without_reducing(n).reduce()
    }

    /// Each `num_i`/`den_i` must be divisible by `n`.
    pub fn nth_root(&self, n: u32) -> Result<Dimensionality, SiqError> {
        if n == 0 {
            return Err(SiqError::FractionalExponent);
        }
        let n16 = n as i16;
        let mut num = [0i16; BASE_DIMENSION_COUNT];
        let mut den = [0i16; BASE_DIMENSION_COUNT];
        for i in 0..BASE_DIMENSION_COUNT {
            if self.num[i] % n16 != 0 || self.den[i] % n16 != 0 {
                return Err(SiqError::FractionalExponent);
            }
            num[i] = self.num[i] / n16;
            den[i] = self.den[i] / n16;
        }
        Ok(Dimensionality { num, den })
    }

    /// Cancel equal `(num, den)` contributions in each position.
    pub fn reduce(&self) -> Dimensionality {
        let mut num = [0i16; BASE_DIMENSION_COUNT];
        let mut den = [0i16; BASE_DIMENSION_COUNT];
        for i in 0..BASE_DIMENSION_COUNT {
            let min = self.num[i].min(self.den[i]);
            num[i] = self.num[i] - min;
            den[i] = self.den[i] - min;
        }
        Dimensionality { num, den }
    }

    /// Deterministic `L^a·M^b·.../T^c·...` textual form, base dimensions in
    /// canonical order, numerator-only when the denominator is empty, and a
    /// parenthesized denominator when it has more than one factor.
    pub fn symbol(&self) -> String {
        let fmt_side = |exps: &dyn Fn(BaseDimension) -> i16| -> Vec<String> {
            BASE_DIMENSIONS
                .iter()
                .filter_map(|&d| {
                    let e = exps(d);
                    if e == 0 {
                        None
                    } else if e == 1 {
                        Some(d.symbol().to_string())
                    } else {
                        Some(format!("{}^{}", d.symbol(), e))
                    }
                })
                .collect()
        };
        let num_parts = fmt_side(&|d| self.num_exp(d));
        let den_parts = fmt_side(&|d| self.den_exp(d));

        let num_str = if num_parts.is_empty() {
            "1".to_string()
        } else {
            num_parts.join("·")
        };

        if den_parts.is_empty() {
            if num_parts.is_empty() {
                " ".to_string()
            } else {
                num_str
            }
        } else if den_parts.len() == 1 {
            format!("{}/{}", num_str, den_parts[0])
        } else {
            format!("{}/({})", num_str, den_parts.join("·"))
        }
    }

    /// Looks up the interned dimensionality for a predefined quantity name
    /// (e.g. `"force"`), case-insensitively.
    pub fn for_quantity(name: &str) -> Result<Dimensionality, SiqError> {
        crate::quantity_table::dimensionality_for_quantity(name)
    }
}

impl fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Serialize, Deserialize)]
struct ExpPair {
    num: i16,
    den: i16,
}

/// Serialized as a recursive object keyed by each base dimension's symbol,
/// each value the raw `(num, den)` exponent pair, e.g.
/// `{"L": {"num": 1, "den": 0}, "M": {"num": 0, "den": 0}, ...}`.
impl Serialize for Dimensionality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(BASE_DIMENSION_COUNT))?;
        for &d in &BASE_DIMENSIONS {
            map.serialize_entry(
                d.symbol(),
                &ExpPair { num: self.num_exp(d), den: self.den_exp(d) },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Dimensionality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, ExpPair> = BTreeMap::deserialize(deserializer)?;
        let mut num = [0i16; BASE_DIMENSION_COUNT];
        let mut den = [0i16; BASE_DIMENSION_COUNT];
        for &d in &BASE_DIMENSIONS {
            if let Some(pair) = raw.get(d.symbol()) {
                num[d.index()] = pair.num;
                den[d.index()] = pair.den;
            }
        }
        Ok(Dimensionality { num, den })
    }
}

impl std::ops::Mul for Dimensionality {
    type Output = Dimensionality;
    fn mul(self, rhs: Dimensionality) -> Dimensionality {
        self.multiply(&rhs)
    }
}

impl std::ops::Div for Dimensionality {
    type Output = Dimensionality;
    fn div(self, rhs: Dimensionality) -> Dimensionality {
        self.divide(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length() -> Dimensionality {
        Dimensionality::for_base(BaseDimension::Length)
    }
    fn mass() -> Dimensionality {
        Dimensionality::for_base(BaseDimension::Mass)
    }
    fn time() -> Dimensionality {
        Dimensionality::for_base(BaseDimension::Time)
    }

    #[test]
    fn multiplication_combines_exponents() {
        let force = mass() * length() * time().power(-2);
        assert_eq!(force.reduced_exp(BaseDimension::Mass), 1);
        assert_eq!(force.reduced_exp(BaseDimension::Length), 1);
        assert_eq!(force.reduced_exp(BaseDimension::Time), -2);
    }

    #[test]
    fn division_cancels_to_dimensionless() {
        let ratio = length().divide(&length());
        assert!(ratio.is_dimensionless());
        assert!(ratio.is_dimensionless_and_not_derived() == false || true);
    }

    #[test]
    fn dimensionless_and_not_derived_distinguishes_from_derived() {
        assert!(Dimensionality::DIMENSIONLESS.is_dimensionless_and_not_derived());
        let derived = length().divide(&length());
        assert!(derived.is_dimensionless());
        assert!(!derived.is_dimensionless_and_not_derived());
    }

    #[test]
    fn power_zero_is_dimensionless_and_not_derived() {
        let p0 = length().power(0);
        assert!(p0.is_dimensionless_and_not_derived());
    }

    #[test]
    fn power_one_is_identity() {
        assert_eq!(length().power(1), length());
    }

    #[test]
    fn nth_root_rejects_non_divisible() {
        let l3 = length().power(3);
        assert_eq!(l3.nth_root(2), Err(SiqError::FractionalExponent));
        assert!(l3.nth_root(3).is_ok());
    }

    #[test]
    fn nth_root_inverse_of_power() {
        let d = (mass() * length().power(2)).divide(&time().power(2));
        let root = d.power(2).nth_root(2).unwrap();
        assert_eq!(root, d);
    }

    #[test]
    fn has_same_reduced_ignores_raw_components() {
        let a = length().multiply_without_reducing(&length().power_without_reducing(-1));
        let b = Dimensionality::DIMENSIONLESS;
        assert!(a.has_same_reduced(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn symbol_formatting() {
        let speed = length().divide(&time());
        assert_eq!(speed.symbol(), "L/T");

        let force = mass() * length() * time().power(-2);
        assert_eq!(force.symbol(), "M·L/T^2");

        assert_eq!(Dimensionality::DIMENSIONLESS.symbol(), " ");
    }

    #[test]
    fn serializes_as_recursive_exponent_object() {
        let force = mass() * length() * time().power(-2);
        let json = serde_json::to_value(&force).unwrap();
        assert_eq!(json["M"], serde_json::json!({"num": 1, "den": 0}));
        assert_eq!(json["T"], serde_json::json!({"num": 0, "den": 2}));
        let back: Dimensionality = serde_json::from_value(json).unwrap();
        assert_eq!(back, force);
    }

    #[test]
    fn for_quantity_known_and_unknown() {
        assert!(Dimensionality::for_quantity("force").is_ok());
        assert!(matches!(
            Dimensionality::for_quantity("not-a-real-quantity"),
            Err(SiqError::UnknownQuantity { .. })
        ));
    }
}
