//! The closed set of 21 SI decimal prefixes, indexed by decimal exponent.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One of the 21 SI prefixes in `{-24,-21,-18,-15,-12,-9,-6,-3,-2,-1,0,+1,+2,+3,+6,+9,+12,+15,+18,+21,+24}`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum SiPrefix {
    Yocto,
    Zepto,
    Atto,
    Femto,
    Pico,
    Nano,
    Micro,
    Milli,
    Centi,
    Deci,
    None,
    Deca,
    Hecto,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
    Zetta,
    Yotta,
}

/// Descending by exponent, matching the order used for `closest_for`'s clamp search.
const ALL_DESCENDING: [SiPrefix; 21] = [
    SiPrefix::Yotta,
    SiPrefix::Zetta,
    SiPrefix::Exa,
    SiPrefix::Peta,
    SiPrefix::Tera,
    SiPrefix::Giga,
    SiPrefix::Mega,
    SiPrefix::Kilo,
    SiPrefix::Hecto,
    SiPrefix::Deca,
    SiPrefix::None,
    SiPrefix::Deci,
    SiPrefix::Centi,
    SiPrefix::Milli,
    SiPrefix::Micro,
    SiPrefix::Nano,
    SiPrefix::Pico,
    SiPrefix::Femto,
    SiPrefix::Atto,
    SiPrefix::Zepto,
    SiPrefix::Yocto,
];

impl SiPrefix {
    /// The base-10 exponent this prefix represents.
    pub const fn exponent(self) -> i32 {
        match self {
            SiPrefix::Yocto => -24,
            SiPrefix::Zepto => -21,
            SiPrefix::Atto => -18,
            SiPrefix::Femto => -15,
            SiPrefix::Pico => -12,
            SiPrefix::Nano => -9,
            SiPrefix::Micro => -6,
            SiPrefix::Milli => -3,
            SiPrefix::Centi => -2,
            SiPrefix::Deci => -1,
            SiPrefix::None => 0,
            SiPrefix::Deca => 1,
            SiPrefix::Hecto => 2,
            SiPrefix::Kilo => 3,
            SiPrefix::Mega => 6,
            SiPrefix::Giga => 9,
            SiPrefix::Tera => 12,
            SiPrefix::Peta => 15,
            SiPrefix::Exa => 18,
            SiPrefix::Zetta => 21,
            SiPrefix::Yotta => 24,
        }
    }

    /// The prefix symbol glyph, e.g. `"k"`, `"µ"`, `""` for none.
    pub const fn symbol(self) -> &'static str {
        match self {
            SiPrefix::Yocto => "y",
            SiPrefix::Zepto => "z",
            SiPrefix::Atto => "a",
            SiPrefix::Femto => "f",
            SiPrefix::Pico => "p",
            SiPrefix::Nano => "n",
            SiPrefix::Micro => "µ",
            SiPrefix::Milli => "m",
            SiPrefix::Centi => "c",
            SiPrefix::Deci => "d",
            SiPrefix::None => "",
            SiPrefix::Deca => "da",
            SiPrefix::Hecto => "h",
            SiPrefix::Kilo => "k",
            SiPrefix::Mega => "M",
            SiPrefix::Giga => "G",
            SiPrefix::Tera => "T",
            SiPrefix::Peta => "P",
            SiPrefix::Exa => "E",
            SiPrefix::Zetta => "Z",
            SiPrefix::Yotta => "Y",
        }
    }

    /// The full prefix name, e.g. `"kilo"`.
    pub const fn name(self) -> &'static str {
        match self {
            SiPrefix::Yocto => "yocto",
            SiPrefix::Zepto => "zepto",
            SiPrefix::Atto => "atto",
            SiPrefix::Femto => "femto",
            SiPrefix::Pico => "pico",
            SiPrefix::Nano => "nano",
            SiPrefix::Micro => "micro",
            SiPrefix::Milli => "milli",
            SiPrefix::Centi => "centi",
            SiPrefix::Deci => "deci",
            SiPrefix::None => "",
            SiPrefix::Deca => "deca",
            SiPrefix::Hecto => "hecto",
            SiPrefix::Kilo => "kilo",
            SiPrefix::Mega => "mega",
            SiPrefix::Giga => "giga",
            SiPrefix::Tera => "tera",
            SiPrefix::Peta => "peta",
            SiPrefix::Exa => "exa",
            SiPrefix::Zetta => "zetta",
            SiPrefix::Yotta => "yotta",
        }
    }

    /// All 21 prefixes, descending by exponent.
    pub fn all() -> impl Iterator<Item = SiPrefix> {
        ALL_DESCENDING.iter().copied()
    }

    /// The prefix whose `exponent()` equals `exp`, if any.
    pub fn from_exponent(exp: i32) -> Option<SiPrefix> {
        ALL_DESCENDING.iter().copied().find(|p| p.exponent() == exp)
    }

    /// Whether `exp` is one of the 21 representable prefix exponents.
    pub fn is_valid_exponent(exp: i32) -> bool {
        Self::from_exponent(exp).is_some()
    }

    /// Parse a prefix symbol glyph (e.g. `"k"`, `"µ"`), matching the longest
    /// registered glyph. Returns `None` for `""`/unrecognized text — callers
    /// distinguish "no prefix" (an explicit match against `SiPrefix::None`,
    /// symbol `""`) from "not a prefix at all" themselves.
    pub fn from_symbol(symbol: &str) -> Option<SiPrefix> {
        if symbol.is_empty() {
            return Some(SiPrefix::None);
        }
        ALL_DESCENDING
            .iter()
            .copied()
            .filter(|p| *p != SiPrefix::None)
            .find(|p| p.symbol() == symbol)
    }

    /// Clamp a raw (possibly invalid) decimal exponent to the nearest
    /// representable prefix, rounding toward the larger-magnitude end when
    /// `input` exceeds the table's range, otherwise taking the largest
    /// exponent that does not exceed `input`.
    pub fn closest_for(input: i32) -> SiPrefix {
        if input >= ALL_DESCENDING[0].exponent() {
            return ALL_DESCENDING[0];
        }
        let last = ALL_DESCENDING[ALL_DESCENDING.len() - 1];
        if input <= last.exponent() {
            return last;
        }
        for p in ALL_DESCENDING.iter().copied() {
            if input >= p.exponent() {
                return p;
            }
        }
        last
    }
}

impl fmt::Display for SiPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Serialized as its bare decimal exponent (e.g. `Kilo` -> `3`), per the
/// crate's stable JSON field set.
impl Serialize for SiPrefix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.exponent().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SiPrefix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let exp = i32::deserialize(deserializer)?;
        SiPrefix::from_exponent(exp).ok_or_else(|| serde::de::Error::custom("invalid SI prefix exponent"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponents_cover_the_closed_set() {
        let exps: Vec<i32> = ALL_DESCENDING.iter().map(|p| p.exponent()).collect();
        assert_eq!(
            exps,
            vec![24, 21, 18, 15, 12, 9, 6, 3, 2, 1, 0, -1, -2, -3, -6, -9, -12, -15, -18, -21, -24]
        );
    }

    #[test]
    fn symbol_roundtrips() {
        for p in SiPrefix::all() {
            assert_eq!(SiPrefix::from_symbol(p.symbol()), Some(p));
        }
    }

    #[test]
    fn closest_for_clamps_out_of_range() {
        assert_eq!(SiPrefix::closest_for(100), SiPrefix::Yotta);
        assert_eq!(SiPrefix::closest_for(-100), SiPrefix::Yocto);
    }

    #[test]
    fn closest_for_finds_largest_not_exceeding() {
        assert_eq!(SiPrefix::closest_for(5), SiPrefix::Kilo);
        assert_eq!(SiPrefix::closest_for(4), SiPrefix::Kilo);
        assert_eq!(SiPrefix::closest_for(-5), SiPrefix::Milli);
    }

    #[test]
    fn serializes_as_bare_exponent() {
        assert_eq!(serde_json::to_string(&SiPrefix::Kilo).unwrap(), "3");
        let back: SiPrefix = serde_json::from_str("3").unwrap();
        assert_eq!(back, SiPrefix::Kilo);
        assert!(serde_json::from_str::<SiPrefix>("4").is_err());
    }

    #[test]
    fn is_valid_exponent() {
        assert!(SiPrefix::is_valid_exponent(3));
        assert!(!SiPrefix::is_valid_exponent(4));
        assert!(!SiPrefix::is_valid_exponent(-5));
    }
}
