//! The interned unit library (C5): default population, lookup, equivalence search.

use crate::dimensionality::{BaseDimension, Dimensionality};
use crate::errors::SiqError;
use crate::prefix::SiPrefix;
use crate::unit::{Unit, NO_PREFIXES};
use std::cell::RefCell;
use std::collections::HashMap;

/// Which customary volume family ("cup"/"pint"/"quart"/"gallon") a library
/// registers, keyed off an explicitly-supplied locale currency symbol rather
/// than read from the OS — this crate has no locale facility of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeFamily {
    Imperial,
    UsCustomary,
}

impl VolumeFamily {
    pub fn from_currency_symbol(symbol: &str) -> VolumeFamily {
        match symbol {
            "£" => VolumeFamily::Imperial,
            _ => VolumeFamily::UsCustomary,
        }
    }
}

struct Registration {
    root_name: Option<&'static str>,
    quantity: Option<&'static str>,
}

/// Process-wide-but-not-thread-safe unit library: three lookup maps (by
/// interning key, by root name / quantity name, by reduced-dimensionality
/// symbol) plus a names-sorted index, exactly mirroring the teacher's single
/// by-name map generalized to three axes.
pub struct UnitLibrary {
    by_key: HashMap<String, Unit>,
    by_name: HashMap<String, Unit>,
    by_symbol: HashMap<String, Unit>,
    by_quantity: HashMap<String, Vec<Unit>>,
    by_dimensionality: HashMap<String, Vec<Unit>>,
    sorted_names: Vec<String>,
}

thread_local! {
    static DEFAULT_LIBRARY: RefCell<UnitLibrary> = RefCell::new(UnitLibrary::new_populated(VolumeFamily::UsCustomary));
}

/// Runs `f` against the process-default thread-local library.
pub fn with_default<R>(f: impl FnOnce(&mut UnitLibrary) -> R) -> R {
    DEFAULT_LIBRARY.with(|lib| f(&mut lib.borrow_mut()))
}

impl UnitLibrary {
    /// An empty library with nothing registered — used by tests that want a
    /// library free of the default population.
    pub fn new() -> UnitLibrary {
        UnitLibrary {
            by_key: HashMap::new(),
            by_name: HashMap::new(),
            by_symbol: HashMap::new(),
            by_quantity: HashMap::new(),
            by_dimensionality: HashMap::new(),
            sorted_names: Vec::new(),
        }
    }

    /// A library populated the same way the process-default one is, for a
    /// given volume-family choice.
    pub fn new_with_locale(volume_family: VolumeFamily) -> UnitLibrary {
        Self::new_populated(volume_family)
    }

    fn new_populated(volume_family: VolumeFamily) -> UnitLibrary {
        let mut lib = UnitLibrary::new();
        lib.register_coherent_bases();
        lib.register_special_si();
        lib.register_si_prefixed_variants();
        lib.register_non_si();
        lib.register_volume_family(volume_family);
        lib
    }

    /// Interns `unit`: if a unit with the same key is already registered,
    /// the existing instance is returned and `unit` is discarded.
    pub fn intern(&mut self, unit: Unit) -> Unit {
        if let Some(existing) = self.by_key.get(unit.key()) {
            return existing.clone();
        }
        self.by_key.insert(unit.key().to_string(), unit.clone());
        unit
    }

    fn register_named(&mut self, unit: Unit, reg: Registration) -> Unit {
        let unit = self.intern(unit);
        if let Some(name) = reg.root_name {
            self.by_name.insert(name.to_string(), unit.clone());
            self.sorted_names.push(name.to_string());
        }
        if !unit.symbol().is_empty() {
            self.by_symbol.insert(unit.symbol().to_string(), unit.clone());
        }
        if let Some(q) = reg.quantity {
            self.by_quantity.entry(q.to_string()).or_default().push(unit.clone());
        }
        self.by_dimensionality
            .entry(unit.dimensionality().reduce().symbol())
            .or_default()
            .push(unit.clone());
        unit
    }

    fn register_coherent_bases(&mut self) {
        let bases: [(BaseDimension, &str, &str, &str, SiPrefix, f64); 7] = [
            (BaseDimension::Length, "meter", "meters", "m", SiPrefix::None, 1.0),
            (BaseDimension::Mass, "gram", "grams", "g", SiPrefix::Kilo, 1.0),
            (BaseDimension::Time, "second", "seconds", "s", SiPrefix::None, 1.0),
            (BaseDimension::Current, "ampere", "amperes", "A", SiPrefix::None, 1.0),
            (BaseDimension::Temperature, "kelvin", "kelvin", "K", SiPrefix::None, 1.0),
            (BaseDimension::Amount, "mole", "moles", "mol", SiPrefix::None, 1.0),
            (BaseDimension::LuminousIntensity, "candela", "candelas", "cd", SiPrefix::None, 1.0),
        ];
        for (dim, name, plural, symbol, root_prefix, scale) in bases {
            let mut num_prefix = NO_PREFIXES;
            num_prefix[dim.index()] = root_prefix;
            let unit = Unit::from_parts(
                Dimensionality::for_base(dim),
                num_prefix,
                NO_PREFIXES,
                Some(name.to_string()),
                Some(plural.to_string()),
                Some(symbol.to_string()),
                root_prefix,
                true,
                false,
                scale,
            );
            self.register_named(unit, Registration { root_name: Some(name), quantity: None });
        }
    }

    fn register_special_si(&mut self) {
        // Every one of these is coherent by construction (built directly
        // from the base units at scale 1, per `is_coherent_derived`), so
        // each gets `scale_to_coherent_si = 1.0` regardless of how many
        // base dimensions it spans.
        let specials: [(&str, &str, &str, &str, f64); 7] = [
            ("force", "newton", "newtons", "N", 1.0),
            ("energy", "joule", "joules", "J", 1.0),
            ("power", "watt", "watts", "W", 1.0),
            ("pressure", "pascal", "pascals", "Pa", 1.0),
            ("frequency", "hertz", "hertz", "Hz", 1.0),
            ("charge", "coulomb", "coulombs", "C", 1.0),
            ("voltage", "volt", "volts", "V", 1.0),
        ];
        for (quantity, name, plural, symbol, scale) in specials {
            let dimensionality = Dimensionality::for_quantity(quantity)
                .expect("special SI quantities must be in the quantity table");
            let unit = Unit::from_parts(
                dimensionality,
                NO_PREFIXES,
                NO_PREFIXES,
                Some(name.to_string()),
                Some(plural.to_string()),
                Some(symbol.to_string()),
                SiPrefix::None,
                true,
                true,
                scale,
            );
            self.register_named(unit, Registration { root_name: Some(name), quantity: Some(quantity) });
        }
    }

    /// Registers the prefixed family (`km`, `mg`, `ns`, ...) for every root
    /// already in the library whose `allows_si_prefix` is set.
    fn register_si_prefixed_variants(&mut self) {
        let roots: Vec<Unit> = self.by_name.values().cloned().collect();
        for root in roots {
            if !root.allows_si_prefix() {
                continue;
            }
            for prefix in SiPrefix::all() {
                if prefix == SiPrefix::None || prefix == root.root_symbol_prefix() {
                    continue;
                }
                let mut num_prefix = root.num_prefix();
                let dim_with_exp = BaseDimension_with_positive_num_exp(&root);
                if let Some(dim) = dim_with_exp {
                    num_prefix[dim.index()] = prefix;
                } else {
                    continue;
                }
                let relative_exp = prefix.exponent() - root.root_symbol_prefix().exponent();
                let scale = root.scale_to_coherent_si() * 10f64.powi(relative_exp);
                let unit = Unit::from_parts(
                    root.dimensionality(),
                    num_prefix,
                    root.den_prefix(),
                    root.root_name().map(str::to_string),
                    root.root_plural_name().map(str::to_string),
                    root.root_symbol().map(str::to_string),
                    root.root_symbol_prefix(),
                    false,
                    root.is_special_si_symbol(),
                    scale,
                );
                let name = format!("{}{}", prefix.name(), root.root_name().unwrap_or_default());
                self.intern(unit.clone());
                self.by_name.insert(name.clone(), unit.clone());
                self.sorted_names.push(name);
                if !unit.symbol().is_empty() {
                    self.by_symbol.insert(unit.symbol().to_string(), unit.clone());
                }
                self.by_dimensionality
                    .entry(unit.dimensionality().reduce().symbol())
                    .or_default()
                    .push(unit);
            }
        }
    }

    fn register_non_si(&mut self) {
        let minute = self.unit_scaled_from("second", "minute", "minutes", "min", 60.0);
        self.register_named(minute, Registration { root_name: Some("minute"), quantity: None });
        let hour = self.unit_scaled_from("second", "hour", "hours", "h", 3600.0);
        self.register_named(hour, Registration { root_name: Some("hour"), quantity: None });
        let inch = self.unit_scaled_from("meter", "inch", "inches", "in", 0.0254);
        self.register_named(inch, Registration { root_name: Some("inch"), quantity: None });
        let foot = self.unit_scaled_from("meter", "foot", "feet", "ft", 0.3048);
        self.register_named(foot, Registration { root_name: Some("foot"), quantity: None });
        let pound = self.unit_scaled_from("gram", "pound", "pounds", "lb", 453.59237);
        self.register_named(pound, Registration { root_name: Some("pound"), quantity: None });
    }

    fn register_volume_family(&mut self, family: VolumeFamily) {
        let liter_to_m3 = 0.001;
        match family {
            VolumeFamily::UsCustomary => {
                let gallon = self.volume_unit("gallon", "gallons", "gal", 3.785411784e-3);
                self.register_named(gallon, Registration { root_name: Some("gallon"), quantity: Some("volume") });
                let quart = self.volume_unit("quart", "quarts", "qt", 3.785411784e-3 / 4.0);
                self.register_named(quart, Registration { root_name: Some("quart"), quantity: Some("volume") });
                let cup = self.volume_unit("cup", "cups", "cup", 2.365882365e-4);
                self.register_named(cup, Registration { root_name: Some("cup"), quantity: Some("volume") });
            }
            VolumeFamily::Imperial => {
                let gallon = self.volume_unit("gallon", "gallons", "gal", 4.54609e-3);
                self.register_named(gallon, Registration { root_name: Some("gallon"), quantity: Some("volume") });
                let pint = self.volume_unit("pint", "pints", "pt", 4.54609e-3 / 8.0);
                self.register_named(pint, Registration { root_name: Some("pint"), quantity: Some("volume") });
            }
        }
        let liter = self.volume_unit("liter", "liters", "L", liter_to_m3);
        self.register_named(liter, Registration { root_name: Some("liter"), quantity: Some("volume") });
    }

    fn volume_unit(&self, name: &str, plural: &str, symbol: &str, scale_m3: f64) -> Unit {
        Unit::from_parts(
            Dimensionality::for_quantity("volume").unwrap(),
            NO_PREFIXES,
            NO_PREFIXES,
            Some(name.to_string()),
            Some(plural.to_string()),
            Some(symbol.to_string()),
            SiPrefix::None,
            false,
            true,
            scale_m3,
        )
    }

    fn unit_scaled_from(&self, base_name: &str, name: &str, plural: &str, symbol: &str, scale_to_base: f64) -> Unit {
        let base = self.by_name.get(base_name).expect("base unit must already be registered");
        let base_scale_to_si = match base_name {
            "gram" => base.scale_to_coherent_si() / 1000.0,
            _ => base.scale_to_coherent_si(),
        };
        Unit::from_parts(
            base.dimensionality(),
            base.num_prefix(),
            base.den_prefix(),
            Some(name.to_string()),
            Some(plural.to_string()),
            Some(symbol.to_string()),
            SiPrefix::None,
            false,
            true,
            scale_to_base * base_scale_to_si,
        )
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<Unit> {
        self.by_name.get(name).cloned()
    }

    pub fn lookup_by_symbol(&self, symbol: &str) -> Option<Unit> {
        self.by_symbol.get(symbol).cloned()
    }

    pub fn lookup_by_key(&self, key: &str) -> Option<Unit> {
        self.by_key.get(key).cloned()
    }

    pub fn register(&mut self, name: impl Into<String>, unit: Unit) -> Result<Unit, SiqError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(SiqError::syntax(format!("unit `{}` already registered", name)));
        }
        let interned = self.register_named(unit, Registration { root_name: None, quantity: None });
        self.by_name.insert(name.clone(), interned.clone());
        self.sorted_names.push(name);
        if !interned.symbol().is_empty() {
            self.by_symbol.insert(interned.symbol().to_string(), interned.clone());
        }
        Ok(interned)
    }

    /// All library units sharing `unit`'s reduced dimensionality, sorted by
    /// shortest symbol first (mirrors `SIUnitCreateArrayOfEquivalentUnits`).
    pub fn equivalent_units(&self, unit: &Unit) -> Vec<Unit> {
        let key = unit.dimensionality().reduce().symbol();
        let mut results: Vec<Unit> = self
            .by_dimensionality
            .get(&key)
            .cloned()
            .unwrap_or_default();
        results.sort_by_key(|u| u.symbol().chars().count());
        results.dedup_by(|a, b| a.key() == b.key());
        results
    }

    /// The unit a reducing operation should actually settle on: among the
    /// library units sharing `unit`'s reduced dimensionality and exact
    /// coherent-SI scale (substitutable without changing the numeric value),
    /// the one with the shortest canonical symbol, ties broken
    /// lexicographically. Falls back to `unit` itself when nothing in the
    /// library beats it — mirrors `SIUnitFindEquivalentUnitWithShortestSymbol`.
    pub fn find_equivalent_unit_with_shortest_symbol(&self, unit: &Unit) -> Unit {
        let mut best = unit.clone();
        for candidate in self.equivalent_units(unit) {
            if !unit.equivalent(&candidate) {
                continue;
            }
            let best_len = best.symbol().chars().count();
            let candidate_len = candidate.symbol().chars().count();
            if candidate_len < best_len || (candidate_len == best_len && candidate.symbol() < best.symbol()) {
                best = candidate;
            }
        }
        best
    }

    /// First registered quantity name whose dimensionality matches `unit`'s.
    pub fn guess_quantity_name(&self, unit: &Unit) -> Option<&str> {
        self.by_quantity
            .iter()
            .find(|(_, units)| units.iter().any(|u| u.dimensionality().has_same_reduced(&unit.dimensionality())))
            .map(|(name, _)| name.as_str())
    }

    pub fn names(&self) -> &[String] {
        &self.sorted_names
    }

    pub fn clear(&mut self) {
        self.by_key.clear();
        self.by_name.clear();
        self.by_symbol.clear();
        self.by_quantity.clear();
        self.by_dimensionality.clear();
        self.sorted_names.clear();
    }
}

impl Default for UnitLibrary {
    fn default() -> Self {
        UnitLibrary::new_populated(VolumeFamily::UsCustomary)
    }
}

#[allow(non_snake_case)]
fn BaseDimension_with_positive_num_exp(unit: &Unit) -> Option<BaseDimension> {
    crate::dimensionality::BASE_DIMENSIONS
        .iter()
        .copied()
        .find(|&d| unit.dimensionality().num_exp(d) != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coherent_bases_are_registered() {
        let lib = UnitLibrary::new_populated(VolumeFamily::UsCustomary);
        assert!(lib.lookup_by_name("meter").is_some());
        assert!(lib.lookup_by_name("gram").is_some());
        assert!(lib.lookup_by_name("kelvin").is_some());
    }

    #[test]
    fn prefixed_variants_exist_for_prefixable_roots() {
        let lib = UnitLibrary::new_populated(VolumeFamily::UsCustomary);
        let km = lib.lookup_by_name("kilometer").expect("kilometer should be registered");
        assert!((km.scale_to_coherent_si() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn non_si_units_convert_correctly() {
        let lib = UnitLibrary::new_populated(VolumeFamily::UsCustomary);
        let inch = lib.lookup_by_name("inch").unwrap();
        let meter = lib.lookup_by_name("meter").unwrap();
        let factor = inch.conversion_factor(&meter).unwrap();
        assert!((factor - 0.0254).abs() < 1e-9);
    }

    #[test]
    fn volume_family_switches_default_gallon_size() {
        let us = UnitLibrary::new_with_locale(VolumeFamily::UsCustomary);
        let uk = UnitLibrary::new_with_locale(VolumeFamily::Imperial);
        let us_gal = us.lookup_by_name("gallon").unwrap();
        let uk_gal = uk.lookup_by_name("gallon").unwrap();
        assert!(us_gal.scale_to_coherent_si() < uk_gal.scale_to_coherent_si());
    }

    #[test]
    fn equivalent_units_share_dimensionality() {
        let lib = UnitLibrary::new_populated(VolumeFamily::UsCustomary);
        let meter = lib.lookup_by_name("meter").unwrap();
        let equivalents = lib.equivalent_units(&meter);
        assert!(equivalents.iter().any(|u| u.key() == meter.key()));
        assert!(equivalents.iter().any(|u| u.root_symbol() == Some("ft")));
    }

    #[test]
    fn guess_quantity_name_finds_force() {
        let lib = UnitLibrary::new_populated(VolumeFamily::UsCustomary);
        let newton = lib.lookup_by_name("newton").unwrap();
        assert_eq!(lib.guess_quantity_name(&newton), Some("force"));
    }

    #[test]
    fn registering_duplicate_name_errors() {
        let mut lib = UnitLibrary::new();
        let meter = lib.volume_unit("liter", "liters", "L", 0.001);
        lib.register("liter", meter.clone()).unwrap();
        assert!(lib.register("liter", meter).is_err());
    }

    #[test]
    fn symbols_resolve_independently_of_full_names() {
        let lib = UnitLibrary::new_populated(VolumeFamily::UsCustomary);
        let by_symbol = lib.lookup_by_symbol("m").unwrap();
        let by_name = lib.lookup_by_name("meter").unwrap();
        assert_eq!(by_symbol, by_name);
        assert!(lib.lookup_by_symbol("km").is_some());
    }

    #[test]
    fn fresh_library_starts_empty() {
        let lib = UnitLibrary::new();
        assert!(lib.lookup_by_name("meter").is_none());
    }

    #[test]
    fn find_equivalent_unit_with_shortest_symbol_prefers_named_unit() {
        let lib = UnitLibrary::new_populated(VolumeFamily::UsCustomary);
        let newton = lib.lookup_by_name("newton").unwrap();
        let mass = lib.lookup_by_name("kilogram").or_else(|| lib.lookup_by_name("gram")).unwrap();
        let anonymous = Unit::from_parts(
            newton.dimensionality(),
            mass.num_prefix(),
            NO_PREFIXES,
            None,
            None,
            None,
            SiPrefix::None,
            false,
            false,
            newton.scale_to_coherent_si(),
        );
        let resolved = lib.find_equivalent_unit_with_shortest_symbol(&anonymous);
        assert_eq!(resolved.symbol(), "N");
    }

    #[test]
    fn find_equivalent_unit_with_shortest_symbol_falls_back_when_no_match() {
        let lib = UnitLibrary::new();
        let meter = Unit::from_parts(
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
        );
        let resolved = lib.find_equivalent_unit_with_shortest_symbol(&meter);
        assert_eq!(resolved, meter);
    }
}
