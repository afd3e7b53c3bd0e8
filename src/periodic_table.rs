//! Periodic table of physical constants (C7): eight data maps keyed by
//! lowercased element/isotope symbol, plus a derived NMR-frequency accessor.

use crate::errors::SiqError;
use std::collections::HashMap;

/// Isotope physical data, one record per table row.
#[derive(Debug, Clone, Copy)]
struct IsotopeData {
    /// Relative atomic/isotope mass (amu).
    mass: f64,
    /// Natural abundance, 0.0-1.0 (NaN for radioactive/trace isotopes).
    abundance: f64,
    /// Nuclear spin quantum number.
    spin: f64,
    /// Half-life in seconds (`f64::INFINITY` for stable isotopes).
    half_life: f64,
    /// Nuclear magnetic dipole moment, in nuclear magnetons.
    magnetic_dipole_moment: f64,
    /// Electric quadrupole moment, in barns (0.0 when spin <= 1/2).
    quadrupole_moment: f64,
}

/// Per-element standard atomic weight and molar mass (amu / g·mol⁻¹ — equal
/// in magnitude for this crate's purposes).
fn element_weights() -> HashMap<&'static str, f64> {
    [
        ("h", 1.008), ("he", 4.0026), ("li", 6.94), ("be", 9.0122), ("b", 10.81),
        ("c", 12.011), ("n", 14.007), ("o", 15.999), ("f", 18.998), ("ne", 20.180),
        ("na", 22.990), ("mg", 24.305), ("al", 26.982), ("si", 28.085), ("p", 30.974),
        ("s", 32.06), ("cl", 35.45), ("ar", 39.948), ("k", 39.098), ("ca", 40.078),
        ("sc", 44.956), ("ti", 47.867), ("v", 50.942), ("cr", 51.996), ("mn", 54.938),
        ("fe", 55.845), ("co", 58.933), ("ni", 58.693), ("cu", 63.546), ("zn", 65.38),
        ("br", 79.904), ("kr", 83.798), ("ag", 107.868), ("i", 126.904), ("xe", 131.293),
        ("au", 196.967), ("hg", 200.592), ("pb", 207.2), ("ra", 226.0), ("u", 238.029),
    ]
    .into_iter()
    .collect()
}

fn isotope_data() -> HashMap<&'static str, IsotopeData> {
    use std::f64::INFINITY as STABLE;
    [
        ("1h", IsotopeData { mass: 1.007825, abundance: 0.999885, spin: 0.5, half_life: STABLE, magnetic_dipole_moment: 2.792847, quadrupole_moment: 0.0 }),
        ("2h", IsotopeData { mass: 2.014102, abundance: 0.000115, spin: 1.0, half_life: STABLE, magnetic_dipole_moment: 0.857438, quadrupole_moment: 0.00286 }),
        ("12c", IsotopeData { mass: 12.0, abundance: 0.9893, spin: 0.0, half_life: STABLE, magnetic_dipole_moment: 0.0, quadrupole_moment: 0.0 }),
        ("13c", IsotopeData { mass: 13.003355, abundance: 0.0107, spin: 0.5, half_life: STABLE, magnetic_dipole_moment: 0.702412, quadrupole_moment: 0.0 }),
        ("14n", IsotopeData { mass: 14.003074, abundance: 0.99636, spin: 1.0, half_life: STABLE, magnetic_dipole_moment: 0.403761, quadrupole_moment: 0.02044 }),
        ("15n", IsotopeData { mass: 15.000109, abundance: 0.00364, spin: 0.5, half_life: STABLE, magnetic_dipole_moment: -0.283189, quadrupole_moment: 0.0 }),
        ("16o", IsotopeData { mass: 15.994915, abundance: 0.99757, spin: 0.0, half_life: STABLE, magnetic_dipole_moment: 0.0, quadrupole_moment: 0.0 }),
        ("17o", IsotopeData { mass: 16.999132, abundance: 0.00038, spin: 2.5, half_life: STABLE, magnetic_dipole_moment: -1.893790, quadrupole_moment: -0.02558 }),
        ("19f", IsotopeData { mass: 18.998403, abundance: 1.0, spin: 0.5, half_life: STABLE, magnetic_dipole_moment: 2.628868, quadrupole_moment: 0.0 }),
        ("23na", IsotopeData { mass: 22.989770, abundance: 1.0, spin: 1.5, half_life: STABLE, magnetic_dipole_moment: 2.217522, quadrupole_moment: 0.104 }),
        ("31p", IsotopeData { mass: 30.973762, abundance: 1.0, spin: 0.5, half_life: STABLE, magnetic_dipole_moment: 1.131600, quadrupole_moment: 0.0 }),
        ("32s", IsotopeData { mass: 31.972071, abundance: 0.9499, spin: 0.0, half_life: STABLE, magnetic_dipole_moment: 0.0, quadrupole_moment: 0.0 }),
        ("35cl", IsotopeData { mass: 34.968853, abundance: 0.7576, spin: 1.5, half_life: STABLE, magnetic_dipole_moment: 0.821874, quadrupole_moment: -0.0817 }),
        ("39k", IsotopeData { mass: 38.963707, abundance: 0.932581, spin: 1.5, half_life: STABLE, magnetic_dipole_moment: 0.391507, quadrupole_moment: 0.0585 }),
        ("40ca", IsotopeData { mass: 39.962591, abundance: 0.96941, spin: 0.0, half_life: STABLE, magnetic_dipole_moment: 0.0, quadrupole_moment: 0.0 }),
        ("56fe", IsotopeData { mass: 55.934936, abundance: 0.91754, spin: 0.0, half_life: STABLE, magnetic_dipole_moment: 0.0, quadrupole_moment: 0.0 }),
        ("63cu", IsotopeData { mass: 62.929598, abundance: 0.6915, spin: 1.5, half_life: STABLE, magnetic_dipole_moment: 2.227206, quadrupole_moment: -0.220 }),
        ("107ag", IsotopeData { mass: 106.905097, abundance: 0.51839, spin: 0.5, half_life: STABLE, magnetic_dipole_moment: -0.113680, quadrupole_moment: 0.0 }),
        ("127i", IsotopeData { mass: 126.904473, abundance: 1.0, spin: 2.5, half_life: STABLE, magnetic_dipole_moment: 2.813273, quadrupole_moment: -0.696 }),
        ("197au", IsotopeData { mass: 196.966570, abundance: 1.0, spin: 1.5, half_life: STABLE, magnetic_dipole_moment: 0.148158, quadrupole_moment: 0.547 }),
        ("14c", IsotopeData { mass: 14.003242, abundance: f64::NAN, spin: 0.0, half_life: 1.80833e11, magnetic_dipole_moment: 0.0, quadrupole_moment: 0.0 }),
        ("226ra", IsotopeData { mass: 226.025410, abundance: f64::NAN, spin: 0.0, half_life: 5.049e10, magnetic_dipole_moment: 0.0, quadrupole_moment: 0.0 }),
        ("238u", IsotopeData { mass: 238.050788, abundance: 0.992742, spin: 0.0, half_life: 1.40996e17, magnetic_dipole_moment: 0.0, quadrupole_moment: 0.0 }),
    ]
    .into_iter()
    .collect()
}

/// Nuclear magneton, in J/T, used by the gyromagnetic-ratio formula.
const NUCLEAR_MAGNETON: f64 = 5.0507837461e-27;
/// Reduced Planck constant, in J·s.
const HBAR: f64 = 1.054571817e-34;
const TWO_PI: f64 = 6.283185307179586;

pub struct PeriodicTable {
    weights: HashMap<&'static str, f64>,
    isotopes: HashMap<&'static str, IsotopeData>,
}

impl PeriodicTable {
    pub fn new() -> PeriodicTable {
        PeriodicTable { weights: element_weights(), isotopes: isotope_data() }
    }

    fn isotope(&self, symbol: &str) -> Result<&IsotopeData, SiqError> {
        self.isotopes
            .get(symbol.to_lowercase().as_str())
            .ok_or_else(|| SiqError::unknown_symbol(symbol))
    }

    fn element_weight(&self, symbol: &str) -> Result<f64, SiqError> {
        self.weights
            .get(symbol.to_lowercase().as_str())
            .copied()
            .ok_or_else(|| SiqError::unknown_symbol(symbol))
    }

    /// Standard atomic weight for an element symbol (e.g. `"C"` -> 12.011).
    pub fn atomic_weight(&self, symbol: &str) -> Result<f64, SiqError> {
        self.element_weight(symbol)
    }

    /// Molar mass: for an element symbol, the standard atomic weight; for an
    /// isotope symbol (e.g. `"13c"`), its isotope mass.
    pub fn molar_mass(&self, symbol: &str) -> Result<f64, SiqError> {
        if let Ok(iso) = self.isotope(symbol) {
            return Ok(iso.mass);
        }
        self.element_weight(symbol)
    }

    pub fn isotope_mass(&self, symbol: &str) -> Result<f64, SiqError> {
        Ok(self.isotope(symbol)?.mass)
    }

    pub fn abundance(&self, symbol: &str) -> Result<f64, SiqError> {
        Ok(self.isotope(symbol)?.abundance)
    }

    pub fn spin(&self, symbol: &str) -> Result<f64, SiqError> {
        Ok(self.isotope(symbol)?.spin)
    }

    pub fn half_life(&self, symbol: &str) -> Result<f64, SiqError> {
        Ok(self.isotope(symbol)?.half_life)
    }

    /// Mean lifetime = half-life / ln(2).
    pub fn mean_lifetime(&self, symbol: &str) -> Result<f64, SiqError> {
        Ok(self.half_life(symbol)? / std::f64::consts::LN_2)
    }

    pub fn is_stable(&self, symbol: &str) -> Result<bool, SiqError> {
        Ok(self.half_life(symbol)?.is_infinite())
    }

    pub fn magnetic_dipole_moment(&self, symbol: &str) -> Result<f64, SiqError> {
        Ok(self.isotope(symbol)?.magnetic_dipole_moment)
    }

    pub fn quadrupole_moment(&self, symbol: &str) -> Result<f64, SiqError> {
        Ok(self.isotope(symbol)?.quadrupole_moment)
    }

    /// Gyromagnetic ratio, in rad/(s·T): `moment * µN / (ħ * spin)`, where
    /// `moment` is the tabulated magnetic dipole moment in nuclear magnetons.
    pub fn gyromagnetic_ratio(&self, symbol: &str) -> Result<f64, SiqError> {
        let iso = self.isotope(symbol)?;
        if iso.spin == 0.0 {
            return Ok(0.0);
        }
        Ok(iso.magnetic_dipole_moment * NUCLEAR_MAGNETON / (HBAR * iso.spin))
    }

    /// NMR resonance frequency per unit field, in MHz/T: `gamma / (2*pi)`,
    /// converted from Hz/T to MHz/T.
    pub fn nmr_frequency(&self, symbol: &str) -> Result<f64, SiqError> {
        let gamma = self.gyromagnetic_ratio(symbol)?;
        Ok(gamma / TWO_PI / 1.0e6)
    }
}

impl Default for PeriodicTable {
    fn default() -> Self {
        PeriodicTable::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carbon_atomic_weight() {
        let table = PeriodicTable::new();
        assert!((table.atomic_weight("C").unwrap() - 12.011).abs() < 1e-6);
        assert!((table.atomic_weight("c").unwrap() - 12.011).abs() < 1e-6);
    }

    #[test]
    fn isotope_mass_differs_from_element_weight() {
        let table = PeriodicTable::new();
        assert!((table.isotope_mass("13C").unwrap() - 13.003355).abs() < 1e-6);
    }

    #[test]
    fn unknown_symbol_errors() {
        let table = PeriodicTable::new();
        assert!(matches!(table.atomic_weight("Xx"), Err(SiqError::UnknownSymbol { .. })));
    }

    #[test]
    fn stability_flags_match_half_life() {
        let table = PeriodicTable::new();
        assert!(table.is_stable("1H").unwrap());
        assert!(!table.is_stable("14C").unwrap());
    }

    #[test]
    fn gyromagnetic_ratio_zero_for_spinless_isotope() {
        let table = PeriodicTable::new();
        assert_eq!(table.gyromagnetic_ratio("12C").unwrap(), 0.0);
    }

    #[test]
    fn nmr_frequency_proton_is_about_42_mhz_per_tesla() {
        let table = PeriodicTable::new();
        let freq = table.nmr_frequency("1H").unwrap();
        assert!(freq > 40.0 && freq < 44.0, "got {freq}");
    }
}
