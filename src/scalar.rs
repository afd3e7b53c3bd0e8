//! Scalar values: a complex numeric magnitude paired with a unit (C6 data model).

use crate::errors::SiqError;
use crate::library::UnitLibrary;
use crate::unit::Unit;
use num_complex::Complex64;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

#[derive(Debug, Clone)]
pub struct Scalar {
    pub value: Complex64,
    pub unit: Unit,
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.unit == other.unit && self.value == other.value
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.im == 0.0 {
            write!(f, "{} {}", self.value.re, self.unit.symbol())
        } else {
            write!(f, "({}{:+}i) {}", self.value.re, self.value.im, self.unit.symbol())
        }
    }
}

impl Scalar {
    pub fn new(value: Complex64, unit: Unit) -> Scalar {
        Scalar { value, unit }
    }

    pub fn real(value: f64, unit: Unit) -> Scalar {
        Scalar { value: Complex64::new(value, 0.0), unit }
    }

    pub fn scale_by_constant(&self, factor: Complex64) -> Scalar {
        Scalar { value: self.value * factor, unit: self.unit.clone() }
    }

    pub fn add(&self, other: &Scalar) -> Result<Scalar, SiqError> {
        let factor = other.unit.conversion_factor(&self.unit)?;
        Ok(Scalar { value: self.value + other.value * factor, unit: self.unit.clone() })
    }

    pub fn subtract(&self, other: &Scalar) -> Result<Scalar, SiqError> {
        let factor = other.unit.conversion_factor(&self.unit)?;
        Ok(Scalar { value: self.value - other.value * factor, unit: self.unit.clone() })
    }

    pub fn multiply(&self, other: &Scalar, lib: &UnitLibrary) -> Result<Scalar, SiqError> {
        let unit = self.unit.multiply(&other.unit, lib)?;
        Ok(Scalar { value: self.value * other.value, unit })
    }

    pub fn divide(&self, other: &Scalar, lib: &UnitLibrary) -> Result<Scalar, SiqError> {
        if other.value == Complex64::new(0.0, 0.0) {
            return Err(SiqError::DivisionByZero);
        }
        let unit = self.unit.divide(&other.unit, lib)?;
        Ok(Scalar { value: self.value / other.value, unit })
    }

    pub fn power(&self, n: i32, lib: &UnitLibrary) -> Scalar {
        Scalar { value: self.value.powi(n), unit: self.unit.power(n, lib) }
    }

    /// Converts `self` into an equal scalar expressed in `target`.
    pub fn convert_to(&self, target: &Unit) -> Result<Scalar, SiqError> {
        let factor = self.unit.conversion_factor(target)?;
        Ok(Scalar { value: self.value * factor, unit: target.clone() })
    }

    pub fn conj(&self) -> Scalar {
        Scalar { value: self.value.conj(), unit: self.unit.clone() }
    }
    pub fn real_part(&self) -> f64 {
        self.value.re
    }
    pub fn imag_part(&self) -> f64 {
        self.value.im
    }
    pub fn arg(&self) -> f64 {
        self.value.arg()
    }
    pub fn magnitude(&self) -> f64 {
        self.value.norm()
    }
}

impl Add for Scalar {
    type Output = Result<Scalar, SiqError>;
    fn add(self, rhs: Scalar) -> Self::Output {
        Scalar::add(&self, &rhs)
    }
}
impl Sub for Scalar {
    type Output = Result<Scalar, SiqError>;
    fn sub(self, rhs: Scalar) -> Self::Output {
        Scalar::subtract(&self, &rhs)
    }
}
impl Mul for Scalar {
    type Output = Result<Scalar, SiqError>;
    fn mul(self, rhs: Scalar) -> Self::Output {
        crate::library::with_default(|lib| Scalar::multiply(&self, &rhs, lib))
    }
}
impl Div for Scalar {
    type Output = Result<Scalar, SiqError>;
    fn div(self, rhs: Scalar) -> Self::Output {
        crate::library::with_default(|lib| Scalar::divide(&self, &rhs, lib))
    }
}
