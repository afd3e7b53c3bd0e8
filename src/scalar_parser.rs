//! Hand-written recursive-descent parser for scalar expressions (C6).
//!
//! Grammar (informal): arithmetic expression over numeric literals, the
//! imaginary unit `i`, named math functions, isotope-keyed constant
//! functions resolved through the periodic table, and an optional trailing
//! `=> <unit>` conversion clause.

use crate::dimensionality::Dimensionality;
use crate::errors::SiqError;
use crate::library::UnitLibrary;
use crate::periodic_table::PeriodicTable;
use crate::scalar::Scalar;
use crate::unit::Unit;
use crate::unit_parser::{parse_unit, ParseOptions};
use num_complex::Complex64;

/// Ports `insertAsterisks`/`SIScalarCreateWithOCString`'s pre-parse pass:
/// fold Unicode operators, turn `√`/`∛`/`∜` into function names, and insert
/// implicit `*` around parens that aren't already preceded/followed by an
/// operator, skipping anything inside `[...]` unit brackets.
fn normalize(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    let mut in_brackets = false;
    for c in input.chars() {
        match c {
            '[' => {
                in_brackets = true;
                s.push(c);
            }
            ']' => {
                in_brackets = false;
                s.push(c);
            }
            '√' if !in_brackets => s.push_str("sqrt"),
            '∛' if !in_brackets => s.push_str("cbrt"),
            '∜' if !in_brackets => s.push_str("qtrt"),
            '·' | '×' if !in_brackets => s.push('*'),
            '÷' if !in_brackets => s.push('/'),
            c if c.is_whitespace() => {}
            _ => s.push(c),
        }
    }

    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(chars.len() + 8);
    for (idx, &c) in chars.iter().enumerate() {
        if c == '(' {
            if idx > 0 {
                let prev = chars[idx - 1];
                let prev_is_operand = prev.is_alphanumeric() || prev == ')' || prev == ']';
                let prev_is_identifier_tail = prev.is_alphabetic();
                if prev_is_operand && !prev_is_identifier_tail {
                    out.push('*');
                }
            }
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Comma,
    LParen,
    RParen,
    Arrow,
    UnitBracket(String),
}

fn lex(input: &str) -> Result<Vec<Token>, SiqError> {
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    let mut out = Vec::new();
    while i < chars.len() {
        let c = chars[i];
        match c {
            '+' => {
                out.push(Token::Plus);
                i += 1;
            }
            '-' => {
                out.push(Token::Minus);
                i += 1;
            }
            '*' => {
                out.push(Token::Star);
                i += 1;
            }
            '/' => {
                out.push(Token::Slash);
                i += 1;
            }
            '^' => {
                out.push(Token::Caret);
                i += 1;
            }
            ',' => {
                out.push(Token::Comma);
                i += 1;
            }
            '(' => {
                out.push(Token::LParen);
                i += 1;
            }
            ')' => {
                out.push(Token::RParen);
                i += 1;
            }
            '=' if i + 1 < chars.len() && chars[i + 1] == '>' => {
                out.push(Token::Arrow);
                i += 2;
            }
            '[' => {
                let start = i + 1;
                let mut j = start;
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    return Err(SiqError::syntax("unterminated unit bracket `[...]`"));
                }
                out.push(Token::UnitBracket(chars[start..j].iter().collect()));
                i = j + 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                let mut j = i;
                while j < chars.len() && (chars[j].is_ascii_digit() || chars[j] == '.') {
                    j += 1;
                }
                if j < chars.len() && (chars[j] == 'e' || chars[j] == 'E') {
                    j += 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    while j < chars.len() && chars[j].is_ascii_digit() {
                        j += 1;
                    }
                }
                let text: String = chars[start..j].iter().collect();
                let n: f64 = text
                    .parse()
                    .map_err(|_| SiqError::syntax(format!("invalid number `{}`", text)))?;
                out.push(Token::Number(n));
                i = j;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                let mut j = i;
                while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
                    j += 1;
                }
                out.push(Token::Ident(chars[start..j].iter().collect()));
                i = j;
            }
            _ => return Err(SiqError::syntax(format!("unexpected character `{}`", c))),
        }
    }
    Ok(out)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    lib: &'a mut UnitLibrary,
    table: &'a PeriodicTable,
}

const UNARY_FUNCTIONS: &[&str] = &[
    "sqrt", "cbrt", "qtrt", "erf", "erfc", "exp", "ln", "log",
    "sin", "cos", "tan", "asin", "acos", "atan",
    "sinh", "cosh", "tanh", "asinh", "acosh", "atanh",
    "conj", "creal", "cimag", "carg", "cabs", "reduce",
];

const ISOTOPE_FUNCTIONS: &[&str] = &[
    "aw", "fw", "abundance", "spin", "halflife", "gyromag", "µ", "Q", "nmr",
];

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }
    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn parse(&mut self) -> Result<Scalar, SiqError> {
        let mut value = self.parse_additive()?;
        if let Some(Token::Arrow) = self.peek() {
            self.advance();
            let unit = self.parse_unit_clause()?;
            value = value.convert_to(&unit)?;
        }
        if self.pos != self.tokens.len() {
            return Err(SiqError::syntax("trailing tokens after scalar expression"));
        }
        Ok(value)
    }

    fn parse_unit_clause(&mut self) -> Result<Unit, SiqError> {
        match self.advance() {
            Some(Token::UnitBracket(expr)) => parse_unit(&expr, self.lib, ParseOptions::default()),
            Some(Token::Ident(name)) => parse_unit(&name, self.lib, ParseOptions::default()),
            other => Err(SiqError::syntax(format!("expected a unit after `=>`, found {:?}", other))),
        }
    }

    fn parse_additive(&mut self) -> Result<Scalar, SiqError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    let rhs = self.parse_multiplicative()?;
                    lhs = lhs.add(&rhs)?;
                }
                Some(Token::Minus) => {
                    self.advance();
                    let rhs = self.parse_multiplicative()?;
                    lhs = lhs.subtract(&rhs)?;
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Scalar, SiqError> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    let rhs = self.parse_unary()?;
                    lhs = lhs.multiply(&rhs, self.lib)?;
                }
                Some(Token::Slash) => {
                    self.advance();
                    let rhs = self.parse_unary()?;
                    lhs = lhs.divide(&rhs, self.lib)?;
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Scalar, SiqError> {
        if let Some(Token::Minus) = self.peek() {
            self.advance();
            let v = self.parse_unary()?;
            return Ok(v.scale_by_constant(Complex64::new(-1.0, 0.0)));
        }
        if let Some(Token::Plus) = self.peek() {
            self.advance();
            return self.parse_unary();
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Scalar, SiqError> {
        let base = self.parse_postfix_unit()?;
        if let Some(Token::Caret) = self.peek() {
            self.advance();
            let exp = self.parse_unary()?;
            let n = exp.real_part() as i32;
            return Ok(base.power(n, self.lib));
        }
        Ok(base)
    }

    fn parse_postfix_unit(&mut self) -> Result<Scalar, SiqError> {
        let mut value = self.parse_primary()?;
        loop {
            match self.peek().cloned() {
                Some(Token::UnitBracket(expr)) => {
                    self.advance();
                    let unit = parse_unit(&expr, self.lib, ParseOptions::default())?;
                    value = Scalar::new(value.value, unit);
                }
                Some(Token::Ident(ref name)) if is_bare_unit_start(name) => {
                    let expr = self.collect_bare_unit_expr();
                    let unit = parse_unit(&expr, self.lib, ParseOptions::default())?;
                    value = Scalar::new(value.value, unit);
                }
                _ => break,
            }
        }
        Ok(value)
    }

    /// Consumes a unit expression written directly after a magnitude with no
    /// `[...]` brackets (e.g. `3 lb*ft^2/s^2`), reassembling it into text for
    /// `parse_unit`. Stops at any token that isn't part of a unit expression.
    fn collect_bare_unit_expr(&mut self) -> String {
        let mut s = String::new();
        loop {
            match self.peek().cloned() {
                Some(Token::Ident(name)) => {
                    s.push_str(&name);
                    self.advance();
                }
                Some(Token::Star) => {
                    s.push('*');
                    self.advance();
                }
                Some(Token::Slash) => {
                    s.push('/');
                    self.advance();
                }
                Some(Token::Caret) => {
                    s.push('^');
                    self.advance();
                    if let Some(Token::Minus) = self.peek() {
                        s.push('-');
                        self.advance();
                    }
                    if let Some(Token::Number(n)) = self.peek().cloned() {
                        s.push_str(&format!("{}", n as i64));
                        self.advance();
                    }
                }
                _ => break,
            }
        }
        s
    }

    fn parse_primary(&mut self) -> Result<Scalar, SiqError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Scalar::real(n, dimensionless_unit())),
            Some(Token::Ident(name)) if name == "i" => {
                Ok(Scalar::new(Complex64::new(0.0, 1.0), dimensionless_unit()))
            }
            Some(Token::Ident(name)) if UNARY_FUNCTIONS.contains(&name.as_str()) => {
                self.expect(Token::LParen)?;
                let arg = self.parse_additive()?;
                self.expect(Token::RParen)?;
                apply_function(&name, arg, self.lib)
            }
            Some(Token::Ident(name)) if ISOTOPE_FUNCTIONS.contains(&name.as_str()) => {
                self.expect(Token::LParen)?;
                let isotope = self.parse_isotope_argument()?;
                self.expect(Token::RParen)?;
                apply_isotope_function(&name, &isotope, self.table)
            }
            Some(Token::LParen) => {
                let inner = self.parse_additive()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            other => Err(SiqError::syntax(format!("unexpected token {:?}", other))),
        }
    }

    fn parse_isotope_argument(&mut self) -> Result<String, SiqError> {
        match self.advance() {
            Some(Token::Ident(s)) => Ok(s),
            other => Err(SiqError::syntax(format!("expected an isotope symbol, found {:?}", other))),
        }
    }

    fn expect(&mut self, tok: Token) -> Result<(), SiqError> {
        match self.advance() {
            Some(t) if t == tok => Ok(()),
            other => Err(SiqError::syntax(format!("expected {:?}, found {:?}", tok, other))),
        }
    }
}

/// True if `name` can open a bracket-less unit expression directly following
/// a magnitude — i.e. it isn't a function or isotope-accessor name.
fn is_bare_unit_start(name: &str) -> bool {
    name != "i" && !UNARY_FUNCTIONS.contains(&name) && !ISOTOPE_FUNCTIONS.contains(&name)
}

fn dimensionless_unit() -> Unit {
    Unit::dimensionless()
}

/// Functions whose argument must be dimensionless (transcendentals have no
/// meaning applied to a physical quantity).
const DIMENSIONLESS_ONLY_FUNCTIONS: &[&str] = &[
    "erf", "erfc", "exp", "ln", "log",
    "sin", "cos", "tan", "asin", "acos", "atan",
    "sinh", "cosh", "tanh", "asinh", "acosh", "atanh",
];

fn apply_function(name: &str, arg: Scalar, lib: &UnitLibrary) -> Result<Scalar, SiqError> {
    if DIMENSIONLESS_ONLY_FUNCTIONS.contains(&name) && !arg.unit.is_dimensionless() {
        return Err(SiqError::IncompatibleDimensionality {
            a: arg.unit.dimensionality(),
            b: Dimensionality::DIMENSIONLESS,
        });
    }

    let v = arg.value;
    match name {
        "sqrt" => Ok(Scalar::new(v.sqrt(), arg.unit.nth_root(2)?)),
        "cbrt" => Ok(Scalar::new(Complex64::new(v.re.cbrt(), 0.0), arg.unit.nth_root(3)?)),
        "qtrt" => Ok(Scalar::new(
            Complex64::new(v.re.abs().powf(0.25) * v.re.signum(), 0.0),
            arg.unit.nth_root(4)?,
        )),
        "conj" => Ok(arg.conj()),
        "creal" => Ok(Scalar::new(Complex64::new(arg.real_part(), 0.0), dimensionless_unit())),
        "cimag" => Ok(Scalar::new(Complex64::new(arg.imag_part(), 0.0), dimensionless_unit())),
        "carg" => Ok(Scalar::new(Complex64::new(arg.arg(), 0.0), dimensionless_unit())),
        "cabs" => Ok(Scalar::new(Complex64::new(arg.magnitude(), 0.0), dimensionless_unit())),
        "reduce" => Ok(Scalar::new(v, arg.unit.reduce(lib))),
        "erf" => Ok(Scalar::new(Complex64::new(erf(v.re), 0.0), dimensionless_unit())),
        "erfc" => Ok(Scalar::new(Complex64::new(1.0 - erf(v.re), 0.0), dimensionless_unit())),
        "exp" => Ok(Scalar::new(v.exp(), dimensionless_unit())),
        "ln" => Ok(Scalar::new(v.ln(), dimensionless_unit())),
        "log" => Ok(Scalar::new(v.ln() / Complex64::new(10f64.ln(), 0.0), dimensionless_unit())),
        "sin" => Ok(Scalar::new(v.sin(), dimensionless_unit())),
        "cos" => Ok(Scalar::new(v.cos(), dimensionless_unit())),
        "tan" => Ok(Scalar::new(v.tan(), dimensionless_unit())),
        "asin" => Ok(Scalar::new(v.asin(), dimensionless_unit())),
        "acos" => Ok(Scalar::new(v.acos(), dimensionless_unit())),
        "atan" => Ok(Scalar::new(v.atan(), dimensionless_unit())),
        "sinh" => Ok(Scalar::new(v.sinh(), dimensionless_unit())),
        "cosh" => Ok(Scalar::new(v.cosh(), dimensionless_unit())),
        "tanh" => Ok(Scalar::new(v.tanh(), dimensionless_unit())),
        "asinh" => Ok(Scalar::new(v.asinh(), dimensionless_unit())),
        "acosh" => Ok(Scalar::new(v.acosh(), dimensionless_unit())),
        "atanh" => Ok(Scalar::new(v.atanh(), dimensionless_unit())),
        _ => unreachable!("checked against UNARY_FUNCTIONS"),
    }
}

fn erf(x: f64) -> f64 {
    // Abramowitz & Stegun 7.1.26 rational approximation, |error| < 1.5e-7.
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;
    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();
    sign * y
}

fn apply_isotope_function(name: &str, isotope: &str, table: &PeriodicTable) -> Result<Scalar, SiqError> {
    match name {
        "aw" => Ok(Scalar::real(table.atomic_weight(isotope)?, dimensionless_unit())),
        "fw" => Ok(Scalar::real(table.molar_mass(isotope)?, dimensionless_unit())),
        "abundance" => Ok(Scalar::real(table.abundance(isotope)?, dimensionless_unit())),
        "spin" => Ok(Scalar::real(table.spin(isotope)?, dimensionless_unit())),
        "halflife" => Ok(Scalar::real(table.half_life(isotope)?, dimensionless_unit())),
        "gyromag" => Ok(Scalar::real(table.gyromagnetic_ratio(isotope)?, dimensionless_unit())),
        "µ" => Ok(Scalar::real(table.magnetic_dipole_moment(isotope)?, dimensionless_unit())),
        "Q" => Ok(Scalar::real(table.quadrupole_moment(isotope)?, dimensionless_unit())),
        "nmr" => Ok(Scalar::real(table.nmr_frequency(isotope)?, dimensionless_unit())),
        _ => unreachable!("checked against ISOTOPE_FUNCTIONS"),
    }
}

pub fn parse_scalar(input: &str, lib: &mut UnitLibrary, table: &PeriodicTable) -> Result<Scalar, SiqError> {
    let normalized = normalize(input);
    let tokens = lex(&normalized)?;
    let mut parser = Parser { tokens, pos: 0, lib, table };
    parser.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::VolumeFamily;

    fn setup() -> (UnitLibrary, PeriodicTable) {
        (UnitLibrary::new_with_locale(VolumeFamily::UsCustomary), PeriodicTable::new())
    }

    #[test]
    fn parses_plain_number() {
        let (mut lib, table) = setup();
        let s = parse_scalar("3.5", &mut lib, &table).unwrap();
        assert!((s.real_part() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn parses_value_with_unit_bracket() {
        let (mut lib, table) = setup();
        let s = parse_scalar("5[meter]", &mut lib, &table).unwrap();
        assert!((s.real_part() - 5.0).abs() < 1e-12);
        assert_eq!(s.unit.dimensionality().symbol(), "L");
    }

    #[test]
    fn arithmetic_with_units_converts() {
        let (mut lib, table) = setup();
        let s = parse_scalar("1[kilometer] + 500[meter]", &mut lib, &table).unwrap();
        assert!((s.real_part() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn imaginary_unit_and_conj() {
        let (mut lib, table) = setup();
        let s = parse_scalar("conj(3+4*i)", &mut lib, &table).unwrap();
        assert!((s.real_part() - 3.0).abs() < 1e-9);
        assert!((s.imag_part() - -4.0).abs() < 1e-9);
    }

    #[test]
    fn sqrt_of_four_is_two() {
        let (mut lib, table) = setup();
        let s = parse_scalar("sqrt(4)", &mut lib, &table).unwrap();
        assert!((s.real_part() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn implicit_multiplication_around_parens() {
        let (mut lib, table) = setup();
        let s = parse_scalar("2(3+4)", &mut lib, &table).unwrap();
        assert!((s.real_part() - 14.0).abs() < 1e-9);
    }

    #[test]
    fn trailing_conversion_clause() {
        let (mut lib, table) = setup();
        let s = parse_scalar("1[kilometer] => meter", &mut lib, &table).unwrap();
        assert!((s.real_part() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn isotope_function_looks_up_atomic_weight() {
        let (mut lib, table) = setup();
        let s = parse_scalar("aw(C)", &mut lib, &table).unwrap();
        assert!(s.real_part() > 12.0 && s.real_part() < 12.02);
    }

    #[test]
    fn parses_bare_unit_suffix_without_brackets() {
        let (mut lib, table) = setup();
        let s = parse_scalar("3 pound*foot^2/second^2", &mut lib, &table).unwrap();
        assert!((s.real_part() - 3.0).abs() < 1e-9);
        assert_eq!(s.unit.dimensionality().symbol(), "L^2·M/T^2");
    }

    #[test]
    fn trig_function_requires_dimensionless_argument() {
        let (mut lib, table) = setup();
        assert!(matches!(
            parse_scalar("sin(1 m)", &mut lib, &table),
            Err(SiqError::IncompatibleDimensionality { .. })
        ));
    }

    #[test]
    fn sqrt_of_area_yields_length_unit() {
        let (mut lib, table) = setup();
        let s = parse_scalar("sqrt(4[meter^2])", &mut lib, &table).unwrap();
        assert!((s.real_part() - 2.0).abs() < 1e-9);
        assert_eq!(s.unit.dimensionality().symbol(), "L");
    }

    #[test]
    fn magnetic_and_quadrupole_moment_functions_use_literal_names() {
        let (mut lib, table) = setup();
        let mu = parse_scalar("µ(1H)", &mut lib, &table).unwrap();
        assert!((mu.real_part() - 2.792847).abs() < 1e-6);
        let q = parse_scalar("Q(2H)", &mut lib, &table).unwrap();
        assert!((q.real_part() - 0.00286).abs() < 1e-6);
    }

    #[test]
    fn division_by_zero_scalar_errors() {
        let (mut lib, table) = setup();
        assert_eq!(parse_scalar("1/0", &mut lib, &table), Err(SiqError::DivisionByZero));
    }
}
