//! Hand-written recursive-descent parser for unit expressions (C4).
//!
//! Grammar: `expr := term (('*'|'/') term)*`, `term := atom ('^' int)?`,
//! `atom := symbol | '(' expr ')'`.

use crate::errors::SiqError;
use crate::library::UnitLibrary;
use crate::prefix::SiPrefix;
use crate::unit::Unit;

/// Parser behavior knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Whether resolving a non-SI-prefixable alias through prefix+root
    /// synthesis registers the synthesized unit back into the library.
    /// Defaults to `false`: parsing should not mutate the library as a
    /// side effect unless a caller opts in.
    pub cache_non_si_alias: bool,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Symbol(String),
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Number(i32),
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer { chars: input.chars().peekable() }
    }

    fn tokens(mut self) -> Result<Vec<Token>, SiqError> {
        let mut out = Vec::new();
        while let Some(&c) = self.chars.peek() {
            match c {
                ' ' | '\t' => {
                    self.chars.next();
                }
                '*' | '·' => {
                    self.chars.next();
                    out.push(Token::Star);
                }
                '/' => {
                    self.chars.next();
                    out.push(Token::Slash);
                }
                '^' => {
                    self.chars.next();
                    out.push(Token::Caret);
                }
                '(' => {
                    self.chars.next();
                    out.push(Token::LParen);
                }
                ')' => {
                    self.chars.next();
                    out.push(Token::RParen);
                }
                '-' | '0'..='9' => {
                    let mut s = String::new();
                    if c == '-' {
                        s.push(c);
                        self.chars.next();
                    }
                    while let Some(&d) = self.chars.peek() {
                        if d.is_ascii_digit() {
                            s.push(d);
                            self.chars.next();
                        } else {
                            break;
                        }
                    }
                    let n: i32 = s
                        .parse()
                        .map_err(|_| SiqError::syntax(format!("invalid exponent `{}`", s)))?;
                    out.push(Token::Number(n));
                }
                _ => {
                    let mut s = String::new();
                    while let Some(&d) = self.chars.peek() {
                        if d.is_alphanumeric() || d == '%' || d == '°' || d == 'Ω' || d == 'µ' {
                            s.push(d);
                            self.chars.next();
                        } else {
                            break;
                        }
                    }
                    if s.is_empty() {
                        return Err(SiqError::syntax(format!("unexpected character `{}`", c)));
                    }
                    out.push(Token::Symbol(s));
                }
            }
        }
        Ok(out)
    }
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    lib: &'a mut UnitLibrary,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn expr(&mut self) -> Result<Unit, SiqError> {
        let mut result = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    let rhs = self.term()?;
                    result = result.multiply(&rhs, self.lib)?;
                }
                Some(Token::Slash) => {
                    self.advance();
                    let rhs = self.term()?;
                    result = result.divide(&rhs, self.lib)?;
                }
                _ => break,
            }
        }
        Ok(result)
    }

    fn term(&mut self) -> Result<Unit, SiqError> {
        let atom = self.atom()?;
        if let Some(Token::Caret) = self.peek() {
            self.advance();
            match self.advance() {
                Some(Token::Number(n)) => Ok(atom.power(n, self.lib)),
                _ => Err(SiqError::syntax("expected integer exponent after `^`")),
            }
        } else {
            Ok(atom)
        }
    }

    fn atom(&mut self) -> Result<Unit, SiqError> {
        match self.advance() {
            Some(Token::Symbol(sym)) => self.resolve_symbol(&sym),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(SiqError::syntax("expected closing `)`")),
                }
            }
            other => Err(SiqError::syntax(format!("unexpected token {:?}", other))),
        }
    }

    fn resolve_symbol(&mut self, sym: &str) -> Result<Unit, SiqError> {
        if let Some(unit) = self.lib.lookup_by_symbol(sym) {
            return Ok(unit);
        }
        if let Some(unit) = self.lib.lookup_by_name(sym) {
            return Ok(unit);
        }
        if let Some(unit) = self.lib.lookup_by_key(sym) {
            return Ok(unit);
        }
        // Attempt on-demand prefix + root synthesis, e.g. "Mm" -> Mega + meter.
        for prefix in SiPrefix::all() {
            if prefix == SiPrefix::None {
                continue;
            }
            let glyph = prefix.symbol();
            if !glyph.is_empty() && sym.starts_with(glyph) {
                let root_sym = &sym[glyph.len()..];
                if let Some(root_unit) = self
                    .lib
                    .lookup_by_symbol(root_sym)
                    .or_else(|| self.lib.lookup_by_name(root_sym))
                {
                    if root_unit.allows_si_prefix() {
                        let synthesized = synthesize_prefixed(&root_unit, prefix);
                        if self.options.cache_non_si_alias {
                            let name = format!("{}{}", prefix.name(), root_unit.root_name().unwrap_or(root_sym));
                            return self.lib.register(name, synthesized);
                        }
                        return Ok(synthesized);
                    }
                }
            }
        }
        Err(SiqError::unknown_symbol(sym))
    }
}

fn synthesize_prefixed(root: &Unit, prefix: SiPrefix) -> Unit {
    let dim_idx = crate::dimensionality::BASE_DIMENSIONS
        .iter()
        .copied()
        .find(|&d| root.dimensionality().num_exp(d) != 0);
    let mut num_prefix = root.num_prefix();
    if let Some(d) = dim_idx {
        num_prefix[d.index()] = prefix;
    }
    let relative_exp = prefix.exponent() - root.root_symbol_prefix().exponent();
    let scale = root.scale_to_coherent_si() * 10f64.powi(relative_exp);
    Unit::from_parts(
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
    )
}

/// Rewrites `sym^(num/den)` groups to a plain integer exponent when `num` is
/// evenly divisible by `den`, and rejects the expression with
/// `FractionalExponent` otherwise. Leaves every other parenthesized group
/// (ordinary sub-expressions, not exponents) untouched.
fn resolve_caret_parens(expr: &str) -> Result<String, SiqError> {
    let chars: Vec<char> = expr.chars().collect();
    let mut out = String::with_capacity(expr.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '^' && i + 1 < chars.len() && chars[i + 1] == '(' {
            let start = i + 2;
            let mut depth = 1;
            let mut j = start;
            while j < chars.len() && depth > 0 {
                match chars[j] {
                    '(' => depth += 1,
                    ')' => depth -= 1,
                    _ => {}
                }
                if depth > 0 {
                    j += 1;
                }
            }
            if j >= chars.len() {
                return Err(SiqError::syntax("unterminated exponent group"));
            }
            let inner: String = chars[start..j].iter().collect();
            out.push('^');
            out.push_str(&resolve_exponent_fraction(&inner)?);
            i = j + 1;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    Ok(out)
}

fn resolve_exponent_fraction(inner: &str) -> Result<String, SiqError> {
    match inner.split_once('/') {
        Some((num, den)) => {
            let num: i64 = num
                .trim()
                .parse()
                .map_err(|_| SiqError::syntax(format!("invalid exponent `{}`", inner)))?;
            let den: i64 = den
                .trim()
                .parse()
                .map_err(|_| SiqError::syntax(format!("invalid exponent `{}`", inner)))?;
            if den == 0 || num % den != 0 {
                return Err(SiqError::FractionalExponent);
            }
            Ok((num / den).to_string())
        }
        None => {
            let n: i64 = inner
                .trim()
                .parse()
                .map_err(|_| SiqError::syntax(format!("invalid exponent `{}`", inner)))?;
            Ok(n.to_string())
        }
    }
}

/// Parses `expr` against `lib`, cleaning the expression first.
pub fn parse_unit(expr: &str, lib: &mut UnitLibrary, options: ParseOptions) -> Result<Unit, SiqError> {
    let resolved = resolve_caret_parens(expr)?;
    let cleaned = crate::cleaner::clean(&resolved);
    if cleaned.trim().is_empty() {
        return Ok(Unit::dimensionless());
    }
    let tokens = Lexer::new(&cleaned).tokens()?;
    let mut parser = Parser { tokens, pos: 0, lib, options };
    let unit = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(SiqError::syntax("trailing tokens after unit expression"));
    }
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::VolumeFamily;

    fn lib() -> UnitLibrary {
        UnitLibrary::new_with_locale(VolumeFamily::UsCustomary)
    }

    #[test]
    fn parses_simple_symbol() {
        let mut l = lib();
        let u = parse_unit("meter", &mut l, ParseOptions::default()).unwrap();
        assert_eq!(u.root_symbol(), Some("m"));
    }

    #[test]
    fn parses_division_and_multiplication() {
        let mut l = lib();
        let u = parse_unit("meter/second", &mut l, ParseOptions::default()).unwrap();
        assert_eq!(u.dimensionality().symbol(), "L/T");
    }

    #[test]
    fn parses_exponents_and_parens() {
        let mut l = lib();
        let u = parse_unit("meter^2/(second^2)", &mut l, ParseOptions::default()).unwrap();
        assert_eq!(u.dimensionality().symbol(), "L^2/T^2");
    }

    #[test]
    fn synthesizes_prefixed_units_on_demand() {
        let mut l = lib();
        let u = parse_unit("kilometer", &mut l, ParseOptions::default()).unwrap();
        assert!((u.scale_to_coherent_si() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_symbol_errors() {
        let mut l = lib();
        assert!(matches!(
            parse_unit("bloop", &mut l, ParseOptions::default()),
            Err(SiqError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn fractional_exponent_is_rejected() {
        let mut l = lib();
        assert_eq!(parse_unit("meter^(1/2)", &mut l, ParseOptions::default()), Err(SiqError::FractionalExponent));
    }

    #[test]
    fn caret_paren_exponent_reduces_when_whole() {
        let mut l = lib();
        let u = parse_unit("meter^(4/2)", &mut l, ParseOptions::default()).unwrap();
        assert_eq!(u.dimensionality().symbol(), "L^2");
    }

    #[test]
    fn cache_non_si_alias_defaults_to_false() {
        let mut l = lib();
        let before = l.names().len();
        parse_unit("kilometer", &mut l, ParseOptions::default()).unwrap();
        assert_eq!(l.names().len(), before);
    }
}
