//! Expression cleaning (C3): canonicalize a unit-expression's term ordering,
//! with or without numerator/denominator cancellation.

/// A single `symbol^exponent` factor parsed out of a unit expression.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Term {
    symbol: String,
    exponent: i32,
}

/// Unicode glyphs folded to their ASCII equivalents before tokenizing, so
/// `"m·s⁻¹"` and `"m*s^-1"` clean to the same normal form.
const SUPERSCRIPT_DIGITS: [(char, char); 10] = [
    ('⁰', '0'), ('¹', '1'), ('²', '2'), ('³', '3'), ('⁴', '4'),
    ('⁵', '5'), ('⁶', '6'), ('⁷', '7'), ('⁸', '8'), ('⁹', '9'),
];

fn fold_unicode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '·' | '×' => out.push('*'),
            '÷' => out.push('/'),
            '⁻' => out.push_str("^-"),
            _ if SUPERSCRIPT_DIGITS.iter().any(|(s, _)| *s == c) => {
                let (_, d) = SUPERSCRIPT_DIGITS.iter().find(|(s, _)| *s == c).unwrap();
                if !out.ends_with('^') && !out.ends_with('-') {
                    out.push('^');
                }
                out.push(*d);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Walks the (paren-stripped-of-meaning) expression tracking, for each
/// token, the product of every enclosing `/`'s sign: this grammar has no
/// `+`, so division distributes over multiplication and `a/(b*c)` collapses
/// to `a/b/c` once each term is bucketed to a side by its net sign.
fn tokenize(expr: &str) -> Vec<(String, i32)> {
    let folded = fold_unicode(expr);
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut sign_stack = vec![1i32];
    let mut pending_op: i32 = 1;

    let mut flush = |current: &mut String, tokens: &mut Vec<(String, i32)>, sign: i32| {
        if !current.is_empty() {
            tokens.push((std::mem::take(current), sign));
        }
    };

    for c in folded.chars() {
        match c {
            '*' => {
                flush(&mut current, &mut tokens, *sign_stack.last().unwrap() * pending_op);
                pending_op = 1;
            }
            '/' => {
                flush(&mut current, &mut tokens, *sign_stack.last().unwrap() * pending_op);
                pending_op = -1;
            }
            '(' => {
                flush(&mut current, &mut tokens, *sign_stack.last().unwrap() * pending_op);
                let new_level = *sign_stack.last().unwrap() * pending_op;
                sign_stack.push(new_level);
                pending_op = 1;
            }
            ')' => {
                flush(&mut current, &mut tokens, *sign_stack.last().unwrap() * pending_op);
                if sign_stack.len() > 1 {
                    sign_stack.pop();
                }
                pending_op = 1;
            }
            c if c.is_whitespace() => {}
            _ => current.push(c),
        }
    }
    flush(&mut current, &mut tokens, *sign_stack.last().unwrap() * pending_op);
    tokens
}

fn parse_term(raw: &str) -> Term {
    match raw.split_once('^') {
        Some((sym, exp)) => Term {
            symbol: sym.to_string(),
            exponent: exp.parse().unwrap_or(1),
        },
        None => Term { symbol: raw.to_string(), exponent: 1 },
    }
}

fn split_numerator_denominator(expr: &str) -> (Vec<Term>, Vec<Term>) {
    let mut num = Vec::new();
    let mut den = Vec::new();
    for (raw, sign) in tokenize(expr) {
        let term = parse_term(&raw);
        if sign > 0 {
            num.push(term);
        } else {
            den.push(term);
        }
    }
    (num, den)
}

fn group_identical(terms: Vec<Term>) -> Vec<Term> {
    let mut grouped: Vec<Term> = Vec::new();
    for t in terms {
        if let Some(existing) = grouped.iter_mut().find(|g: &&mut Term| g.symbol == t.symbol) {
            existing.exponent += t.exponent;
        } else {
            grouped.push(t);
        }
    }
    grouped.retain(|t| t.exponent != 0);
    grouped
}

fn sort_alphabetically(mut terms: Vec<Term>) -> Vec<Term> {
    terms.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    terms
}

fn format_expression(num: &[Term], den: &[Term]) -> String {
    let fmt_side = |terms: &[Term]| -> String {
        terms
            .iter()
            .map(|t| {
                if t.exponent == 1 {
                    t.symbol.clone()
                } else {
                    format!("{}^{}", t.symbol, t.exponent)
                }
            })
            .collect::<Vec<_>>()
            .join("·")
    };
    if num.is_empty() && den.is_empty() {
        return " ".to_string();
    }
    let num_str = if num.is_empty() { "1".to_string() } else { fmt_side(num) };
    if den.is_empty() {
        num_str
    } else if den.len() == 1 {
        format!("{}/{}", num_str, fmt_side(den))
    } else {
        format!("{}/({})", num_str, fmt_side(den))
    }
}

/// Groups identical symbols and sorts each side alphabetically, without
/// cancelling terms that appear on both sides (`m*s/m` stays `m/s` only
/// after `clean_and_reduce`, not here — `clean` leaves it as `m/s`... wait,
/// grouping is per-side only, so `m` on both sides survives `clean`).
pub fn clean(expr: &str) -> String {
    let (num, den) = split_numerator_denominator(expr);
    let num = sort_alphabetically(group_identical(num));
    let den = sort_alphabetically(group_identical(den));
    format_expression(&num, &den)
}

/// Like `clean`, but additionally cancels exponents shared between
/// numerator and denominator (`m*s/m` reduces to `s`).
pub fn clean_and_reduce(expr: &str) -> String {
    let (num, den) = split_numerator_denominator(expr);
    let mut num = group_identical(num);
    let mut den = group_identical(den);

    for n in num.iter_mut() {
        if let Some(d) = den.iter_mut().find(|d| d.symbol == n.symbol) {
            let min = n.exponent.min(d.exponent);
            n.exponent -= min;
            d.exponent -= min;
        }
    }
    num.retain(|t| t.exponent != 0);
    den.retain(|t| t.exponent != 0);

    let num = sort_alphabetically(num);
    let den = sort_alphabetically(den);
    format_expression(&num, &den)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_sorts_and_groups_without_cancelling() {
        assert_eq!(clean("s*m*m"), "m^2·s");
        assert_eq!(clean("m*s/m"), "m/s");
    }

    #[test]
    fn clean_matches_spec_example() {
        assert_eq!(clean("m*m*kg/s/s"), "kg·m^2/s^2");
    }

    #[test]
    fn clean_and_reduce_matches_spec_example() {
        assert_eq!(clean_and_reduce("kg*m^2/m"), "kg·m");
    }

    #[test]
    fn clean_and_reduce_cancels_shared_terms() {
        assert_eq!(clean_and_reduce("m*s/m"), "s");
        assert_eq!(clean_and_reduce("kg*m/kg/s"), "m/s");
    }

    #[test]
    fn clean_is_a_fixed_point() {
        let once = clean("m^2*s/(kg*A)");
        let twice = clean(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn clean_and_reduce_is_a_fixed_point() {
        let once = clean_and_reduce("m*s/m*kg/kg");
        let twice = clean_and_reduce(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn unicode_operators_fold_before_tokenizing() {
        assert_eq!(clean("m·s⁻¹"), clean("m*s^-1"));
    }

    #[test]
    fn fully_cancelled_expression_renders_as_space() {
        assert_eq!(clean_and_reduce("m/m"), " ");
        assert_eq!(clean("m*m^-1"), " ");
    }
}
