//! Ordinal renderings for list bullets.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Numbering {
    /// A literal symbol, no ordinal.
    #[default]
    Symbol,
    Numeric,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
    LowerGreek,
    UpperGreek,
}

impl Numbering {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "symbol" => Numbering::Symbol,
            "numeric" => Numbering::Numeric,
            "lowerAlpha" => Numbering::LowerAlpha,
            "upperAlpha" => Numbering::UpperAlpha,
            "lowerRoman" => Numbering::LowerRoman,
            "upperRoman" => Numbering::UpperRoman,
            "lowerGreek" => Numbering::LowerGreek,
            "upperGreek" => Numbering::UpperGreek,
            _ => return None,
        })
    }

    /// Render `n`, or `None` for `Symbol`.
    pub fn format(&self, n: u32) -> Option<String> {
        match self {
            Numbering::Symbol => None,
            Numbering::Numeric => Some(numeric(n)),
            Numbering::LowerAlpha => Some(alpha(n)),
            Numbering::UpperAlpha => Some(alpha(n).to_uppercase()),
            Numbering::LowerRoman => Some(roman(n)),
            Numbering::UpperRoman => Some(roman(n).to_uppercase()),
            Numbering::LowerGreek => Some(greek(n)),
            Numbering::UpperGreek => Some(greek(n).to_uppercase()),
        }
    }
}

pub fn numeric(n: u32) -> String {
    n.to_string()
}

/// Bijective base-26: a..z, aa..az, ba...
pub fn alpha(n: u32) -> String {
    bijective(n, &LATIN)
}

/// Bijective base-24 over the lowercase Greek alphabet (no final sigma).
pub fn greek(n: u32) -> String {
    bijective(n, &GREEK)
}

/// Lowercase roman numerals for 1..=3999; anything else falls back to
/// decimal.
pub fn roman(n: u32) -> String {
    if n == 0 || n > 3999 {
        return numeric(n);
    }
    const TABLE: [(u32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut rest = n;
    let mut out = String::new();
    for (value, digits) in TABLE {
        while rest >= value {
            out.push_str(digits);
            rest -= value;
        }
    }
    out
}

const LATIN: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

const GREEK: [char; 24] = [
    'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π', 'ρ', 'σ', 'τ',
    'υ', 'φ', 'χ', 'ψ', 'ω',
];

fn bijective(n: u32, digits: &[char]) -> String {
    if n == 0 {
        return numeric(n);
    }
    let base = digits.len() as u32;
    let mut rest = n;
    let mut out = Vec::new();
    while rest > 0 {
        rest -= 1;
        out.push(digits[(rest % base) as usize]);
        rest /= base;
    }
    out.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_wraps_bijectively() {
        assert_eq!(alpha(1), "a");
        assert_eq!(alpha(26), "z");
        assert_eq!(alpha(27), "aa");
        assert_eq!(alpha(52), "az");
        assert_eq!(alpha(703), "aaa");
    }

    #[test]
    fn roman_numerals() {
        assert_eq!(roman(4), "iv");
        assert_eq!(roman(9), "ix");
        assert_eq!(roman(14), "xiv");
        assert_eq!(roman(1994), "mcmxciv");
        assert_eq!(roman(3999), "mmmcmxcix");
        assert_eq!(roman(4000), "4000");
        assert_eq!(roman(0), "0");
    }

    #[test]
    fn greek_letters() {
        assert_eq!(greek(1), "α");
        assert_eq!(greek(24), "ω");
        assert_eq!(greek(25), "αα");
        assert_eq!(Numbering::UpperGreek.format(2).unwrap(), "\u{392}");
    }

    #[test]
    fn format_by_style() {
        assert_eq!(Numbering::Symbol.format(3), None);
        assert_eq!(Numbering::Numeric.format(3).unwrap(), "3");
        assert_eq!(Numbering::UpperAlpha.format(3).unwrap(), "C");
        assert_eq!(Numbering::UpperRoman.format(12).unwrap(), "XII");
        assert_eq!(Numbering::from_name("lowerRoman"), Some(Numbering::LowerRoman));
        assert_eq!(Numbering::from_name("bogus"), None);
    }
}
