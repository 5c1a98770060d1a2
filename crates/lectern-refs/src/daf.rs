//! Talmud pagination.
//!
//! A daf (leaf) has two sides, amud a and amud b. Both are stored as one
//! increasing integer section: `section = daf * 2 - 1` for side a and
//! `daf * 2` for side b, so 2a is 3 and 2b is 4.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::hebrew::encode_hebrew_numeral;

static DAF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)([ab])?$").expect("daf pattern is valid"));

/// One side of a daf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Amud {
    A,
    B,
}

impl Amud {
    pub fn letter(self) -> char {
        match self {
            Amud::A => 'a',
            Amud::B => 'b',
        }
    }

    fn hebrew_letter(self) -> char {
        match self {
            Amud::A => 'א',
            Amud::B => 'ב',
        }
    }
}

/// Section number of a daf side, or `None` if it does not fit in a `u32`.
pub fn daf_to_section(daf: u32, amud: Amud) -> Option<u32> {
    let b_side = daf.checked_mul(2)?;
    match amud {
        Amud::A => b_side.checked_sub(1),
        Amud::B => Some(b_side),
    }
}

/// Split a section number into its daf and amud.
pub fn section_to_daf_parts(section: u32) -> (u32, Amud) {
    let daf = section / 2 + section % 2;
    let amud = if section % 2 == 0 { Amud::B } else { Amud::A };
    (daf, amud)
}

/// English daf string: 3 -> `"2a"`, 4 -> `"2b"`.
pub fn section_to_daf(section: u32) -> String {
    let (daf, amud) = section_to_daf_parts(section);
    format!("{daf}{}", amud.letter())
}

/// Hebrew daf string: a numeral, a space, and א or ב.
pub fn section_to_daf_he(section: u32) -> String {
    let (daf, amud) = section_to_daf_parts(section);
    format!("{} {}", encode_hebrew_numeral(daf), amud.hebrew_letter())
}

/// Parse `"55"`, `"55a"`, or `"55b"`. A missing amud means a. Returns the
/// daf number and side; `None` for anything else, including daf 0.
pub fn parse_daf(token: &str) -> Option<(u32, Amud)> {
    let caps = DAF_RE.captures(token)?;
    let daf: u32 = caps[1].parse().ok()?;
    if daf == 0 {
        return None;
    }
    let amud = match caps.get(2).map(|m| m.as_str()) {
        Some("b") => Amud::B,
        _ => Amud::A,
    };
    Some((daf, amud))
}

/// Parse a daf token straight to its section number.
pub fn parse_daf_section(token: &str) -> Option<u32> {
    parse_daf(token).and_then(|(daf, amud)| daf_to_section(daf, amud))
}
