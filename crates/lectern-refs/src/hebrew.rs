//! Hebrew numerals (gematria).
//!
//! Letters carry fixed values: units א..ט, tens י..צ, hundreds ק..ת. Final
//! forms (ך ם ן ף ץ) count the same as their regular forms. 15 and 16 are
//! written טו and טז to avoid spelling the divine name. Geresh and gershayim
//! marks (and their ASCII stand-ins) are ignored when decoding.

const UNITS: [char; 9] = ['א', 'ב', 'ג', 'ד', 'ה', 'ו', 'ז', 'ח', 'ט'];
const TENS: [char; 9] = ['י', 'כ', 'ל', 'מ', 'נ', 'ס', 'ע', 'פ', 'צ'];
const HUNDREDS: [char; 4] = ['ק', 'ר', 'ש', 'ת'];

/// Marks that may punctuate a numeral without changing its value.
pub const NUMERAL_MARKS: &[char] = &['"', '\'', '\u{05F3}', '\u{05F4}'];

fn letter_value(c: char) -> Option<u32> {
    let v = match c {
        'א' => 1,
        'ב' => 2,
        'ג' => 3,
        'ד' => 4,
        'ה' => 5,
        'ו' => 6,
        'ז' => 7,
        'ח' => 8,
        'ט' => 9,
        'י' => 10,
        'כ' | 'ך' => 20,
        'ל' => 30,
        'מ' | 'ם' => 40,
        'נ' | 'ן' => 50,
        'ס' => 60,
        'ע' => 70,
        'פ' | 'ף' => 80,
        'צ' | 'ץ' => 90,
        'ק' => 100,
        'ר' => 200,
        'ש' => 300,
        'ת' => 400,
        _ => return None,
    };
    Some(v)
}

/// True for characters in the Hebrew Unicode block.
pub fn is_hebrew_char(c: char) -> bool {
    ('\u{0590}'..='\u{05FF}').contains(&c)
}

/// True if `s` contains any Hebrew-script character.
pub fn contains_hebrew(s: &str) -> bool {
    s.chars().any(is_hebrew_char)
}

/// Encode a positive integer as a Hebrew numeral. Zero encodes as empty.
pub fn encode_hebrew_numeral(n: u32) -> String {
    let mut out = String::new();
    let mut rest = n;

    while rest >= 400 {
        out.push('ת');
        rest -= 400;
    }
    if rest >= 100 {
        out.push(HUNDREDS[(rest / 100 - 1) as usize]);
        rest %= 100;
    }
    match rest {
        15 => out.push_str("טו"),
        16 => out.push_str("טז"),
        _ => {
            if rest >= 10 {
                out.push(TENS[(rest / 10 - 1) as usize]);
                rest %= 10;
            }
            if rest > 0 {
                out.push(UNITS[(rest - 1) as usize]);
            }
        }
    }
    out
}

/// Decode a Hebrew numeral by summing letter values. `None` if the string
/// is empty or contains anything other than numeral letters and marks.
pub fn decode_hebrew_numeral(s: &str) -> Option<u32> {
    let mut total = 0u32;
    let mut seen = false;
    for c in s.chars() {
        if NUMERAL_MARKS.contains(&c) {
            continue;
        }
        total = total.checked_add(letter_value(c)?)?;
        seen = true;
    }
    seen.then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encodes_common_values() {
        assert_eq!(encode_hebrew_numeral(1), "א");
        assert_eq!(encode_hebrew_numeral(15), "טו");
        assert_eq!(encode_hebrew_numeral(16), "טז");
        assert_eq!(encode_hebrew_numeral(42), "מב");
        assert_eq!(encode_hebrew_numeral(115), "קטו");
        assert_eq!(encode_hebrew_numeral(613), "תריג");
        assert_eq!(encode_hebrew_numeral(0), "");
    }

    #[test]
    fn decodes_finals_and_marks() {
        assert_eq!(decode_hebrew_numeral("ך"), Some(20));
        assert_eq!(decode_hebrew_numeral("מ\"ב"), Some(42));
        assert_eq!(decode_hebrew_numeral("ל׳"), Some(30));
        assert_eq!(decode_hebrew_numeral("טו"), Some(15));
        assert_eq!(decode_hebrew_numeral(""), None);
        assert_eq!(decode_hebrew_numeral("\""), None);
        assert_eq!(decode_hebrew_numeral("אb"), None);
    }

    #[test]
    fn script_detection() {
        assert!(contains_hebrew("בראשית א"));
        assert!(!contains_hebrew("Genesis 1:1"));
    }

    proptest! {
        #[test]
        fn numeral_round_trip(n in 1u32..5000) {
            prop_assert_eq!(decode_hebrew_numeral(&encode_hebrew_numeral(n)), Some(n));
        }
    }
}
