//! Hebrew-script citation grammar.
//!
//! A Hebrew citation is matched to a work by its Hebrew title (longest
//! prefix wins), then the remainder is read with a grammar chosen by the
//! work's root category. The decoded numbers are written back out as an
//! equivalent Latin citation for the main parser.

use once_cell::sync::Lazy;
use regex::Regex;

use lectern_index::IndexRegistry;

use crate::error::{RefError, RefResult};
use crate::hebrew::decode_hebrew_numeral;

/// "There" (ibid). Resolving it needs the surrounding document.
const IBID: &str = "שם";

static TANACH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^([א-ת"'׳״]+)(?:[\s,:.]+([א-ת"'׳״]+))?$"#)
        .expect("tanach pattern is valid")
});
static MISHNAH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^פ(?:רק)?\s*([א-ת"'׳״]+)[\s,]+מ(?:שנה)?\s*([א-ת"'׳״]+)$"#)
        .expect("mishnah pattern is valid")
});
static PEREK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^פ(?:רק)?\s*([א-ת"'׳״]+)$"#).expect("perek pattern is valid")
});
static DAF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:דף\s*)?([א-ת"'׳״]+)\s*(?:([.:])|\s(?:עמוד\s*|ע["'׳״]?)?([אב]))?$"#,
    )
    .expect("daf pattern is valid")
});

fn numeral(s: &str, input: &str) -> RefResult<u32> {
    match decode_hebrew_numeral(s) {
        Some(n) if n >= 1 => Ok(n),
        _ => Err(RefError::UnparsableSection(input.to_string())),
    }
}

fn first_word(s: &str) -> Option<&str> {
    s.split_whitespace().next()
}

/// Rewrite a Hebrew citation as the equivalent Latin-script citation.
pub fn to_latin(registry: &IndexRegistry, input: &str) -> RefResult<String> {
    let input = input
        .trim()
        .trim_matches(|c| matches!(c, '(' | ')' | '[' | ']'))
        .trim();
    if first_word(input) == Some(IBID) {
        return Err(RefError::UnsupportedHebrewForm(input.to_string()));
    }

    let (work, variant) = registry
        .hebrew_prefix_match(input)?
        .ok_or_else(|| RefError::UnknownWork(input.to_string()))?;
    let rest = input[variant.len()..].trim();
    if first_word(rest) == Some(IBID) {
        return Err(RefError::UnsupportedHebrewForm(input.to_string()));
    }
    let title = work.title.as_str();
    if rest.is_empty() {
        return Ok(title.to_string());
    }

    match work.root_category() {
        "Mishnah" => mishnah_form(title, rest, input),
        "Talmud" => talmud_form(title, rest, input),
        _ => tanach_form(title, rest, input),
    }
}

fn tanach_form(title: &str, rest: &str, input: &str) -> RefResult<String> {
    let caps = TANACH_RE
        .captures(rest)
        .ok_or_else(|| RefError::UnparsableSection(input.to_string()))?;
    let chapter = numeral(&caps[1], input)?;
    match caps.get(2) {
        Some(verse) => Ok(format!("{title} {chapter}:{}", numeral(verse.as_str(), input)?)),
        None => Ok(format!("{title} {chapter}")),
    }
}

fn mishnah_form(title: &str, rest: &str, input: &str) -> RefResult<String> {
    if let Some(caps) = MISHNAH_RE.captures(rest) {
        let perek = numeral(&caps[1], input)?;
        let mishnah = numeral(&caps[2], input)?;
        return Ok(format!("{title} {perek}:{mishnah}"));
    }
    if let Some(caps) = PEREK_RE.captures(rest) {
        return Ok(format!("{title} {}", numeral(&caps[1], input)?));
    }
    tanach_form(title, rest, input)
}

fn talmud_form(title: &str, rest: &str, input: &str) -> RefResult<String> {
    if let Some(caps) = MISHNAH_RE.captures(rest) {
        let perek = numeral(&caps[1], input)?;
        let mishnah = numeral(&caps[2], input)?;
        return Ok(format!("Mishnah {title} {perek}:{mishnah}"));
    }

    let caps = DAF_RE
        .captures(rest)
        .ok_or_else(|| RefError::UnparsableSection(input.to_string()))?;
    let daf = numeral(&caps[1], input)?;
    let amud = match (caps.get(2).map(|m| m.as_str()), caps.get(3).map(|m| m.as_str())) {
        (Some("."), _) | (_, Some("א")) => "a",
        (Some(":"), _) | (_, Some("ב")) => "b",
        _ => "",
    };
    Ok(format!("{title} {daf}{amud}"))
}
