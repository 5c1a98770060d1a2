//! Citation parsing.
//!
//! [`RefParser`] turns a citation string into a [`Ref`] using the registry
//! for title resolution. Latin-script citations go through the grammar
//! below; Hebrew-script ones are first rewritten into Latin form by
//! [`crate::hebrew_grammar`].
//!
//! Successful parses are memoized per `(normalized string, pad)` for as long
//! as the registry generation they were computed under is current.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use lectern_index::IndexRegistry;
use lectern_types::Alias;

use crate::algebra;
use crate::daf::{daf_to_section, parse_daf, parse_daf_section};
use crate::error::{RefError, RefResult};
use crate::hebrew::contains_hebrew;
use crate::hebrew_grammar;
use crate::types::{Ref, Shorthand};

static SECTION_HEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+) (\d\S*)$").expect("head pattern is valid"));
static TALMUD_RANGE_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ .:]").expect("range split pattern is valid"));
static DAF_WITH_AMUD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[ab]$").expect("daf pattern is valid"));

/// Alias targets may themselves be aliases, but not indefinitely.
const MAX_ALIAS_HOPS: usize = 8;

/// Normalize a Latin-script citation: en dash to hyphen, `:` and `_` to
/// `.` and space, trimmed, first letter upper-cased.
pub fn normalize_citation(citation: &str) -> String {
    let s = citation
        .trim()
        .replace('\u{2013}', "-")
        .replace(':', ".")
        .replace('_', " ");
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Default)]
struct ParseMemo {
    generation: u64,
    entries: HashMap<(String, bool), Ref>,
}

/// Parses citation strings against an [`IndexRegistry`].
#[derive(Debug)]
pub struct RefParser {
    registry: Arc<IndexRegistry>,
    memo: RwLock<ParseMemo>,
}

impl RefParser {
    pub fn new(registry: Arc<IndexRegistry>) -> Self {
        let generation = registry.generation();
        Self {
            registry,
            memo: RwLock::new(ParseMemo {
                generation,
                entries: HashMap::new(),
            }),
        }
    }

    pub fn registry(&self) -> &Arc<IndexRegistry> {
        &self.registry
    }

    /// Parse a citation. With `pad`, missing sections are filled with 1 down
    /// to one level above the segment level (`"Genesis"` -> `Genesis 1`).
    pub fn parse(&self, citation: &str, pad: bool) -> RefResult<Ref> {
        let trimmed = citation.trim();
        if contains_hebrew(trimmed) {
            let latin = hebrew_grammar::to_latin(&self.registry, trimmed)?;
            return self.parse(&latin, pad);
        }

        let key = normalize_citation(trimmed);
        if let Some(hit) = self.memo_get(&key, pad) {
            return Ok(hit);
        }

        let generation = self.registry.generation();
        let parsed = self.parse_latin(&key, pad, 0)?;
        debug!(citation = %key, pad, canonical = %parsed, "parsed ref");
        self.memo_put(generation, key, pad, parsed.clone());
        Ok(parsed)
    }

    fn memo_get(&self, key: &str, pad: bool) -> Option<Ref> {
        let memo = self.memo.read().ok()?;
        if memo.generation != self.registry.generation() {
            return None;
        }
        memo.entries.get(&(key.to_string(), pad)).cloned()
    }

    fn memo_put(&self, generation: u64, key: String, pad: bool, parsed: Ref) {
        let current = self.registry.generation();
        if generation != current {
            return;
        }
        if let Ok(mut memo) = self.memo.write() {
            if memo.generation != current {
                memo.generation = current;
                memo.entries.clear();
            }
            memo.entries.insert((key, pad), parsed);
        }
    }

    // ---------------------------------------------------------------
    // Normalizing helpers
    // ---------------------------------------------------------------

    /// Canonical string of `citation`, zoomed out by `context` levels from
    /// the most specific possible ref (`"Genesis 4:5"`, context 1 ->
    /// `"Genesis 4"`).
    pub fn norm_ref(&self, citation: &str, pad: bool, context: usize) -> RefResult<String> {
        let r = self.parse(citation, pad)?;
        Ok(algebra::widen(&r, context).canonical())
    }

    /// URL form: `"Mishnah Berakhot 3:5"` -> `"Mishnah_Berakhot.3.5"`.
    pub fn url_ref(&self, citation: &str) -> RefResult<String> {
        Ok(algebra::url_form(&self.parse(citation, false)?))
    }

    /// The top-level section containing `citation` (`"Job 4:5"` -> `"Job 4"`).
    pub fn top_section_ref(&self, citation: &str) -> RefResult<String> {
        Ok(algebra::top_section(&self.parse(citation, true)?).canonical())
    }

    /// The section one level above the segment level
    /// (`"Rashi on Genesis 1:2:3"` -> `"Rashi on Genesis 1:2"`).
    pub fn section_level_ref(&self, citation: &str) -> RefResult<String> {
        Ok(algebra::section_level(&self.parse(citation, true)?).canonical())
    }

    // ---------------------------------------------------------------
    // Latin grammar
    // ---------------------------------------------------------------

    fn parse_latin(&self, reference: &str, pad: bool, hops: usize) -> RefResult<Ref> {
        let parts: Vec<&str> = reference.split('-').collect();
        if parts.len() > 2 {
            return Err(RefError::MalformedRange(reference.to_string()));
        }

        let mut bcv: Vec<String> = parts[0].split('.').map(|t| t.trim().to_string()).collect();
        if let Some(caps) = SECTION_HEAD_RE.captures(&bcv[0]) {
            let (book, first) = (caps[1].to_string(), caps[2].to_string());
            bcv[0] = book;
            bcv.insert(1, first);
        }
        let book = bcv[0].clone();
        if book.is_empty() {
            return Err(RefError::UnknownWork(reference.to_string()));
        }

        if let Some(alias) = self.registry.alias_for(&book)? {
            return self.expand_alias(reference, &book, &alias, pad, hops);
        }

        let index = self.registry.resolve(&book)?;
        if index.is_commentator() {
            return Err(RefError::NeedsBaseText(index.title));
        }

        let mut r = Ref::for_work(&index);
        let range_end = parts.get(1).map(|s| s.trim());
        if r.talmud {
            parse_talmud_sections(&mut r, &bcv[1..], range_end, pad, reference)?;
        } else {
            parse_plain_sections(&mut r, &bcv[1..], range_end, pad, reference)?;
        }

        if r.to_sections < r.sections {
            return Err(RefError::MalformedRange(reference.to_string()));
        }
        Ok(r)
    }

    fn expand_alias(
        &self,
        reference: &str,
        book: &str,
        alias: &Alias,
        pad: bool,
        hops: usize,
    ) -> RefResult<Ref> {
        if hops >= MAX_ALIAS_HOPS {
            return Err(RefError::UnknownWork(book.to_string()));
        }
        let target = normalize_citation(&alias.to);
        let rest = reference.strip_prefix(book).unwrap_or("");
        let expanded = match rest.strip_prefix(' ') {
            Some(sections) => format!("{target}.{sections}"),
            None => format!("{target}{rest}"),
        };
        if expanded == reference {
            return Err(RefError::UnknownWork(book.to_string()));
        }

        let mut r = self.parse_latin(&expanded, pad, hops + 1)?;
        let borrowed = self.parse_latin(&target, false, hops + 1)?.sections.len();
        debug!(alias = book, expanded = %expanded, "expanded shorthand");
        r.shorthand = Some(Shorthand {
            name: book.to_string(),
            depth: borrowed,
        });
        Ok(r)
    }
}

fn parse_section(token: &str, reference: &str) -> RefResult<u32> {
    match token.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(RefError::UnparsableSection(reference.to_string())),
    }
}

/// Overwrite the tail of a copy of `sections` with `end`, right-aligned.
fn right_align(sections: &[u32], end: &[u32], reference: &str) -> RefResult<Vec<u32>> {
    if end.is_empty() || end.len() > sections.len() {
        return Err(RefError::MalformedRange(reference.to_string()));
    }
    let mut to = sections.to_vec();
    let delta = sections.len() - end.len();
    to[delta..].copy_from_slice(end);
    Ok(to)
}

fn out_of_bounds(r: &Ref, length: u32) -> RefError {
    RefError::OutOfBounds {
        book: r.book.clone(),
        length,
        unit: r.section_names.first().cloned().unwrap_or_default(),
    }
}

fn parse_plain_sections(
    r: &mut Ref,
    tokens: &[String],
    range_end: Option<&str>,
    pad: bool,
    reference: &str,
) -> RefResult<()> {
    let depth = r.depth();
    if tokens.len() > depth {
        return Err(RefError::UnparsableSection(reference.to_string()));
    }
    let mut sections = tokens
        .iter()
        .map(|t| parse_section(t, reference))
        .collect::<RefResult<Vec<u32>>>()?;
    if pad {
        while sections.len() + 1 < depth {
            sections.push(1);
        }
    }

    let to_sections = match range_end {
        None => sections.clone(),
        Some(end) => {
            let end = end
                .split('.')
                .map(|t| parse_section(t.trim(), reference))
                .collect::<RefResult<Vec<u32>>>()?;
            right_align(&sections, &end, reference)?
        }
    };

    if let Some(length) = r.length {
        check_top_bound(r, &sections, &to_sections, length, length)?;
    }

    r.sections = sections;
    r.to_sections = to_sections;
    Ok(())
}

/// Both range endpoints must fall within the work's top-level `limit`.
/// `length` is the declared length reported back in the error.
fn check_top_bound(
    r: &Ref,
    sections: &[u32],
    to_sections: &[u32],
    limit: u32,
    length: u32,
) -> RefResult<()> {
    let past_end = |s: &[u32]| s.first().is_some_and(|&top| top > limit);
    if past_end(sections) || past_end(to_sections) {
        return Err(out_of_bounds(r, length));
    }
    Ok(())
}

fn parse_talmud_sections(
    r: &mut Ref,
    tokens: &[String],
    range_end: Option<&str>,
    pad: bool,
    reference: &str,
) -> RefResult<()> {
    let depth = r.depth();
    if tokens.len() > depth {
        return Err(RefError::UnparsableSection(reference.to_string()));
    }

    let mut sections = Vec::with_capacity(depth);
    if let Some((daf_token, rest)) = tokens.split_first() {
        let (daf, amud) = parse_daf(daf_token)
            .ok_or_else(|| RefError::UnparsableSection(reference.to_string()))?;
        if let Some(length) = r.length {
            if daf > length {
                return Err(out_of_bounds(r, length));
            }
        }
        sections.push(
            daf_to_section(daf, amud)
                .ok_or_else(|| RefError::UnparsableSection(reference.to_string()))?,
        );
        for t in rest {
            sections.push(parse_section(t, reference)?);
        }
    } else if pad {
        sections.push(if r.bavli { 3 } else { 1 });
    }
    if pad {
        while sections.len() + 1 < depth {
            sections.push(1);
        }
    }

    let to_sections = match range_end {
        None => sections.clone(),
        Some(_) if sections.is_empty() => {
            return Err(RefError::MalformedRange(reference.to_string()));
        }
        Some(end) => {
            let mut values = Vec::new();
            for (i, token) in TALMUD_RANGE_SPLIT_RE
                .split(end)
                .filter(|t| !t.is_empty())
                .enumerate()
            {
                let value = if i == 0 && token == "b" {
                    sections[0]
                        .checked_add(1)
                        .ok_or_else(|| RefError::UnparsableSection(reference.to_string()))?
                } else if i == 0 && DAF_WITH_AMUD_RE.is_match(token) {
                    parse_daf_section(token)
                        .ok_or_else(|| RefError::UnparsableSection(reference.to_string()))?
                } else {
                    parse_section(token, reference)?
                };
                values.push(value);
            }
            right_align(&sections, &values, reference)?
        }
    };

    if let Some(length) = r.length {
        check_top_bound(r, &sections, &to_sections, length.saturating_mul(2), length)?;
    }

    r.sections = sections;
    r.to_sections = to_sections;
    Ok(())
}
