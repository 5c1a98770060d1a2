//! Finding citations embedded in free text.
//!
//! Only titles already known to the registry and present verbatim in the
//! text are considered, so the pattern is built per call from that short
//! list. Hebrew citations must sit inside `()` or `[]` to be picked up;
//! bare Hebrew numerals are too easily confused with ordinary words.

use regex::Regex;

use lectern_index::IndexRegistry;

use crate::error::RefResult;

const HEBREW_NUMERAL: &str = r#"[א-ת"'׳״]+"#;

fn alternation(mut titles: Vec<String>) -> String {
    titles.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    titles
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|")
}

/// Latin-script citations of known titles in `text`, in order of
/// appearance: a title, a section, up to two more levels, and an optional
/// range end.
pub fn latin_citations(registry: &IndexRegistry, text: &str) -> RefResult<Vec<String>> {
    let titles = registry.titles_in_text(text)?;
    if titles.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = format!(
        r"\b((?:{}) \d+[ab]?(?:[ .:]\d+)?(?:[ .:]\d+)?(?:-\d+[ab]?(?:[ .:]\d+)?)?)\b",
        alternation(titles)
    );
    let re = Regex::new(&pattern)?;
    Ok(re.captures_iter(text).map(|c| c[1].to_string()).collect())
}

/// Hebrew-script citations of known titles in `text`, found only inside
/// brackets. The returned strings exclude the brackets.
pub fn hebrew_citations(registry: &IndexRegistry, text: &str) -> RefResult<Vec<String>> {
    let titles = registry.hebrew_titles_in_text(text)?;
    if titles.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = format!(
        r"[(\[]((?:{})\s+{num}(?:[\s,:.]+{num})*)\s*[.:]?[)\]]",
        alternation(titles),
        num = HEBREW_NUMERAL
    );
    let re = Regex::new(&pattern)?;
    Ok(re.captures_iter(text).map(|c| c[1].trim().to_string()).collect())
}

/// Every candidate citation in `text`, Latin matches first.
pub fn citations_in_text(registry: &IndexRegistry, text: &str) -> RefResult<Vec<String>> {
    let mut found = latin_citations(registry, text)?;
    found.extend(hebrew_citations(registry, text)?);
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::library;

    #[test]
    fn finds_latin_citations() {
        let reg = library();
        let text = "As it says in Genesis 1:3, and compare Job 4:5-7. Genesis alone is not a citation.";
        assert_eq!(latin_citations(&reg, text).unwrap(), vec!["Genesis 1:3", "Job 4:5-7"]);
    }

    #[test]
    fn longest_title_wins() {
        let reg = library();
        let text = "See Mishnah Shabbat 2:3 and Gen 2:4 and Shabbat 13b.";
        assert_eq!(
            latin_citations(&reg, text).unwrap(),
            vec!["Mishnah Shabbat 2:3", "Gen 2:4", "Shabbat 13b"]
        );
    }

    #[test]
    fn hebrew_requires_brackets() {
        let reg = library();
        let text = "כמו שכתוב (בראשית א ב) וגם בראשית ג ד בלי סוגריים [איוב ד:ה]";
        assert_eq!(hebrew_citations(&reg, text).unwrap(), vec!["בראשית א ב", "איוב ד:ה"]);
    }

    #[test]
    fn no_known_titles_means_nothing() {
        let reg = library();
        assert!(citations_in_text(&reg, "Exodus 3:14").unwrap().is_empty());
    }

    #[test]
    fn combined_scan_orders_latin_first() {
        let reg = library();
        let text = "(בראשית א ב) then Job 1:1";
        assert_eq!(citations_in_text(&reg, text).unwrap(), vec!["Job 1:1", "בראשית א ב"]);
    }
}
