//! Shared fixtures for unit tests.

use std::sync::Arc;

use lectern_index::IndexRegistry;
use lectern_types::WorkIndex;

use crate::parser::RefParser;

pub(crate) fn library() -> Arc<IndexRegistry> {
    let reg = IndexRegistry::new();
    let works = [
        WorkIndex::new("Genesis", &["Chapter", "Verse"], &["Tanach", "Torah"])
            .with_length(50)
            .with_variants(&["Gen", "Bereishit"])
            .with_hebrew("בראשית", &[]),
        WorkIndex::new("Job", &["Chapter", "Verse"], &["Tanach", "Writings"])
            .with_length(42)
            .with_hebrew("איוב", &[]),
        WorkIndex::new("Shabbat", &["Daf", "Line"], &["Talmud", "Bavli", "Seder Moed"])
            .with_length(157)
            .with_hebrew("שבת", &[]),
        WorkIndex::new("Mishnah Shabbat", &["Chapter", "Mishnah"], &["Mishnah", "Seder Moed"])
            .with_length(24)
            .with_hebrew("משנה שבת", &[]),
        WorkIndex::new("Rashi", &["Chapter", "Verse", "Comment"], &["Commentary"])
            .with_hebrew("רש\"י", &[]),
        WorkIndex::new("Mishneh Torah", &["Book", "Chapter", "Law"], &["Halakhah"])
            .with_alias("Hilchot Shabbat", "Mishneh Torah 3"),
        WorkIndex::new("Psalms", &["Chapter", "Verse"], &["Tanach", "Writings"]).with_length(150),
    ];
    for w in works {
        reg.save(w, None).unwrap();
    }
    Arc::new(reg)
}

pub(crate) fn parser() -> RefParser {
    RefParser::new(library())
}
