//! Shared fixtures for unit tests.

use lectern_types::{Language, TextTree, UserId, WorkIndex};

use crate::library::{Library, LibraryBuilder};
use crate::request::TextSubmission;

fn works() -> Vec<WorkIndex> {
    vec![
        WorkIndex::new("Genesis", &["Chapter", "Verse"], &["Tanach", "Torah"])
            .with_length(50)
            .with_variants(&["Gen"])
            .with_hebrew("בראשית", &[]),
        WorkIndex::new("Job", &["Chapter", "Verse"], &["Tanach", "Writings"]).with_length(42),
        WorkIndex::new("Psalms", &["Chapter", "Verse"], &["Tanach", "Writings"]).with_length(150),
        WorkIndex::new("Shabbat", &["Daf", "Line"], &["Talmud", "Bavli", "Seder Moed"])
            .with_length(157)
            .with_hebrew("שבת", &[]),
        WorkIndex::new("Rashi", &["Chapter", "Verse", "Comment"], &["Commentary"])
            .with_hebrew("רש\"י", &[]),
        WorkIndex::new("Mishneh Torah", &["Book", "Chapter", "Law"], &["Halakhah"])
            .with_alias("Hilchot Shabbat", "Mishneh Torah 3"),
    ]
}

pub(crate) fn library_with(configure: impl FnOnce(LibraryBuilder) -> LibraryBuilder) -> Library {
    let lib = configure(Library::builder()).build();
    for work in works() {
        lib.registry().save(work, None).unwrap();
    }
    lib
}

pub(crate) fn library() -> Library {
    library_with(|b| b)
}

pub(crate) fn save_en(lib: &Library, citation: &str, version: &str, text: TextTree) {
    lib.save_text(citation, TextSubmission::new(Language::English, version, text), None)
        .unwrap();
}

pub(crate) fn save_he(lib: &Library, citation: &str, version: &str, text: TextTree) {
    lib.save_text(citation, TextSubmission::new(Language::Hebrew, version, text), None)
        .unwrap();
}

pub(crate) fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}
