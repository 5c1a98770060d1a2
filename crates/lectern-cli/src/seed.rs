//! JSON seed files: the works, texts and links a CLI session starts with.

use std::path::Path;

use anyhow::Context;
use lectern_sdk::{Library, Link, TextSubmission, WorkIndex};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub works: Vec<WorkIndex>,
    #[serde(default)]
    pub texts: Vec<SeedText>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
pub struct SeedText {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(flatten)]
    pub submission: TextSubmission,
}

impl Seed {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading seed {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing seed {}", path.display()))
    }

    /// Save everything into `library`. Works go first so texts and links
    /// can resolve their titles.
    pub fn apply(self, library: &Library) -> anyhow::Result<()> {
        let (works, texts, links) = (self.works.len(), self.texts.len(), self.links.len());
        for work in self.works {
            let title = work.title.clone();
            library
                .save_index(work, None, None)
                .with_context(|| format!("saving index {title}"))?;
        }
        for text in self.texts {
            library
                .save_text(&text.reference, text.submission, None)
                .with_context(|| format!("saving text {}", text.reference))?;
        }
        for link in self.links {
            let refs = link.refs.join(" <> ");
            library
                .save_link(link, None)
                .with_context(|| format!("saving link {refs}"))?;
        }
        debug!(works, texts, links, "seed applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_sdk::{Language, TextRequest, TextTree};
    use std::io::Write;

    const SEED: &str = r#"{
        "works": [
            {"title": "Job", "sectionNames": ["Chapter", "Verse"], "categories": ["Tanach", "Writings"], "length": 42},
            {"title": "Psalms", "sectionNames": ["Chapter", "Verse"], "categories": ["Tanach", "Writings"], "length": 150}
        ],
        "texts": [
            {"ref": "Job 3", "versionTitle": "JPS", "language": "en", "text": ["Afterward Job opened his mouth", "And Job spoke"]}
        ],
        "links": [
            {"refs": ["Job 3:1", "Psalms 1:1"], "type": "reference"}
        ]
    }"#;

    #[test]
    fn load_and_apply() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let seed = Seed::load(file.path()).unwrap();
        assert_eq!(seed.works.len(), 2);
        assert_eq!(seed.texts[0].submission.language, Language::English);

        let lib = Library::in_memory();
        seed.apply(&lib).unwrap();

        let text = lib.fetch(&TextRequest::new("Job 3:2").with_context(0)).unwrap();
        assert_eq!(text.text, TextTree::leaf("And Job spoke"));
        let links = lib.links("Job 3", false).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].reference, "Psalms 1:1");
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let seed: Seed = serde_json::from_str("{}").unwrap();
        assert!(seed.works.is_empty() && seed.texts.is_empty() && seed.links.is_empty());
    }

    #[test]
    fn unknown_titles_fail_with_context() {
        let seed: Seed = serde_json::from_str(
            r#"{"texts": [{"ref": "Nowhere 1", "versionTitle": "V", "language": "en", "text": ["x"]}]}"#,
        )
        .unwrap();
        let err = seed.apply(&Library::in_memory()).unwrap_err();
        assert!(err.to_string().contains("Nowhere 1"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Seed::load("/nonexistent/seed.json").is_err());
    }
}
