use serde::{Deserialize, Serialize};

use lectern_types::{Alias, WorkIndex};

/// A partial index record. Present fields replace the stored ones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_variants: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he_title_variants: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, rename = "maps", skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<Alias>>,
}

impl IndexPatch {
    pub fn apply(self, mut index: WorkIndex) -> WorkIndex {
        if let Some(v) = self.he_title {
            index.he_title = Some(v);
        }
        if let Some(v) = self.title_variants {
            index.title_variants = v;
        }
        if let Some(v) = self.he_title_variants {
            index.he_title_variants = v;
        }
        if let Some(v) = self.section_names {
            index.section_names = v;
        }
        if let Some(v) = self.categories {
            index.categories = v;
        }
        if let Some(v) = self.length {
            index.length = Some(v);
        }
        if let Some(v) = self.aliases {
            index.aliases = v;
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_present_fields_change() {
        let base = WorkIndex::new("Genesis", &["Chapter", "Verse"], &["Tanach", "Torah"]);
        let patch: IndexPatch = serde_json::from_str(r#"{"length": 50}"#).unwrap();
        let patched = patch.apply(base.clone());
        assert_eq!(patched.length, Some(50));
        assert_eq!(patched.section_names, base.section_names);
        assert_eq!(patched.categories, base.categories);
    }
}
