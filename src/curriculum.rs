use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::error::Error;

static DATA_DIR: Dir = include_dir!("src/data");

/// The seven spelling levels, ordered from first to last. Level names on
/// the wire are lowercase ("nivel1" .. "nivel7"); anything else is not a
/// level and is dropped at the persistence boundary.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LevelId {
    Nivel1,
    Nivel2,
    Nivel3,
    Nivel4,
    Nivel5,
    Nivel6,
    Nivel7,
}

impl LevelId {
    pub const ALL: [LevelId; 7] = [
        LevelId::Nivel1,
        LevelId::Nivel2,
        LevelId::Nivel3,
        LevelId::Nivel4,
        LevelId::Nivel5,
        LevelId::Nivel6,
        LevelId::Nivel7,
    ];

    /// Parse a persisted level name; unknown names yield None.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|l| l.to_string() == name)
    }

    /// Zero-based position in the level order.
    pub fn position(self) -> usize {
        Self::ALL.iter().position(|l| *l == self).unwrap_or(0)
    }

    /// One-based level number for display.
    pub fn number(self) -> usize {
        self.position() + 1
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.position() + 1).copied()
    }

    pub fn prev(self) -> Option<Self> {
        self.position().checked_sub(1).map(|i| Self::ALL[i])
    }
}

/// A single word or sentence to spell, with the emoji shown alongside it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumItem {
    pub text: String,
    pub media_key: String,
    pub difficulty: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub title: String,
    pub items: Vec<CurriculumItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Curriculum {
    levels: Vec<Level>,
}

impl Curriculum {
    /// The curriculum embedded in the binary.
    pub fn builtin() -> Self {
        read_curriculum_from_file("words.json").unwrap()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, id: LevelId) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// Items of a level; a level absent from the curriculum has no items.
    pub fn items(&self, id: LevelId) -> &[CurriculumItem] {
        self.level(id).map_or(&[], |l| l.items.as_slice())
    }

    pub fn item(&self, id: LevelId, index: usize) -> Option<&CurriculumItem> {
        self.items(id).get(index)
    }
}

fn read_curriculum_from_file(file_name: &str) -> Result<Curriculum, Box<dyn Error>> {
    let file = DATA_DIR
        .get_file(file_name)
        .expect("Curriculum file not found");

    let file_as_str = file
        .contents_utf8()
        .expect("Unable to interpret file as a string");

    let curriculum = from_str(file_as_str).expect("Unable to deserialize curriculum json");
    Ok(curriculum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_curriculum_has_all_levels() {
        let curriculum = Curriculum::builtin();
        assert_eq!(curriculum.levels().len(), 7);
        for id in LevelId::ALL {
            let level = curriculum.level(id).unwrap();
            assert_eq!(level.id, id);
            assert!(!level.items.is_empty(), "{id} has no items");
            assert!(!level.title.is_empty());
        }
    }

    #[test]
    fn test_builtin_first_level_starts_with_short_words() {
        let curriculum = Curriculum::builtin();
        let items = curriculum.items(LevelId::Nivel1);
        assert_eq!(items.len(), 15);
        assert_eq!(items[0].text, "sol");
        assert!(items.iter().all(|item| item.difficulty == 1));
        assert!(items.iter().all(|item| !item.media_key.is_empty()));
    }

    #[test]
    fn test_builtin_sentences_are_lowercase() {
        let curriculum = Curriculum::builtin();
        for id in LevelId::ALL {
            for item in curriculum.items(id) {
                assert_eq!(item.text, item.text.to_lowercase());
            }
        }
    }

    #[test]
    fn test_level_id_names_roundtrip() {
        for id in LevelId::ALL {
            assert_eq!(LevelId::from_name(&id.to_string()), Some(id));
        }
        assert_eq!(LevelId::Nivel3.to_string(), "nivel3");
        assert_eq!(LevelId::from_name("nivel8"), None);
        assert_eq!(LevelId::from_name("Nivel1"), None);
        assert_eq!(LevelId::from_name(""), None);
    }

    #[test]
    fn test_level_id_order() {
        assert_eq!(LevelId::Nivel1.position(), 0);
        assert_eq!(LevelId::Nivel7.number(), 7);
        assert_eq!(LevelId::Nivel1.next(), Some(LevelId::Nivel2));
        assert_eq!(LevelId::Nivel7.next(), None);
        assert_eq!(LevelId::Nivel1.prev(), None);
        assert_eq!(LevelId::Nivel4.prev(), Some(LevelId::Nivel3));
    }

    #[test]
    fn test_curriculum_deserialization() {
        let curriculum: Curriculum = from_str(
            r#"{
                "levels": [
                    {
                        "id": "nivel1",
                        "title": "Palabras cortas",
                        "items": [
                            { "text": "sol", "mediaKey": "☀️", "difficulty": 1 }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(curriculum.levels().len(), 1);
        assert_eq!(curriculum.items(LevelId::Nivel1)[0].text, "sol");
        assert_eq!(curriculum.items(LevelId::Nivel1)[0].media_key, "☀️");
        assert!(curriculum.items(LevelId::Nivel2).is_empty());
        assert!(curriculum.item(LevelId::Nivel1, 1).is_none());
    }
}
