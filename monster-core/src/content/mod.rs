//! Immutable monster content: races, variants, skills and drop tables.
//!
//! Templates are built through explicit constructors (or deserialized from a
//! [`ContentPack`]) and validated once by [`ContentRegistryBuilder::build`].
//! Nothing here is mutated after load.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

pub mod builtin;
pub mod race;
pub mod registry;
pub mod skill;
pub mod variant;

pub use builtin::{starter_pack, starter_registry};
pub use race::{DropEntry, Element, ElementAffinity, RaceDefinition};
pub use registry::{ContentRegistry, ContentRegistryBuilder};
pub use skill::{EffectRange, SkillCategory, SkillDefinition, SkillEffect, SkillKind};
pub use variant::{BehaviorTag, VariantDefinition};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Race template id
    RaceId
);
string_id!(
    /// Variant template id
    VariantId
);
string_id!(
    /// Skill template id
    SkillId
);
string_id!(
    /// Item template id understood by the item-drop collaborator
    ItemId
);

/// Closed grade interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeRange {
    pub min: f32,
    pub max: f32,
}

impl GradeRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Every grade
    pub const fn any() -> Self {
        Self {
            min: f32::MIN,
            max: f32::MAX,
        }
    }

    pub fn contains(&self, grade: f32) -> bool {
        grade >= self.min && grade <= self.max
    }

    pub fn overlaps(&self, other: &GradeRange) -> bool {
        self.min <= self.max && self.min <= other.max && other.min <= self.max
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

impl Default for GradeRange {
    fn default() -> Self {
        Self::any()
    }
}

/// Closed floor interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorRange {
    pub min: u32,
    pub max: u32,
}

impl FloorRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, floor: u32) -> bool {
        floor >= self.min && floor <= self.max
    }
}

impl Default for FloorRange {
    fn default() -> Self {
        Self {
            min: 1,
            max: u32::MAX,
        }
    }
}

/// Reference to a skill, valid only over a grade sub-range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRef {
    pub skill: SkillId,
    #[serde(default)]
    pub grades: GradeRange,
}

impl SkillRef {
    pub fn new(skill: impl Into<String>, min_grade: f32, max_grade: f32) -> Self {
        Self {
            skill: SkillId::new(skill),
            grades: GradeRange::new(min_grade, max_grade),
        }
    }

    /// Valid at every grade
    pub fn always(skill: impl Into<String>) -> Self {
        Self {
            skill: SkillId::new(skill),
            grades: GradeRange::any(),
        }
    }
}

/// Serializable bundle of templates, loadable from RON or JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentPack {
    pub skills: Vec<SkillDefinition>,
    pub races: Vec<RaceDefinition>,
    pub variants: Vec<VariantDefinition>,
}

impl ContentPack {
    pub fn from_ron_str(s: &str) -> Result<Self, ContentError> {
        Ok(ron::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load by extension: `.json` as JSON, anything else as RON
    pub fn from_path(path: &Path) -> Result<Self, ContentError> {
        let text = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_ron_str(&text),
        }
    }

    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Feed every template into a builder
    pub fn into_builder(self, builder: ContentRegistryBuilder) -> ContentRegistryBuilder {
        let builder = self
            .skills
            .into_iter()
            .fold(builder, |b, skill| b.with_skill(skill));
        let builder = self
            .races
            .into_iter()
            .fold(builder, |b, race| b.with_race(race));
        self.variants
            .into_iter()
            .fold(builder, |b, variant| b.with_variant(variant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_range_overlap() {
        let bounds = GradeRange::new(80.0, 120.0);
        assert!(GradeRange::new(110.0, 200.0).overlaps(&bounds));
        assert!(GradeRange::new(120.0, 120.0).overlaps(&bounds));
        assert!(!GradeRange::new(121.0, 200.0).overlaps(&bounds));
        assert!(!GradeRange::new(100.0, 90.0).overlaps(&bounds));
        assert!(GradeRange::any().overlaps(&bounds));
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = RaceId::new("goblin");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"goblin\"");
        assert_eq!(id.to_string(), "goblin");
    }

    #[test]
    fn test_floor_range_default_covers_all_floors() {
        let range = FloorRange::default();
        assert!(range.contains(1));
        assert!(range.contains(900));
        assert!(!range.contains(0));
    }
}
