use serde::{Deserialize, Serialize};

/// Glyph shown next to a category. Unknown identifiers fall back to `Gamepad`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CategoryIcon {
    Wrench,
    Chart,
    Users,
    Camera,
    Palette,
    #[default]
    #[serde(other)]
    Gamepad,
}

impl CategoryIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryIcon::Gamepad => "gamepad",
            CategoryIcon::Wrench => "wrench",
            CategoryIcon::Chart => "chart",
            CategoryIcon::Users => "users",
            CategoryIcon::Camera => "camera",
            CategoryIcon::Palette => "palette",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub icon: CategoryIcon,
    #[serde(default)]
    pub apps_count: u64,
}
