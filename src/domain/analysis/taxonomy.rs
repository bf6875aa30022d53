//! Closed enumerations for scene types, design styles and materials
//!
//! These replace free-form string tables: every lookup is an exhaustive
//! match, and unknown labels coming back from a provider are coerced to
//! the documented default category instead of leaking arbitrary strings.

use serde::{Deserialize, Serialize};

/// Room or scene category a product is staged in.
///
/// Declaration order is significant: the keyword scorer keeps the first
/// variant on ties, so `LivingRoom` doubles as the default category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneType {
    #[serde(rename = "Living Room")]
    LivingRoom,
    #[serde(rename = "Bedroom")]
    Bedroom,
    #[serde(rename = "Dining Room")]
    DiningRoom,
    #[serde(rename = "Kitchen")]
    Kitchen,
    #[serde(rename = "Office")]
    Office,
    #[serde(rename = "Bathroom")]
    Bathroom,
    #[serde(rename = "Outdoor")]
    Outdoor,
    #[serde(rename = "Kids Room")]
    KidsRoom,
}

impl SceneType {
    pub const ALL: [SceneType; 8] = [
        SceneType::LivingRoom,
        SceneType::Bedroom,
        SceneType::DiningRoom,
        SceneType::Kitchen,
        SceneType::Office,
        SceneType::Bathroom,
        SceneType::Outdoor,
        SceneType::KidsRoom,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SceneType::LivingRoom => "Living Room",
            SceneType::Bedroom => "Bedroom",
            SceneType::DiningRoom => "Dining Room",
            SceneType::Kitchen => "Kitchen",
            SceneType::Office => "Office",
            SceneType::Bathroom => "Bathroom",
            SceneType::Outdoor => "Outdoor",
            SceneType::KidsRoom => "Kids Room",
        }
    }

    /// Keywords matched against the lowercased product text.
    ///
    /// Multi-word phrases are allowed; matching is plain substring
    /// containment, so "coffee table" does not give "table" to every
    /// living-room product.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            SceneType::LivingRoom => &[
                "sofa",
                "couch",
                "coffee table",
                "sectional",
                "loveseat",
                "armchair",
                "ottoman",
                "tv stand",
                "media console",
                "recliner",
            ],
            SceneType::Bedroom => &[
                "bed",
                "mattress",
                "nightstand",
                "wardrobe",
                "dresser",
                "headboard",
                "duvet",
                "bedside",
            ],
            SceneType::DiningRoom => &[
                "dining",
                "table",
                "sideboard",
                "buffet",
                "tableware",
                "placemat",
                "seats",
            ],
            SceneType::Kitchen => &[
                "kitchen",
                "bar stool",
                "counter",
                "pantry",
                "cookware",
                "island",
            ],
            SceneType::Office => &[
                "desk",
                "office",
                "bookshelf",
                "bookcase",
                "workstation",
                "ergonomic",
                "filing",
            ],
            SceneType::Bathroom => &[
                "bathroom", "vanity", "bathtub", "shower", "towel", "basin",
            ],
            SceneType::Outdoor => &[
                "outdoor", "patio", "garden", "balcony", "terrace", "deck", "lounger", "parasol",
            ],
            SceneType::KidsRoom => &["kids", "crib", "nursery", "bunk", "toy", "children"],
        }
    }

    /// Complementary scene suggested alongside the primary one.
    pub fn complement(&self) -> SceneType {
        match self {
            SceneType::LivingRoom => SceneType::Office,
            SceneType::Bedroom => SceneType::LivingRoom,
            SceneType::DiningRoom => SceneType::Kitchen,
            SceneType::Kitchen => SceneType::DiningRoom,
            SceneType::Office => SceneType::LivingRoom,
            SceneType::Bathroom => SceneType::Bedroom,
            SceneType::Outdoor => SceneType::LivingRoom,
            SceneType::KidsRoom => SceneType::Bedroom,
        }
    }

    /// Fuzzy lookup for labels coming back from a provider.
    pub fn from_label(label: &str) -> Option<SceneType> {
        let needle = normalize_label(label);
        Self::ALL
            .into_iter()
            .find(|scene| normalize_label(scene.label()) == needle)
    }
}

impl std::fmt::Display for SceneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Design style vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Style {
    #[serde(rename = "Modern")]
    Modern,
    #[serde(rename = "Scandinavian")]
    Scandinavian,
    #[serde(rename = "Industrial")]
    Industrial,
    #[serde(rename = "Mid-Century")]
    MidCentury,
    #[serde(rename = "Rustic")]
    Rustic,
    #[serde(rename = "Traditional")]
    Traditional,
    #[serde(rename = "Minimalist")]
    Minimalist,
    #[serde(rename = "Bohemian")]
    Bohemian,
    #[serde(rename = "Coastal")]
    Coastal,
}

impl Style {
    pub const ALL: [Style; 9] = [
        Style::Modern,
        Style::Scandinavian,
        Style::Industrial,
        Style::MidCentury,
        Style::Rustic,
        Style::Traditional,
        Style::Minimalist,
        Style::Bohemian,
        Style::Coastal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Style::Modern => "Modern",
            Style::Scandinavian => "Scandinavian",
            Style::Industrial => "Industrial",
            Style::MidCentury => "Mid-Century",
            Style::Rustic => "Rustic",
            Style::Traditional => "Traditional",
            Style::Minimalist => "Minimalist",
            Style::Bohemian => "Bohemian",
            Style::Coastal => "Coastal",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Style::Modern => &["modern", "sleek", "contemporary"],
            Style::Scandinavian => &["scandinavian", "scandi", "nordic", "hygge"],
            Style::Industrial => &["industrial", "loft", "factory"],
            Style::MidCentury => &["mid-century", "midcentury", "retro", "eames"],
            Style::Rustic => &["rustic", "farmhouse", "reclaimed", "distressed", "barn"],
            Style::Traditional => &["traditional", "classic", "victorian", "ornate", "antique"],
            Style::Minimalist => &["minimalist", "minimal", "understated"],
            Style::Bohemian => &["bohemian", "boho", "eclectic", "macrame"],
            Style::Coastal => &["coastal", "beach", "nautical", "seaside"],
        }
    }

    pub fn from_label(label: &str) -> Option<Style> {
        let needle = normalize_label(label);
        Self::ALL
            .into_iter()
            .find(|style| normalize_label(style.label()) == needle)
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Material vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    #[serde(rename = "Wood")]
    Wood,
    #[serde(rename = "Metal")]
    Metal,
    #[serde(rename = "Glass")]
    Glass,
    #[serde(rename = "Fabric")]
    Fabric,
    #[serde(rename = "Leather")]
    Leather,
    #[serde(rename = "Marble")]
    Marble,
    #[serde(rename = "Rattan")]
    Rattan,
    #[serde(rename = "Plastic")]
    Plastic,
    #[serde(rename = "Ceramic")]
    Ceramic,
}

impl Material {
    pub const ALL: [Material; 9] = [
        Material::Wood,
        Material::Metal,
        Material::Glass,
        Material::Fabric,
        Material::Leather,
        Material::Marble,
        Material::Rattan,
        Material::Plastic,
        Material::Ceramic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Material::Wood => "Wood",
            Material::Metal => "Metal",
            Material::Glass => "Glass",
            Material::Fabric => "Fabric",
            Material::Leather => "Leather",
            Material::Marble => "Marble",
            Material::Rattan => "Rattan",
            Material::Plastic => "Plastic",
            Material::Ceramic => "Ceramic",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Material::Wood => &[
                "wood", "oak", "walnut", "pine", "teak", "birch", "mahogany", "timber", "ash",
            ],
            Material::Metal => &["metal", "steel", "iron", "aluminum", "brass", "chrome"],
            Material::Glass => &["glass", "tempered"],
            Material::Fabric => &[
                "fabric", "linen", "cotton", "velvet", "upholster", "wool", "textile", "boucle",
            ],
            Material::Leather => &["leather", "suede"],
            Material::Marble => &["marble", "granite", "travertine"],
            Material::Rattan => &["rattan", "wicker", "bamboo", "cane"],
            Material::Plastic => &["plastic", "acrylic", "polypropylene"],
            Material::Ceramic => &["ceramic", "porcelain", "terracotta"],
        }
    }

    pub fn from_label(label: &str) -> Option<Material> {
        let needle = normalize_label(label);
        Self::ALL
            .into_iter()
            .find(|material| normalize_label(material.label()) == needle)
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_type_labels_round_trip() {
        for scene in SceneType::ALL {
            assert_eq!(SceneType::from_label(scene.label()), Some(scene));
        }
    }

    #[test]
    fn test_scene_type_from_label_is_forgiving() {
        assert_eq!(SceneType::from_label("living room"), Some(SceneType::LivingRoom));
        assert_eq!(SceneType::from_label("LIVING-ROOM"), Some(SceneType::LivingRoom));
        assert_eq!(SceneType::from_label("diningroom"), Some(SceneType::DiningRoom));
        assert_eq!(SceneType::from_label("spaceship"), None);
    }

    #[test]
    fn test_style_from_label_handles_hyphenation() {
        assert_eq!(Style::from_label("mid century"), Some(Style::MidCentury));
        assert_eq!(Style::from_label("Mid-Century"), Some(Style::MidCentury));
    }

    #[test]
    fn test_complement_differs_from_primary() {
        for scene in SceneType::ALL {
            assert_ne!(scene.complement(), scene);
        }
    }

    #[test]
    fn test_serde_uses_human_labels() {
        let json = serde_json::to_string(&SceneType::DiningRoom).unwrap();
        assert_eq!(json, "\"Dining Room\"");

        let back: SceneType = serde_json::from_str("\"Dining Room\"").unwrap();
        assert_eq!(back, SceneType::DiningRoom);
    }
}
