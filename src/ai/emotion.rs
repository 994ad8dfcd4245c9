//! Emotion catalog: the fixed set of emotion tokens a reply may end with,
//! and the portrait asset each one selects.
//!
//! The mapping lives in a single table ([`CATALOG`]) so adding or removing an
//! emotion is a one-row change and totality can be checked by enumeration.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ── Labels ─────────────────────────────────────────────────

/// One of the twelve emotion tokens the character can express.
///
/// Variant order matches [`CATALOG`] row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmotionLabel {
    Smile,
    EyesClosed,
    Glare,
    SoftSmile,
    Anger,
    Crying,
    Surprise,
    Affection,
    Impatience,
    Dejection,
    Confusion,
    Blush,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 12] = [
        EmotionLabel::Smile,
        EmotionLabel::EyesClosed,
        EmotionLabel::Glare,
        EmotionLabel::SoftSmile,
        EmotionLabel::Anger,
        EmotionLabel::Crying,
        EmotionLabel::Surprise,
        EmotionLabel::Affection,
        EmotionLabel::Impatience,
        EmotionLabel::Dejection,
        EmotionLabel::Confusion,
        EmotionLabel::Blush,
    ];

    fn entry(self) -> &'static CatalogEntry {
        &CATALOG[self as usize]
    }

    /// The exact token the chat model must emit on the last line.
    pub fn token(self) -> &'static str {
        self.entry().token
    }

    /// Portrait asset shown for this emotion.
    pub fn asset(self) -> AssetId {
        AssetId(self.entry().asset)
    }

    /// Exact, case-sensitive lookup. No trimming, no substring matching.
    pub fn from_token(token: &str) -> Option<Self> {
        CATALOG
            .iter()
            .find(|entry| entry.token == token)
            .map(|entry| entry.label)
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for EmotionLabel {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}

impl Serialize for EmotionLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

// ── Asset Ids ──────────────────────────────────────────────

/// Four-digit identifier of a static portrait image (`"0000"`..`"0011"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(&'static str);

impl AssetId {
    /// Portrait shown before the first reply arrives.
    pub const DEFAULT: AssetId = AssetId("0000");

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Path of the portrait image relative to the front-end root.
    pub fn image_path(&self) -> String {
        format!("image/{}.png", self.0)
    }

    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 4 && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for AssetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

// ── Catalog ────────────────────────────────────────────────

#[derive(Debug)]
pub struct CatalogEntry {
    pub label: EmotionLabel,
    pub token: &'static str,
    pub asset: &'static str,
}

/// The emotion → portrait table. Row `i` describes `EmotionLabel::ALL[i]`.
pub static CATALOG: [CatalogEntry; 12] = [
    CatalogEntry {
        label: EmotionLabel::Smile,
        token: "笑顔",
        asset: "0000",
    },
    CatalogEntry {
        label: EmotionLabel::EyesClosed,
        token: "目閉じ",
        asset: "0001",
    },
    CatalogEntry {
        label: EmotionLabel::Glare,
        token: "ジト目",
        asset: "0002",
    },
    CatalogEntry {
        label: EmotionLabel::SoftSmile,
        token: "微笑み",
        asset: "0003",
    },
    CatalogEntry {
        label: EmotionLabel::Anger,
        token: "怒り",
        asset: "0004",
    },
    CatalogEntry {
        label: EmotionLabel::Crying,
        token: "泣き",
        asset: "0005",
    },
    CatalogEntry {
        label: EmotionLabel::Surprise,
        token: "驚き",
        asset: "0006",
    },
    CatalogEntry {
        label: EmotionLabel::Affection,
        token: "愛情",
        asset: "0007",
    },
    CatalogEntry {
        label: EmotionLabel::Impatience,
        token: "焦り",
        asset: "0008",
    },
    CatalogEntry {
        label: EmotionLabel::Dejection,
        token: "落ち込み",
        asset: "0009",
    },
    CatalogEntry {
        label: EmotionLabel::Confusion,
        token: "困惑",
        asset: "0010",
    },
    CatalogEntry {
        label: EmotionLabel::Blush,
        token: "赤面",
        asset: "0011",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown emotion token: {0:?}")]
pub struct UnknownEmotion(pub String);

/// Resolve an emotion token to its portrait asset.
pub fn resolve(token: &str) -> Result<AssetId, UnknownEmotion> {
    token.parse::<EmotionLabel>().map(EmotionLabel::asset)
}

/// All tokens in catalog order, for prompts and diagnostics.
pub fn tokens() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|entry| entry.token)
}
