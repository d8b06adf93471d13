//! Flag catalogue entries
//!
//! `flags.json` is an array of entries, each with the country's localised
//! names and the flag's rectangle in the shared sprite sheet.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{OPTION_COUNT, QuizError};

/// Language used when a name is missing for the requested one
pub const FALLBACK_LANG: &str = "en";

/// Largest display size of a flag shown as an answer option
pub const OPTION_FLAG_MAX: (f32, f32) = (150.0, 100.0);
/// Largest display size of the flag being asked about
pub const QUESTION_FLAG_MAX: (f32, f32) = (200.0, 150.0);
/// Smallest displayed flag edge (px)
pub const MIN_FLAG_EDGE: f32 = 10.0;

/// Pixel rectangle in the sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl SpriteRect {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Display size that keeps the aspect ratio within `max_w` x `max_h`,
    /// rounded to whole pixels and never below [`MIN_FLAG_EDGE`]
    pub fn fit_within(&self, max_w: f32, max_h: f32) -> (f32, f32) {
        let (w, h) = (self.width() as f32, self.height() as f32);
        let (mut draw_w, mut draw_h) = (max_w, max_h);
        // Zero height gives an infinite ratio and collapses to the minimum
        // edge; an empty rect gives NaN and keeps the full box
        let ratio = w / h;
        if draw_w / draw_h > ratio {
            draw_w = (draw_h * ratio).round();
        } else if ratio > 0.0 {
            draw_h = (draw_w / ratio).round();
        }
        (draw_w.max(MIN_FLAG_EDGE), draw_h.max(MIN_FLAG_EDGE))
    }
}

/// One country in the catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagEntry {
    /// Country name by language code
    pub name: HashMap<String, String>,
    /// Flag location in the sprite sheet
    pub img: SpriteRect,
}

impl FlagEntry {
    /// Name in `lang`, falling back to English, then to any name at all
    pub fn name_in(&self, lang: &str) -> &str {
        self.name
            .get(lang)
            .or_else(|| self.name.get(FALLBACK_LANG))
            .or_else(|| self.name.values().next())
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Parse the catalogue, rejecting ones too small to build a question from
pub fn parse_flags(json: &str) -> Result<Vec<FlagEntry>, QuizError> {
    let flags: Vec<FlagEntry> = serde_json::from_str(json)?;
    if flags.len() < OPTION_COUNT {
        return Err(QuizError::NotEnoughFlags(flags.len()));
    }
    log::info!("Loaded {} flags", flags.len());
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"img": {"top": 0, "bottom": 40, "left": 0, "right": 60},
         "name": {"en": "France", "ru": "Франция", "fr": "France"}},
        {"img": {"top": 40, "bottom": 80, "left": 0, "right": 80},
         "name": {"en": "Germany", "ru": "Германия"}},
        {"img": {"top": 80, "bottom": 180, "left": 0, "right": 100},
         "name": {"en": "Switzerland"}},
        {"img": {"top": 180, "bottom": 220, "left": 0, "right": 60},
         "name": {"en": "Italy", "es": "Italia"}}
    ]"#;

    #[test]
    fn test_parse_sample() {
        let flags = parse_flags(SAMPLE).unwrap();
        assert_eq!(flags.len(), 4);
        assert_eq!(flags[1].img.width(), 80);
        assert_eq!(flags[1].img.height(), 40);
    }

    #[test]
    fn test_name_fallback() {
        let flags = parse_flags(SAMPLE).unwrap();
        assert_eq!(flags[0].name_in("ru"), "Франция");
        assert_eq!(flags[1].name_in("fr"), "Germany");
        assert_eq!(flags[3].name_in("es"), "Italia");
    }

    #[test]
    fn test_too_few_flags() {
        let err = parse_flags(r#"[{"img":{"top":0,"bottom":1,"left":0,"right":1},"name":{}}]"#)
            .unwrap_err();
        assert!(matches!(err, QuizError::NotEnoughFlags(1)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(parse_flags("{"), Err(QuizError::Parse(_))));
    }

    #[test]
    fn test_fit_within_keeps_aspect() {
        let wide = SpriteRect {
            left: 0,
            top: 0,
            right: 60,
            bottom: 40,
        };
        assert_eq!(wide.fit_within(150.0, 100.0), (150.0, 100.0));
        assert_eq!(wide.fit_within(200.0, 150.0), (200.0, 133.0));

        let square = SpriteRect {
            left: 0,
            top: 0,
            right: 100,
            bottom: 100,
        };
        assert_eq!(square.fit_within(150.0, 100.0), (100.0, 100.0));
    }

    #[test]
    fn test_fit_within_minimum_edge() {
        let sliver = SpriteRect {
            left: 0,
            top: 0,
            right: 1000,
            bottom: 5,
        };
        assert_eq!(sliver.fit_within(150.0, 100.0), (150.0, 10.0));
    }

    #[test]
    fn test_fit_within_degenerate_rects() {
        let flat = SpriteRect {
            left: 0,
            top: 0,
            right: 60,
            bottom: 0,
        };
        assert_eq!(flat.fit_within(150.0, 100.0), (150.0, 10.0));

        let thin = SpriteRect {
            left: 0,
            top: 0,
            right: 0,
            bottom: 40,
        };
        assert_eq!(thin.fit_within(150.0, 100.0), (10.0, 100.0));

        let empty = SpriteRect {
            left: 5,
            top: 5,
            right: 5,
            bottom: 5,
        };
        assert_eq!(empty.fit_within(150.0, 100.0), (150.0, 100.0));
    }
}
