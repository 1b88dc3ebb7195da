//! Combatant stat templates.
//!
//! Every combatant is spawned from a named template: movement speed,
//! handling, starting lives and discs, and the experience it is worth
//! when derezzed. Templates can be overridden from RON data; any name
//! missing from the loaded table falls back to the builtin entry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::arena::ColorTag;
use crate::error::{GameError, Result};
use crate::math::{fixed_serde, Fixed};

/// Stat block for one combatant template.
///
/// # Example RON
///
/// ```ron
/// StatTemplate(
///     name: "hunter",
///     color: ColorTag(3),
///     speed: 8589934592,  // Fixed-point for 2.0
///     handling: 3,
///     lives: 2,
///     discs: 2,
///     xp: 500,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatTemplate {
    /// Template name; the lookup key.
    pub name: String,

    /// Display color for the combatant and its trails.
    #[serde(default)]
    pub color: ColorTag,

    /// Cells advanced per four ticks (fixed-point).
    ///
    /// Speed 1 steps every fourth tick; speed 4 steps every tick.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,

    /// Turn responsiveness, 1 (sluggish) to 4 (instant).
    pub handling: u32,

    /// Starting lives.
    pub lives: u32,

    /// Identity discs carried.
    pub discs: u32,

    /// Experience awarded to whoever derezzes this combatant.
    #[serde(default)]
    pub xp: u32,
}

impl StatTemplate {
    fn validate(&self) -> Result<()> {
        if self.speed < Fixed::from_num(1) {
            return Err(GameError::InvalidConfiguration(format!(
                "template '{}': speed must be at least 1",
                self.name
            )));
        }
        if self.lives == 0 {
            return Err(GameError::InvalidConfiguration(format!(
                "template '{}': lives must be at least 1",
                self.name
            )));
        }
        if self.handling == 0 || self.handling > 4 {
            return Err(GameError::InvalidConfiguration(format!(
                "template '{}': handling must be 1..=4, got {}",
                self.name, self.handling
            )));
        }
        Ok(())
    }
}

/// Named stat templates, with builtin fallbacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatTable {
    templates: HashMap<String, StatTemplate>,
}

impl StatTable {
    /// The builtin template set: the player plus the four enemy
    /// archetypes at canonical values.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::default();
        for template in builtin_templates() {
            table.templates.insert(template.name.clone(), template);
        }
        table
    }

    /// Parse a template list from RON text, layered over the builtins.
    ///
    /// `origin` names the source in error messages (typically a file
    /// path). Loaded templates replace builtins of the same name.
    ///
    /// # Errors
    ///
    /// [`GameError::DataParseError`] on malformed RON,
    /// [`GameError::InvalidConfiguration`] on out-of-range stat values.
    pub fn from_ron(origin: &str, text: &str) -> Result<Self> {
        let loaded: Vec<StatTemplate> =
            ron::from_str(text).map_err(|e| GameError::DataParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?;

        let mut table = Self::builtin();
        for template in loaded {
            template.validate()?;
            table.templates.insert(template.name.clone(), template);
        }
        Ok(table)
    }

    /// Look up a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StatTemplate> {
        self.templates.get(name)
    }

    /// The player's template.
    ///
    /// Always present: the builtin layer guarantees it.
    #[must_use]
    pub fn player(&self) -> &StatTemplate {
        self.templates
            .get("player")
            .unwrap_or_else(|| unreachable!("builtin layer always carries a player template"))
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True when no templates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn builtin_templates() -> Vec<StatTemplate> {
    vec![
        StatTemplate {
            name: "player".to_string(),
            color: ColorTag::BLUE,
            speed: Fixed::from_num(2),
            handling: 2,
            lives: 3,
            discs: 3,
            xp: 0,
        },
        StatTemplate {
            name: "erratic".to_string(),
            color: ColorTag::GREEN,
            speed: Fixed::from_num(1),
            handling: 1,
            lives: 2,
            discs: 2,
            xp: 10,
        },
        StatTemplate {
            name: "predictive".to_string(),
            color: ColorTag::YELLOW,
            speed: Fixed::from_num(1),
            handling: 2,
            lives: 2,
            discs: 2,
            xp: 100,
        },
        StatTemplate {
            name: "hunter".to_string(),
            color: ColorTag::RED,
            speed: Fixed::from_num(2),
            handling: 3,
            lives: 2,
            discs: 2,
            xp: 500,
        },
        StatTemplate {
            name: "adaptive".to_string(),
            color: ColorTag::GOLD,
            speed: Fixed::from_num(2),
            handling: 4,
            lives: 3,
            discs: 3,
            xp: 1000,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_player_and_archetypes() {
        let table = StatTable::builtin();
        for name in ["player", "erratic", "predictive", "hunter", "adaptive"] {
            assert!(table.get(name).is_some(), "missing builtin '{name}'");
        }
        assert_eq!(table.player().lives, 3);
        assert_eq!(table.player().discs, 3);
    }

    #[test]
    fn test_ron_overrides_builtin_entry() {
        let text = r#"[
            StatTemplate(
                name: "hunter",
                color: ColorTag(3),
                speed: 12884901888,
                handling: 3,
                lives: 4,
                discs: 2,
                xp: 750,
            ),
        ]"#;
        let table = StatTable::from_ron("inline", text).unwrap();
        let hunter = table.get("hunter").unwrap();
        assert_eq!(hunter.lives, 4);
        assert_eq!(hunter.xp, 750);
        assert_eq!(hunter.speed, Fixed::from_num(3));
        // Untouched builtins survive the overlay
        assert_eq!(table.get("erratic").unwrap().xp, 10);
    }

    #[test]
    fn test_malformed_ron_reports_origin() {
        let err = StatTable::from_ron("stats/combatants.ron", "not ron at all").unwrap_err();
        match err {
            GameError::DataParseError { path, .. } => {
                assert_eq!(path, "stats/combatants.ron");
            }
            other => panic!("expected DataParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_lives_rejected() {
        let text = r#"[
            StatTemplate(
                name: "ghost",
                color: ColorTag(1),
                speed: 4294967296,
                handling: 1,
                lives: 0,
                discs: 1,
                xp: 5,
            ),
        ]"#;
        assert!(matches!(
            StatTable::from_ron("inline", text),
            Err(GameError::InvalidConfiguration(_))
        ));
    }
}
