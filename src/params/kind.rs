use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The effects this crate can run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EffectKind {
    #[default]
    Delay,
    Chorus,
    Phaser,
    Filter,
    Glitch,
}

impl EffectKind {
    pub const ALL: [EffectKind; 5] = [
        EffectKind::Delay,
        EffectKind::Chorus,
        EffectKind::Phaser,
        EffectKind::Filter,
        EffectKind::Glitch,
    ];

    /// Stable lowercase identifier, also accepted by `FromStr`.
    pub fn id(self) -> &'static str {
        match self {
            EffectKind::Delay => "delay",
            EffectKind::Chorus => "chorus",
            EffectKind::Phaser => "phaser",
            EffectKind::Filter => "filter",
            EffectKind::Glitch => "glitch",
        }
    }

    /// Position in [`EffectKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn parameter_count(self) -> usize {
        super::EffectParameters::defaults(self).count()
    }

    pub fn parameter_name(self, index: usize) -> &'static str {
        super::EffectParameters::defaults(self).name(index)
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEffectKindError {
    input: String,
}

impl ParseEffectKindError {
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseEffectKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown effect `{}`, expected one of: ", self.input)?;
        for (i, kind) in EffectKind::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(kind.id())?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseEffectKindError {}

impl FromStr for EffectKind {
    type Err = ParseEffectKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EffectKind::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseEffectKindError {
                input: s.to_string(),
            })
    }
}
