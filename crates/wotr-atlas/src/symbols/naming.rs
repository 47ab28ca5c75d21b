//! Template filename convention: lowercase, underscore separated `.png` files.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingViolation {
    NotPng,
    EmptyStem,
    InvalidCharacter(char),
    EdgeUnderscore,
}

impl std::fmt::Display for NamingViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPng => write!(f, "template must use the .png extension"),
            Self::EmptyStem => write!(f, "template name is empty"),
            Self::InvalidCharacter(c) => {
                write!(f, "invalid character {c:?}; use lowercase letters, digits and '_'")
            }
            Self::EdgeUnderscore => write!(f, "template name must not start or end with '_'"),
        }
    }
}

/// Check a template filename such as `swords.png` or `dark_tower.png`.
pub fn check_template_name(filename: &str) -> Result<(), NamingViolation> {
    let stem = filename
        .strip_suffix(".png")
        .ok_or(NamingViolation::NotPng)?;

    if stem.is_empty() {
        return Err(NamingViolation::EmptyStem);
    }

    if let Some(c) = stem
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_'))
    {
        return Err(NamingViolation::InvalidCharacter(c));
    }

    if stem.starts_with('_') || stem.ends_with('_') {
        return Err(NamingViolation::EdgeUnderscore);
    }

    Ok(())
}
