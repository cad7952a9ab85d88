use std::str::FromStr;

use crate::error::VariantError;

/// Visual treatment of the counter button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Variant {
    #[default]
    Solid,
    Outline,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Solid => "solid",
            Variant::Outline => "outline",
        }
    }

    pub fn class_token(self) -> &'static str {
        match self {
            Variant::Solid => "btn-solid",
            Variant::Outline => "btn-outline",
        }
    }

    /// Binary match: `"solid"` is filled, every other value (including
    /// typos and the empty string) falls into the outline branch.
    pub fn classify(value: &str) -> Variant {
        if value == "solid" {
            Variant::Solid
        } else {
            Variant::Outline
        }
    }
}

impl FromStr for Variant {
    type Err = VariantError;

    /// Strict parse: only the two known names are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Variant::Solid),
            "outline" => Ok(Variant::Outline),
            other => Err(VariantError::Unknown(other.to_string())),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the `type` property treats values it does not recognize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum VariantMode {
    /// Unknown values render as outline.
    #[default]
    Permissive,
    /// Unknown values are rejected and the property keeps its old value.
    Strict,
}

impl VariantMode {
    pub fn check(self, value: &str) -> Result<Variant, VariantError> {
        match self {
            VariantMode::Permissive => Ok(Variant::classify(value)),
            VariantMode::Strict => value.parse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_binary() {
        assert_eq!(Variant::classify("solid"), Variant::Solid);
        assert_eq!(Variant::classify("outline"), Variant::Outline);
        for odd in ["", "Solid", "SOLID", " solid", "dashed", "ghost"] {
            assert_eq!(Variant::classify(odd), Variant::Outline, "{odd:?}");
        }
    }

    #[test]
    fn test_class_tokens() {
        assert_eq!(Variant::Solid.class_token(), "btn-solid");
        assert_eq!(Variant::Outline.class_token(), "btn-outline");
        assert_eq!(Variant::default(), Variant::Solid);
    }

    #[test]
    fn test_strict_parse() {
        assert_eq!("solid".parse::<Variant>(), Ok(Variant::Solid));
        assert_eq!("outline".parse::<Variant>(), Ok(Variant::Outline));
        assert_eq!(
            "dashed".parse::<Variant>(),
            Err(VariantError::Unknown("dashed".into()))
        );
    }

    #[test]
    fn test_modes() {
        assert_eq!(VariantMode::Permissive.check("dashed"), Ok(Variant::Outline));
        assert!(VariantMode::Strict.check("dashed").is_err());
        assert_eq!(VariantMode::Strict.check("outline"), Ok(Variant::Outline));
    }
}
