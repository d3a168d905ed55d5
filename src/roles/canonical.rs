use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use tracing::debug;

use super::normalize::{has_token, normalize};

/// Relationship of a household member to the primary applicant.
///
/// Every label maps to exactly one variant; anything unrecognised is `Autre`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CanonicalRole {
    Conjoint,
    Enfant,
    EnfantGardeAlternee,
    EnfantDroitDeVisite,
    #[default]
    Autre,
}

/// Human-readable label shown next to a household member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayRole {
    Conjoint,
    EnfantACharge,
    EnfantGardeAlternee,
    EnfantDroitDeVisite,
    Autre,
}

impl CanonicalRole {
    pub const ALL: [CanonicalRole; 5] = [
        CanonicalRole::Conjoint,
        CanonicalRole::Enfant,
        CanonicalRole::EnfantGardeAlternee,
        CanonicalRole::EnfantDroitDeVisite,
        CanonicalRole::Autre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalRole::Conjoint => "conjoint",
            CanonicalRole::Enfant => "enfant",
            CanonicalRole::EnfantGardeAlternee => "enfant_garde_alternee",
            CanonicalRole::EnfantDroitDeVisite => "enfant_droit_de_visite",
            CanonicalRole::Autre => "autre",
        }
    }

    /// Exact match on a canonical identifier such as `enfant_garde_alternee`.
    pub fn from_identifier(s: &str) -> Option<CanonicalRole> {
        CanonicalRole::ALL.into_iter().find(|role| role.as_str() == s)
    }

    pub fn display(&self) -> DisplayRole {
        match self {
            CanonicalRole::Conjoint => DisplayRole::Conjoint,
            CanonicalRole::Enfant => DisplayRole::EnfantACharge,
            CanonicalRole::EnfantGardeAlternee => DisplayRole::EnfantGardeAlternee,
            CanonicalRole::EnfantDroitDeVisite => DisplayRole::EnfantDroitDeVisite,
            CanonicalRole::Autre => DisplayRole::Autre,
        }
    }

    /// Whether this member counts as a dependent child on the barème.
    ///
    /// A child seen only under visitation rights is never counted.
    pub fn is_counted_child(&self) -> bool {
        matches!(self, CanonicalRole::Enfant | CanonicalRole::EnfantGardeAlternee)
    }
}

impl DisplayRole {
    pub fn label(&self) -> &'static str {
        match self {
            DisplayRole::Conjoint => "Conjoint",
            DisplayRole::EnfantACharge => "Enfant à charge",
            DisplayRole::EnfantGardeAlternee => "Enfant – garde alternée",
            DisplayRole::EnfantDroitDeVisite => "Enfant – droit de visite",
            DisplayRole::Autre => "Autre",
        }
    }
}

/// Map a free-text role label onto the closed role set.
///
/// Canonical identifiers map to themselves. Other labels are checked in
/// order on their normalized form:
/// 1. starts with "conjoint"
/// 2. starts with "enfant" and mentions "droit" + "visite", or the token "dv"
/// 3. starts with "enfant" and mentions "garde alternee"
/// 4. starts with "enfant"
/// 5. anything else
///
/// Visitation rights must win over shared custody and over plain "enfant",
/// otherwise a visiting child would be counted as a dependent.
pub fn canonicalize_role(raw: Option<&str>) -> CanonicalRole {
    let r = normalize(raw);

    let role = if let Some(role) = CanonicalRole::from_identifier(&r) {
        role
    } else if r.starts_with("conjoint") {
        CanonicalRole::Conjoint
    } else if r.starts_with("enfant") {
        if (r.contains("droit") && r.contains("visite")) || has_token(&r, "dv") {
            CanonicalRole::EnfantDroitDeVisite
        } else if r.contains("garde alternee") {
            CanonicalRole::EnfantGardeAlternee
        } else {
            CanonicalRole::Enfant
        }
    } else {
        CanonicalRole::Autre
    };

    debug!("Role label {:?} canonicalized to {}", r, role);
    role
}

/// Display label for either a raw label or an already-canonical identifier.
pub fn to_display_role(canonical_or_raw: Option<&str>) -> DisplayRole {
    canonicalize_role(canonical_or_raw).display()
}

/// Whether a member counts toward the barème child column.
///
/// `raw_role` takes precedence when it carries text; otherwise `role` is used.
pub fn is_child_counted(role: &str, raw_role: Option<&str>) -> bool {
    let label = match raw_role {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => role,
    };
    canonicalize_role(Some(label)).is_counted_child()
}

impl std::fmt::Display for CanonicalRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for DisplayRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for CanonicalRole {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(canonicalize_role(Some(s)))
    }
}

impl Serialize for CanonicalRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CanonicalRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(canonicalize_role(raw.as_deref()))
    }
}

impl Serialize for DisplayRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
