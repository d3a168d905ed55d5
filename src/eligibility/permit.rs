use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::clock::parse_optional_date;

/// Residence permit held by a household member.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PermitKind {
    Citoyen,
    PermisC,
    PermisB,
    PermisF,
    PermisS,
    PermisL,
    PermisG,
    #[default]
    SansPermis,
    /// Any label outside the known set, kept verbatim.
    Other(String),
}

impl PermitKind {
    /// Read a permit label. Labels must match exactly, surrounding
    /// whitespace aside; an empty or missing label is `SansPermis`.
    pub fn parse(raw: Option<&str>) -> Self {
        let label = raw.unwrap_or_default().trim();
        match label {
            "" | "Sans permis" => PermitKind::SansPermis,
            "Citoyen" => PermitKind::Citoyen,
            "Permis C" => PermitKind::PermisC,
            "Permis B" => PermitKind::PermisB,
            "Permis F" => PermitKind::PermisF,
            "Permis S" => PermitKind::PermisS,
            "Permis L" => PermitKind::PermisL,
            "Permis G" => PermitKind::PermisG,
            other => PermitKind::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PermitKind::Citoyen => "Citoyen",
            PermitKind::PermisC => "Permis C",
            PermitKind::PermisB => "Permis B",
            PermitKind::PermisF => "Permis F",
            PermitKind::PermisS => "Permis S",
            PermitKind::PermisL => "Permis L",
            PermitKind::PermisG => "Permis G",
            PermitKind::SansPermis => "Sans permis",
            PermitKind::Other(label) => label,
        }
    }

    /// Permits that are only valid until their expiry date.
    pub fn requires_expiry(&self) -> bool {
        matches!(self, PermitKind::PermisB | PermitKind::PermisF)
    }
}

/// Outcome of the residence-permit rules, with the reason behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PermitStatus {
    SwissNational,
    Citizen,
    Settled,
    ValidUntil { expiry: NaiveDate },
    Expired { expiry: NaiveDate },
    MissingExpiry,
    NotRecognised { permit: String },
}

impl PermitStatus {
    pub fn is_valid(&self) -> bool {
        matches!(
            self,
            PermitStatus::SwissNational
                | PermitStatus::Citizen
                | PermitStatus::Settled
                | PermitStatus::ValidUntil { .. }
        )
    }

    pub fn describe(&self) -> String {
        match self {
            PermitStatus::SwissNational => "Swiss national".to_string(),
            PermitStatus::Citizen => "Citizen".to_string(),
            PermitStatus::Settled => "Permis C (settled)".to_string(),
            PermitStatus::ValidUntil { expiry } => format!("valid until {}", expiry),
            PermitStatus::Expired { expiry } => format!("expired on {}", expiry),
            PermitStatus::MissingExpiry => "expiry date missing".to_string(),
            PermitStatus::NotRecognised { permit } => format!("{} does not grant residence", permit),
        }
    }
}

/// Apply the residence-permit rules in order:
/// Swiss nationality, then Citoyen, then Permis C, then Permis B/F with an
/// expiry on or after `today`. Everything else is invalid.
pub fn permit_status(
    nationality: Option<&str>,
    permit: &PermitKind,
    expiry: Option<NaiveDate>,
    today: NaiveDate,
) -> PermitStatus {
    if is_swiss(nationality) {
        return PermitStatus::SwissNational;
    }

    match permit {
        PermitKind::Citoyen => PermitStatus::Citizen,
        PermitKind::PermisC => PermitStatus::Settled,
        kind if kind.requires_expiry() => match expiry {
            Some(expiry) if expiry >= today => PermitStatus::ValidUntil { expiry },
            Some(expiry) => PermitStatus::Expired { expiry },
            None => PermitStatus::MissingExpiry,
        },
        other => PermitStatus::NotRecognised {
            permit: other.label().to_string(),
        },
    }
}

/// Whether a member holds a valid right of residence on `today`.
///
/// Never fails: a missing or malformed expiry simply makes a B/F permit
/// invalid.
pub fn is_permit_valid(
    nationality: Option<&str>,
    permit: Option<&str>,
    expiry_date: Option<&str>,
    today: NaiveDate,
) -> bool {
    permit_status(
        nationality,
        &PermitKind::parse(permit),
        parse_optional_date(expiry_date),
        today,
    )
    .is_valid()
}

fn is_swiss(nationality: Option<&str>) -> bool {
    nationality
        .map(|n| n.trim().to_lowercase() == "suisse")
        .unwrap_or(false)
}

impl std::fmt::Display for PermitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for PermitKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for PermitKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(PermitKind::parse(raw.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_swiss_nationality_short_circuits() {
        let today = date(2025, 1, 1);
        assert!(is_permit_valid(Some("Suisse"), Some("Sans permis"), None, today));
        assert!(is_permit_valid(Some("  SUISSE "), None, None, today));
        assert!(is_permit_valid(Some("suisse"), Some("Permis B"), Some("2000-01-01"), today));
    }

    #[test]
    fn test_citizen_and_settled() {
        let today = date(2025, 1, 1);
        assert!(is_permit_valid(Some("France"), Some("Citoyen"), None, today));
        assert!(is_permit_valid(Some("France"), Some("Permis C"), None, today));
    }

    #[test]
    fn test_expiring_permits() {
        let today = date(2025, 1, 1);
        assert!(!is_permit_valid(Some("France"), Some("Permis B"), Some("2020-01-01"), today));
        assert!(is_permit_valid(Some("France"), Some("Permis B"), Some("2025-01-01"), today));
        assert!(is_permit_valid(Some("Érythrée"), Some("Permis F"), Some("2026-03-31"), today));
        assert!(!is_permit_valid(Some("Érythrée"), Some("Permis F"), Some("2024-12-31"), today));
    }

    #[test]
    fn test_expiring_permit_without_usable_expiry() {
        let today = date(2025, 1, 1);
        assert!(!is_permit_valid(Some("France"), Some("Permis B"), None, today));
        assert!(!is_permit_valid(Some("France"), Some("Permis F"), Some("bientôt"), today));
    }

    #[test]
    fn test_other_permits_are_invalid() {
        let today = date(2025, 1, 1);
        assert!(!is_permit_valid(Some("France"), Some("Permis S"), Some("2099-01-01"), today));
        assert!(!is_permit_valid(Some("France"), Some("Permis L"), Some("2099-01-01"), today));
        assert!(!is_permit_valid(Some("France"), Some("Permis G"), Some("2099-01-01"), today));
        assert!(!is_permit_valid(Some("France"), Some("Sans permis"), None, today));
        assert!(!is_permit_valid(Some("France"), Some(""), None, today));
        assert!(!is_permit_valid(None, None, None, today));
        assert!(!is_permit_valid(Some("France"), Some("Visa touristique"), Some("2099-01-01"), today));
    }

    #[test]
    fn test_parse_permit_labels() {
        assert_eq!(PermitKind::parse(Some("Permis B")), PermitKind::PermisB);
        assert_eq!(PermitKind::parse(Some("  Permis C ")), PermitKind::PermisC);
        assert_eq!(PermitKind::parse(None), PermitKind::SansPermis);
        assert_eq!(
            PermitKind::parse(Some("permis-c")),
            PermitKind::Other("permis-c".to_string())
        );
        assert_eq!(
            PermitKind::parse(Some(" Visa ")),
            PermitKind::Other("Visa".to_string())
        );
    }

    #[test]
    fn test_permit_labels_are_matched_exactly() {
        let today = date(2025, 1, 1);
        for label in ["citoyen", "CITOYEN", "permis c", "permis-c", "Pérmis C", "Permis   C", "Permis-B"] {
            assert!(
                !is_permit_valid(Some("France"), Some(label), Some("2099-01-01"), today),
                "{:?} should not be a valid permit",
                label
            );
        }
        assert!(is_permit_valid(Some("France"), Some(" Permis C "), None, today));
    }

    #[test]
    fn test_status_reasons() {
        let today = date(2025, 1, 1);
        assert_eq!(
            permit_status(Some("France"), &PermitKind::PermisB, Some(date(2024, 6, 30)), today),
            PermitStatus::Expired { expiry: date(2024, 6, 30) }
        );
        assert_eq!(
            permit_status(Some("France"), &PermitKind::PermisF, None, today),
            PermitStatus::MissingExpiry
        );
        assert_eq!(
            permit_status(None, &PermitKind::PermisS, None, today),
            PermitStatus::NotRecognised { permit: "Permis S".to_string() }
        );
    }

    #[test]
    fn test_serde_round_trip_label() {
        let kind: PermitKind = serde_json::from_str("\"Permis F\"").unwrap();
        assert_eq!(kind, PermitKind::PermisF);
        assert_eq!(serde_json::to_string(&PermitKind::SansPermis).unwrap(), "\"Sans permis\"");
    }
}
