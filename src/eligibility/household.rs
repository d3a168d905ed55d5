use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::clock::parse_optional_date;
use super::permit::PermitKind;
use crate::roles::{canonicalize_role, CanonicalRole};

/// A person living with the applicant, as submitted by the intake form.
///
/// Free-text fields are resolved once here: the role label becomes a
/// `CanonicalRole`, the permit label a `PermitKind`, and dates that do not
/// parse are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdMember {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: CanonicalRole,
    #[serde(default, deserialize_with = "lenient_date")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub residence_permit: PermitKind,
    #[serde(default, deserialize_with = "lenient_date")]
    pub permit_expiry_date: Option<NaiveDate>,
}

/// The applicant's household as a whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    #[serde(alias = "usagerId")]
    pub applicant_id: String,
    #[serde(default)]
    pub members: Vec<HouseholdMember>,
}

impl HouseholdMember {
    pub fn new(role_label: &str) -> Self {
        Self {
            role: canonicalize_role(Some(role_label)),
            ..Default::default()
        }
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    pub fn with_permit(mut self, nationality: &str, permit: PermitKind, expiry: Option<NaiveDate>) -> Self {
        self.nationality = Some(nationality.to_string());
        self.residence_permit = permit;
        self.permit_expiry_date = expiry;
        self
    }

    /// "First Last", or whichever part is known.
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(parse_optional_date(raw.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM_PAYLOAD: &str = r#"{
        "usagerId": "U-1042",
        "members": [
            { "firstName": "Amina", "role": "Conjointe", "birthDate": "1988-03-02",
              "nationality": "Suisse", "residencePermit": "Citoyen" },
            { "firstName": "Yanis", "role": "Enfant", "birthDate": "2015-09-21" },
            { "firstName": "Lina", "role": "Enfant – garde alternée", "birthDate": "2017-01-05" },
            { "firstName": "Noah", "role": "enfant (DV)", "birthDate": "pas connue" },
            { "role": "Grand-mère", "residencePermit": "Permis B", "permitExpiryDate": "2026-12-31" }
        ]
    }"#;

    #[test]
    fn test_deserialize_form_payload() {
        let household: Household = serde_json::from_str(FORM_PAYLOAD).unwrap();

        assert_eq!(household.applicant_id, "U-1042");
        let roles: Vec<CanonicalRole> = household.members.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                CanonicalRole::Conjoint,
                CanonicalRole::Enfant,
                CanonicalRole::EnfantGardeAlternee,
                CanonicalRole::EnfantDroitDeVisite,
                CanonicalRole::Autre,
            ]
        );
        assert_eq!(household.members[3].birth_date, None);
        assert_eq!(household.members[4].residence_permit, PermitKind::PermisB);
        assert_eq!(
            household.members[4].permit_expiry_date,
            NaiveDate::from_ymd_opt(2026, 12, 31)
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let member: HouseholdMember = serde_json::from_str("{}").unwrap();
        assert_eq!(member.role, CanonicalRole::Autre);
        assert_eq!(member.residence_permit, PermitKind::SansPermis);
        assert_eq!(member.birth_date, None);
    }

    #[test]
    fn test_serialized_member_uses_canonical_values() {
        let member = HouseholdMember::new("Enfant en garde alternée")
            .with_birth_date(NaiveDate::from_ymd_opt(2016, 4, 1).unwrap());
        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["role"], "enfant_garde_alternee");
        assert_eq!(json["birthDate"], "2016-04-01");
        assert_eq!(json["residencePermit"], "Sans permis");
    }

    #[test]
    fn test_display_name() {
        let mut member = HouseholdMember::new("enfant");
        assert_eq!(member.display_name(), None);
        member.first_name = Some("Lina".to_string());
        member.last_name = Some(" ".to_string());
        assert_eq!(member.display_name(), Some("Lina".to_string()));
        member.last_name = Some("Morel".to_string());
        assert_eq!(member.display_name(), Some("Lina Morel".to_string()));
    }
}
