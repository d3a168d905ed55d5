use serde::Serialize;
use tracing::{debug, info};

use super::{
    age::age_on,
    bareme::HouseholdSummary,
    clock::Clock,
    household::{Household, HouseholdMember},
    permit::{permit_status, PermitStatus},
};
use crate::roles::{CanonicalRole, DisplayRole};

/// Something a caseworker should look at before relying on the figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberWarning {
    UnrecognizedRole,
    InvalidPermit,
    MissingBirthDate,
}

impl std::fmt::Display for MemberWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberWarning::UnrecognizedRole => write!(f, "role not recognised"),
            MemberWarning::InvalidPermit => write!(f, "permit invalid"),
            MemberWarning::MissingBirthDate => write!(f, "birth date missing"),
        }
    }
}

/// Per-member view of the eligibility rules.
#[derive(Debug, Clone, Serialize)]
pub struct MemberAssessment {
    pub name: Option<String>,
    pub role: CanonicalRole,
    pub display_role: DisplayRole,
    pub age: Option<u32>,
    pub permit: PermitStatus,
    pub permit_valid: bool,
    pub counted: bool,
    pub warnings: Vec<MemberWarning>,
}

pub struct EligibilityChecker {
    clock: Box<dyn Clock>,
}

impl EligibilityChecker {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self { clock: Box::new(clock) }
    }

    /// Evaluate a single member against the role, age and permit rules.
    ///
    /// Whether a member is counted depends on the role alone; permit and age
    /// only raise warnings.
    pub fn assess_member(&self, member: &HouseholdMember) -> MemberAssessment {
        let today = self.clock.today();
        let age = member.birth_date.map(|birth| age_on(birth, today));
        let permit = permit_status(
            member.nationality.as_deref(),
            &member.residence_permit,
            member.permit_expiry_date,
            today,
        );
        let permit_valid = permit.is_valid();

        let mut warnings = Vec::new();
        if member.role == CanonicalRole::Autre {
            warnings.push(MemberWarning::UnrecognizedRole);
        }
        if !permit_valid {
            warnings.push(MemberWarning::InvalidPermit);
        }
        if member.birth_date.is_none() {
            warnings.push(MemberWarning::MissingBirthDate);
        }

        debug!(
            "Member {:?}: role={}, age={:?}, permit={}, counted={}",
            member.display_name(),
            member.role,
            age,
            permit.describe(),
            member.role.is_counted_child()
        );

        MemberAssessment {
            name: member.display_name(),
            role: member.role,
            display_role: member.role.display(),
            age,
            permit,
            permit_valid,
            counted: member.role.is_counted_child(),
            warnings,
        }
    }

    /// Assess every member and bucket the household on the barème.
    pub fn assess_household(&self, household: &Household) -> HouseholdSummary {
        let assessments: Vec<MemberAssessment> = household
            .members
            .iter()
            .map(|member| self.assess_member(member))
            .collect();

        let summary = HouseholdSummary::from_assessments(&household.applicant_id, self.clock.today(), assessments);

        info!(
            "Household {}: {} members, {} counted children, column {}",
            summary.applicant_id,
            summary.members.len(),
            summary.counted_children,
            summary.column.index()
        );

        summary
    }

    /// Get detailed eligibility reason
    pub fn eligibility_reason(&self, member: &HouseholdMember) -> String {
        let assessment = self.assess_member(member);

        let role_reason = match member.role {
            CanonicalRole::Enfant => "Dependent child, counted on the barème",
            CanonicalRole::EnfantGardeAlternee => "Child in shared custody, counted on the barème",
            CanonicalRole::EnfantDroitDeVisite => "Child under visitation rights, never counted on the barème",
            CanonicalRole::Conjoint => "Spouse or partner, not a child",
            CanonicalRole::Autre => "Role not recognised, not counted",
        };

        let age = match assessment.age {
            Some(age) => format!("{} years old", age),
            None => "age unknown".to_string(),
        };

        format!("{} ({}; permit {})", role_reason, age, assessment.permit.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::eligibility::{
        bareme::BaremeColumn,
        clock::{FixedClock, MockClock},
        permit::PermitKind,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn checker_on(today: NaiveDate) -> EligibilityChecker {
        EligibilityChecker::new(FixedClock(today))
    }

    #[test]
    fn test_assess_counted_child() {
        let checker = checker_on(date(2025, 6, 14));
        let member = HouseholdMember::new("Enfant")
            .with_birth_date(date(2015, 6, 15))
            .with_permit("Suisse", PermitKind::SansPermis, None);

        let assessment = checker.assess_member(&member);
        assert!(assessment.counted);
        assert_eq!(assessment.age, Some(9));
        assert!(assessment.permit_valid);
        assert_eq!(assessment.display_role, DisplayRole::EnfantACharge);
        assert!(assessment.warnings.is_empty());
    }

    #[test]
    fn test_visitation_child_is_never_counted() {
        let checker = checker_on(date(2025, 6, 14));
        let member = HouseholdMember::new("enfant (DV)")
            .with_birth_date(date(2012, 1, 1))
            .with_permit("France", PermitKind::PermisC, None);

        let assessment = checker.assess_member(&member);
        assert!(!assessment.counted);
        assert!(assessment.permit_valid);
    }

    #[test]
    fn test_warnings() {
        let checker = checker_on(date(2025, 1, 1));
        let member = HouseholdMember::new("voisin")
            .with_permit("France", PermitKind::PermisB, Some(date(2020, 1, 1)));

        let assessment = checker.assess_member(&member);
        assert_eq!(
            assessment.warnings,
            vec![
                MemberWarning::UnrecognizedRole,
                MemberWarning::InvalidPermit,
                MemberWarning::MissingBirthDate,
            ]
        );
        assert_eq!(assessment.permit, PermitStatus::Expired { expiry: date(2020, 1, 1) });
    }

    #[test]
    fn test_invalid_permit_does_not_change_counting() {
        let checker = checker_on(date(2025, 1, 1));
        let member = HouseholdMember::new("Enfant – garde alternée")
            .with_birth_date(date(2018, 2, 2))
            .with_permit("France", PermitKind::SansPermis, None);

        let assessment = checker.assess_member(&member);
        assert!(assessment.counted);
        assert!(!assessment.permit_valid);
    }

    #[test]
    fn test_assess_household_buckets_children() {
        let checker = checker_on(date(2025, 6, 14));
        let household = Household {
            applicant_id: "U-7".to_string(),
            members: vec![
                HouseholdMember::new("Conjoint"),
                HouseholdMember::new("Enfant"),
                HouseholdMember::new("Enfant"),
                HouseholdMember::new("Enfant garde alternée"),
                HouseholdMember::new("Enfant droit de visite"),
                HouseholdMember::new("enfant (dv)"),
            ],
        };

        let summary = checker.assess_household(&household);
        assert_eq!(summary.counted_children, 3);
        assert_eq!(summary.column, BaremeColumn::TroisEnfants);
        assert_eq!(summary.evaluated_on, date(2025, 6, 14));
        assert_eq!(summary.members.len(), 6);
    }

    #[test]
    fn test_large_household_saturates() {
        let checker = checker_on(date(2025, 6, 14));
        let household = Household {
            applicant_id: "U-8".to_string(),
            members: (0..6).map(|_| HouseholdMember::new("Enfant")).collect(),
        };
        assert_eq!(checker.assess_household(&household).column, BaremeColumn::QuatreEnfantsEtPlus);
    }

    #[test]
    fn test_checker_reads_the_injected_clock() {
        let mut clock = MockClock::new();
        clock.expect_today().returning(|| NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());

        let checker = EligibilityChecker::new(clock);
        let member = HouseholdMember::new("Enfant").with_birth_date(date(2000, 6, 15));
        assert_eq!(checker.assess_member(&member).age, Some(25));
    }

    #[test]
    fn test_eligibility_reason() {
        let checker = checker_on(date(2025, 1, 1));
        let member = HouseholdMember::new("enfant (DV)")
            .with_birth_date(date(2010, 5, 5))
            .with_permit("France", PermitKind::PermisF, None);

        let reason = checker.eligibility_reason(&member);
        assert!(reason.starts_with("Child under visitation rights"));
        assert!(reason.contains("14 years old"));
        assert!(reason.contains("expiry date missing"));
    }
}
