use chrono::NaiveDate;
use colored::Colorize;
use serde::Serialize;

use super::checker::MemberAssessment;
use crate::utils;

/// Child column of the rent/benefit scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaremeColumn {
    ZeroEnfant,
    UnEnfant,
    DeuxEnfants,
    TroisEnfants,
    QuatreEnfantsEtPlus,
}

impl BaremeColumn {
    /// Bucket a number of counted children; four and more share the last column.
    pub fn from_child_count(count: usize) -> Self {
        match count {
            0 => BaremeColumn::ZeroEnfant,
            1 => BaremeColumn::UnEnfant,
            2 => BaremeColumn::DeuxEnfants,
            3 => BaremeColumn::TroisEnfants,
            _ => BaremeColumn::QuatreEnfantsEtPlus,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            BaremeColumn::ZeroEnfant => "0 enfant",
            BaremeColumn::UnEnfant => "1 enfant",
            BaremeColumn::DeuxEnfants => "2 enfants",
            BaremeColumn::TroisEnfants => "3 enfants",
            BaremeColumn::QuatreEnfantsEtPlus => "4 enfants et plus",
        }
    }
}

impl std::fmt::Display for BaremeColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of assessing a whole household.
#[derive(Debug, Clone, Serialize)]
pub struct HouseholdSummary {
    pub applicant_id: String,
    pub evaluated_on: NaiveDate,
    pub members: Vec<MemberAssessment>,
    pub counted_children: usize,
    pub column: BaremeColumn,
    pub invalid_permits: usize,
}

impl HouseholdSummary {
    pub fn from_assessments(applicant_id: &str, evaluated_on: NaiveDate, members: Vec<MemberAssessment>) -> Self {
        let counted_children = members.iter().filter(|m| m.counted).count();
        let invalid_permits = members.iter().filter(|m| !m.permit_valid).count();

        Self {
            applicant_id: applicant_id.to_string(),
            evaluated_on,
            column: BaremeColumn::from_child_count(counted_children),
            counted_children,
            invalid_permits,
            members,
        }
    }

    /// Members carrying at least one warning.
    pub fn flagged_members(&self) -> usize {
        self.members.iter().filter(|m| !m.warnings.is_empty()).count()
    }

    /// Print a formatted summary to console
    pub fn print_summary(&self) {
        println!("\n{}", format!("=== Household {} ===", self.applicant_id).cyan().bold());
        println!("Evaluated on:     {}", self.evaluated_on);
        println!("Members:          {}", self.members.len());
        println!("Counted children: {}", self.counted_children.to_string().green());
        println!(
            "Barème column:    {} ({})",
            self.column.index().to_string().cyan(),
            self.column.label()
        );
        if self.invalid_permits > 0 {
            println!("Invalid permits:  {}", self.invalid_permits.to_string().red());
        }

        if self.members.is_empty() {
            return;
        }

        let widths = [20, 26, 5, 14, 8, 30];
        println!();
        utils::print_table_border(110);
        utils::print_table_row(&["Name", "Role", "Age", "Permit", "Counted", "Warnings"], &widths);
        utils::print_table_border(110);
        for member in &self.members {
            let age = member.age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string());
            let permit = if member.permit_valid { "valid" } else { "invalid" };
            let counted = if member.counted { "yes" } else { "no" };
            let warnings = member
                .warnings
                .iter()
                .map(|w| w.to_string())
                .collect::<Vec<_>>()
                .join(", ");

            utils::print_table_row(
                &[
                    member.name.as_deref().unwrap_or("-"),
                    member.display_role.label(),
                    &age,
                    permit,
                    counted,
                    &warnings,
                ],
                &widths,
            );
        }
        utils::print_table_border(110);
    }
}
