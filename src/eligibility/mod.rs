pub mod age;
pub mod bareme;
pub mod checker;
pub mod clock;
pub mod household;
pub mod permit;

pub use age::{age_on, years_diff};
pub use bareme::{BaremeColumn, HouseholdSummary};
pub use checker::{EligibilityChecker, MemberAssessment, MemberWarning};
pub use clock::{parse_date, Clock, FixedClock, SystemClock};
pub use household::{Household, HouseholdMember};
pub use permit::{is_permit_valid, permit_status, PermitKind, PermitStatus};
