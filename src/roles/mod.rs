pub mod canonical;
pub mod normalize;

pub use canonical::{canonicalize_role, is_child_counted, to_display_role, CanonicalRole, DisplayRole};
pub use normalize::normalize;
