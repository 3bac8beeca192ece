//! Raw tables to typed records.

mod membership;
mod scores;

pub use membership::{MembershipColumns, membership_codes, normalize_membership};
pub use scores::{SCORE_MAX, SCORE_MIN, ScoreColumns, normalize_scores};
