//! Joining the scores table against a membership set and aggregating it.
//!
//! Target extraction is a straight filter; the peer baseline is a per-year
//! mean over the membership set minus the target, with missing scores left
//! out of both the sum and the count.

pub mod aggregate;
pub mod regime;
pub mod types;
pub mod utility;

pub use aggregate::{named_peer_series, peer_average, target_series};
pub use regime::{BANDS, ClassificationBand, Regime, classify};
pub use types::{MembershipRecord, NamedSeries, ScoreRecord, YearMean, YearScore};
