//! Pipeline configuration: sources, table layout, cutoff, target and peers.
//!
//! Every field has a default, so a JSON file only needs the keys it changes:
//! ```json
//! {
//!   "target_code": 290,
//!   "peer_codes": [310, 316],
//!   "cutoff_year": 1995
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::fetch::RetryPolicy;
use crate::normalize::{MembershipColumns, ScoreColumns};
use crate::parser::TableQuery;

pub const DEFAULT_SCORES_URL: &str = "http://www.systemicpeace.org/inscr/p4v2018.xls";
pub const DEFAULT_MEMBERSHIP_URL: &str =
    "https://web.archive.org/web/20190301000000/https://en.wikipedia.org/wiki/Member_states_of_NATO";
pub const DEFAULT_TABLE_SELECTOR: &str = "#mw-content-text table.wikitable";
pub const DEFAULT_CUTOFF_YEAR: i32 = 2000;
/// Hungary.
pub const DEFAULT_TARGET_CODE: u32 = 310;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub scores_url: String,
    pub membership_url: String,
    pub table_selector: String,
    pub table_index: usize,
    pub name_column: usize,
    pub date_column: usize,
    pub score_columns: ScoreColumns,
    pub cutoff_year: i32,
    pub target_code: u32,
    pub peer_codes: Vec<u32>,
    pub timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub title: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scores_url: DEFAULT_SCORES_URL.to_string(),
            membership_url: DEFAULT_MEMBERSHIP_URL.to_string(),
            table_selector: DEFAULT_TABLE_SELECTOR.to_string(),
            table_index: 0,
            name_column: MembershipColumns::default().name,
            date_column: MembershipColumns::default().join_date,
            score_columns: ScoreColumns::default(),
            cutoff_year: DEFAULT_CUTOFF_YEAR,
            target_code: DEFAULT_TARGET_CODE,
            peer_codes: Vec::new(),
            timeout_secs: 30,
            retry_attempts: RetryPolicy::default().attempts,
            retry_base_delay_ms: RetryPolicy::default().base_delay.as_millis() as u64,
            title: None,
        }
    }
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))
    }

    pub fn table_query(&self) -> TableQuery {
        TableQuery::new(self.table_selector.clone(), self.table_index)
    }

    pub fn membership_columns(&self) -> MembershipColumns {
        MembershipColumns {
            name: self.name_column,
            join_date: self.date_column,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts.max(1),
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
