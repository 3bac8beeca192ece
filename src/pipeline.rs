//! End-to-end wiring: fetch → normalize → join/aggregate → chart.

use plotters::style::{BLACK, RGBColor};
use tracing::info;

use crate::analysis::{
    BANDS, MembershipRecord, NamedSeries, ScoreRecord, YearMean, YearScore, named_peer_series,
    peer_average, target_series,
};
use crate::config::PipelineConfig;
use crate::countries::CountryResolver;
use crate::error::Result;
use crate::fetch::{HttpClient, fetch_html_table, fetch_spreadsheet};
use crate::normalize::{membership_codes, normalize_membership, normalize_scores};
use crate::output::RunSummary;
use crate::plot::{LineStyle, PALETTE, TrendChart, Y_MAX, Y_MIN, spread_labels};

const PEER_AVERAGE_COLOR: RGBColor = RGBColor(110, 110, 110);
const FIXED_LABEL_OFFSET: f64 = 0.6;
const FIXED_LABEL_GAP: f64 = 0.9;

/// Everything derived from one run.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub target_code: u32,
    pub target_name: String,
    pub target: Vec<YearScore>,
    pub peer_average: Vec<YearMean>,
    pub peers: Vec<NamedSeries>,
    pub membership: Vec<MembershipRecord>,
}

impl Comparison {
    pub fn average_name(&self) -> String {
        format!("Peer average (excl. {})", self.target_name)
    }

    pub fn summary(&self, cutoff_year: i32) -> RunSummary {
        RunSummary {
            generated_at: chrono::Utc::now(),
            target_code: self.target_code,
            target_name: self.target_name.clone(),
            cutoff_year,
            members: self.membership.len(),
            unresolved_members: self
                .membership
                .iter()
                .filter(|m| m.entity_code.is_none())
                .map(|m| m.entity_name.clone())
                .collect(),
            target_years: self.target.len(),
            peer_years: self
                .peer_average
                .iter()
                .filter(|m| m.mean_score.is_some())
                .count(),
            named_peers: self.peers.iter().map(|s| s.name.clone()).collect(),
        }
    }
}

/// Downloads and normalizes the scores workbook.
pub async fn load_scores<C: HttpClient + ?Sized>(
    client: &C,
    config: &PipelineConfig,
) -> Result<Vec<ScoreRecord>> {
    let sheet = fetch_spreadsheet(client, &config.scores_url, &config.retry_policy()).await?;
    normalize_scores(&sheet, &config.score_columns, config.cutoff_year)
}

/// Downloads the membership page and normalizes its table.
pub async fn load_membership<C: HttpClient + ?Sized>(
    client: &C,
    config: &PipelineConfig,
    resolver: &dyn CountryResolver,
) -> Result<Vec<MembershipRecord>> {
    let grid = fetch_html_table(
        client,
        &config.membership_url,
        &config.table_query(),
        &config.retry_policy(),
    )
    .await?;
    normalize_membership(&grid, config.membership_columns(), resolver)
}

/// Joins normalized tables into the target, peer-average and named-peer series.
pub fn compare(
    scores: &[ScoreRecord],
    membership: Vec<MembershipRecord>,
    config: &PipelineConfig,
    resolver: &dyn CountryResolver,
) -> Comparison {
    let members = membership_codes(&membership);
    let target = target_series(scores, config.target_code);
    let peer_average = peer_average(scores, &members, config.target_code);
    let peers = named_peer_series(scores, &config.peer_codes, resolver);
    let target_name = resolver
        .code_to_name(config.target_code)
        .map(str::to_string)
        .unwrap_or_else(|| config.target_code.to_string());

    info!(
        target = %target_name,
        target_years = target.len(),
        peer_years = peer_average.len(),
        members = members.len(),
        named_peers = peers.len(),
        "Comparison ready"
    );

    Comparison {
        target_code: config.target_code,
        target_name,
        target,
        peer_average,
        peers,
        membership,
    }
}

/// Runs every stage in order; each stage's input is fully materialized first.
#[tracing::instrument(skip_all, fields(target = config.target_code))]
pub async fn run<C: HttpClient + ?Sized>(
    client: &C,
    config: &PipelineConfig,
    resolver: &dyn CountryResolver,
) -> Result<Comparison> {
    let scores = load_scores(client, config).await?;
    let membership = load_membership(client, config, resolver).await?;
    Ok(compare(&scores, membership, config, resolver))
}

/// Lays out the comparison chart.
///
/// With only the target and the peer average, each line gets a fixed label
/// just above its last point, kept inside the y-axis and apart from the
/// other. With named peers, every line gets an auto-placed label at the
/// last year the target has data for.
pub fn build_chart(comparison: &Comparison, config: &PipelineConfig) -> TrendChart {
    let title = config.title.clone().unwrap_or_else(|| {
        format!("{} compared with its peer group", comparison.target_name)
    });
    let target_line = NamedSeries::from_scores(comparison.target_name.clone(), &comparison.target);
    let average_line = NamedSeries::from_means(comparison.average_name(), &comparison.peer_average);

    let mut builder = TrendChart::builder().title(title).bands(BANDS);
    let mut names = Vec::new();

    if !average_line.is_empty() {
        names.push(average_line.name.clone());
        builder = builder.line(average_line.clone(), LineStyle::dashed(PEER_AVERAGE_COLOR, 2));
    }
    for (i, peer) in comparison.peers.iter().enumerate() {
        names.push(peer.name.clone());
        builder = builder.line(peer.clone(), LineStyle::solid(PALETTE[i % PALETTE.len()], 2));
    }
    if !target_line.is_empty() {
        names.push(target_line.name.clone());
        builder = builder.line(target_line.clone(), LineStyle::solid(BLACK, 3));
    }

    if comparison.peers.is_empty() {
        let ends: Vec<_> = [&target_line, &average_line]
            .into_iter()
            .filter_map(|line| line.points.last().map(|&(year, value)| (&line.name, year, value)))
            .collect();
        let anchors: Vec<f64> = ends.iter().map(|&(_, _, v)| v + FIXED_LABEL_OFFSET).collect();
        let heights = spread_labels(&anchors, FIXED_LABEL_GAP, Y_MIN, Y_MAX);
        for ((name, year, _), y) in ends.into_iter().zip(heights) {
            builder = builder.fixed_label(name.clone(), year as f64, y);
        }
    } else if let Some(last) = comparison.target.last() {
        for name in names {
            builder = builder.label_at_year(name, last.year);
        }
    }

    builder.build()
}
