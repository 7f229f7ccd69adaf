/// Coastline risk report.
///
/// Builds a point-in-time summary over a site collection: totals, counts per
/// level, mean parasite load, the highest-scoring sites, and notices for the
/// sites that need attention regardless of score (forced culls, disease
/// codes, quarantines).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Site, Vessel};
use crate::regions::find_region;
use crate::risk::levels::{assess_all, RiskLevel, SiteAssessment};

/// Rows kept in `RiskReport::top_sites`.
pub const TOP_SITES: usize = 20;
/// Names listed per notice; the rest are summarized as a count.
pub const NOTICE_NAME_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    ForcedCull,
    Disease,
    Quarantine,
}

impl NoticeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NoticeKind::ForcedCull => "Forced cull ordered",
            NoticeKind::Disease => "Disease code reported",
            NoticeKind::Quarantine => "Under quarantine",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub count: usize,
    /// At most `NOTICE_NAME_LIMIT` site names, in collection order.
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCount {
    pub level: RiskLevel,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    pub generated_at: DateTime<Utc>,
    pub total_sites: usize,
    /// Highest level first; every level is present.
    pub level_counts: Vec<LevelCount>,
    pub average_parasite_load: Option<f64>,
    /// Sorted by current score, highest first; ties keep collection order.
    pub top_sites: Vec<SiteAssessment>,
    /// Only kinds with at least one site.
    pub notices: Vec<Notice>,
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

impl RiskReport {
    pub fn build(sites: &[Site], vessels: &[Vessel], generated_at: DateTime<Utc>) -> Self {
        let assessments = assess_all(sites, vessels);

        let level_counts = RiskLevel::DESCENDING
            .iter()
            .map(|&level| LevelCount {
                level,
                count: assessments.iter().filter(|a| a.current.level == level).count(),
            })
            .collect();

        let average_parasite_load = (!sites.is_empty()).then(|| {
            sites.iter().map(|s| s.parasite_load).sum::<f64>() / sites.len() as f64
        });

        let mut top_sites = assessments;
        top_sites.sort_by(|a, b| b.current.score.cmp(&a.current.score));
        top_sites.truncate(TOP_SITES);

        let notices = [
            (NoticeKind::ForcedCull, Site::is_forced_cull as fn(&Site) -> bool),
            (NoticeKind::Disease, Site::has_disease),
            (NoticeKind::Quarantine, Site::is_in_quarantine),
        ]
        .into_iter()
        .filter_map(|(kind, matches)| notice(kind, sites, matches))
        .collect();

        Self {
            generated_at,
            total_sites: sites.len(),
            level_counts,
            average_parasite_load,
            top_sites,
            notices,
        }
    }
}

/// Plain-text rendering for terminals and log attachments.
impl fmt::Display for RiskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Aquaculture risk report ({})", self.generated_at.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(f, "Sites monitored: {}", self.total_sites)?;
        match self.average_parasite_load {
            Some(load) => writeln!(f, "Mean adult female lice: {:.2}", load)?,
            None => writeln!(f, "Mean adult female lice: n/a")?,
        }

        writeln!(f)?;
        for lc in &self.level_counts {
            writeln!(f, "  {:<9} {:>4}", lc.level.as_str(), lc.count)?;
        }

        if !self.top_sites.is_empty() {
            writeln!(f, "\nHighest current risk (predictive, future 1-2 wk):")?;
            for (rank, a) in self.top_sites.iter().enumerate() {
                let region = find_region(a.region_id).map(|r| r.name).unwrap_or("unknown region");
                writeln!(
                    f,
                    "{:>3}. {:<32} {:>2} {:<8} (pred {:>2}, 1-2wk {:>2})  {}",
                    rank + 1,
                    a.name,
                    a.current.score,
                    a.current.level.as_str(),
                    a.predictive.score,
                    a.future.score,
                    region
                )?;
            }
        }

        if !self.notices.is_empty() {
            writeln!(f, "\nNotices:")?;
            for n in &self.notices {
                let more = n.count.saturating_sub(n.names.len());
                write!(f, "  ! {} ({}): {}", n.kind.label(), n.count, n.names.join(", "))?;
                if more > 0 {
                    write!(f, " and {} more", more)?;
                }
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

fn notice(kind: NoticeKind, sites: &[Site], matches: fn(&Site) -> bool) -> Option<Notice> {
    let flagged: Vec<&Site> = sites.iter().filter(|s| matches(s)).collect();
    if flagged.is_empty() {
        return None;
    }
    Some(Notice {
        kind,
        count: flagged.len(),
        names: flagged
            .iter()
            .take(NOTICE_NAME_LIMIT)
            .map(|s| s.name.clone())
            .collect(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
