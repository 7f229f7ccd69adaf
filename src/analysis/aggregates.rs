/// Per-region aggregates.
///
/// `summarize_regions` folds the flat site list into one `RegionSummary` per
/// production region, so the presentation layer can colour a region without
/// walking every site. All 13 regions are always present, in registry order;
/// a region without sites has a count of zero and no means.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::Site;
use crate::regions::REGION_REGISTRY;
use crate::risk::levels::RiskLevel;
use crate::risk::scoring;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSummary {
    pub region_id: u8,
    pub name: &'static str,
    pub site_count: usize,
    /// Mean current score, `None` for an empty region.
    pub average_score: Option<f64>,
    pub average_parasite_load: Option<f64>,
    /// Sites whose current level is `high` or `critical`.
    pub high_or_critical_count: usize,
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    score_sum: u32,
    load_sum: f64,
    elevated: usize,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

pub fn summarize_regions(sites: &[Site]) -> Vec<RegionSummary> {
    let mut by_region: HashMap<u8, Accumulator> = HashMap::new();

    for site in sites {
        let score = scoring::score(site);
        let acc = by_region.entry(site.region_id).or_default();
        acc.count += 1;
        acc.score_sum += u32::from(score);
        acc.load_sum += site.parasite_load;
        if RiskLevel::from_score(score) >= RiskLevel::High {
            acc.elevated += 1;
        }
    }

    REGION_REGISTRY
        .iter()
        .map(|region| {
            let acc = by_region.remove(&region.id).unwrap_or_default();
            let mean = |sum: f64| (acc.count > 0).then(|| sum / acc.count as f64);
            RegionSummary {
                region_id: region.id,
                name: region.name,
                site_count: acc.count,
                average_score: mean(f64::from(acc.score_sum)),
                average_parasite_load: mean(acc.load_sum),
                high_or_critical_count: acc.elevated,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
