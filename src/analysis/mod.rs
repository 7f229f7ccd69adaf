/// Analysis over assessed site collections.
///
/// Submodules:
/// - `aggregates` — per-region counts and means.
/// - `report`     — coastline risk report with notices and text rendering.

pub mod aggregates;
pub mod report;
