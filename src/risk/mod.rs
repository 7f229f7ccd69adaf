/// Risk scoring engine.
///
/// Pure computation only: no I/O, no clock, no randomness. Consumes the
/// full `Site` and `Vessel` sets produced by `acquisition` and yields the
/// `{score, level, color}` triples the presentation layer renders.
///
/// Submodules:
/// - `scoring` — current, predictive and future scores with breakdowns.
/// - `levels`  — level/colour classification and `SiteAssessment`.

pub mod levels;
pub mod scoring;

pub use levels::{assess, assess_all, RiskColor, RiskLevel, SiteAssessment, SiteRisk};
pub use scoring::{future, predictive, score};
