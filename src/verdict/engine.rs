//! The two-tier decision rule.
//!
//! The first tier looks at the highest readings anywhere in the search area.
//! The second tier only applies when the region exceeded both thresholds and
//! checks whether the closest station with data stayed below both of them.
//!
//! The comparisons are deliberately asymmetric: the region tier treats a
//! value as "not met" only when strictly below the threshold, and the local
//! tier only engages when the region is strictly above it. A region maximum
//! equal to a threshold therefore ends up in the "criteria met" branch.

use crate::measurements::aggregator::StationSummary;
use crate::types::observation::MeasurementKind;
use crate::verdict::error::VerdictError;
use crate::verdict::thresholds::Thresholds;
use log::info;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Sufficient,
    Insufficient,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Sufficient => write!(f, "wind speed sufficient"),
            Outcome::Insufficient => write!(f, "wind speed not sufficient"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reason {
    RegionThresholdNotMet,
    LocalThresholdNotMet,
    CriteriaMet,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::RegionThresholdNotMet => write!(f, "region threshold not met"),
            Reason::LocalThresholdNotMet => write!(f, "local threshold not met"),
            Reason::CriteriaMet => write!(f, "criteria met"),
        }
    }
}

/// The numbers a verdict was decided on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub region_max_sustained: f64,
    pub region_max_gust: f64,
    /// Abbreviation of the closest station with data.
    pub closest_station: String,
    pub closest_distance_km: f64,
    pub closest_max_sustained: Option<f64>,
    pub closest_max_gust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the wide-radius (region) tier was exceeded.
    pub region_exceeded: bool,
    /// Whether the closest-station (local) tier was exceeded.
    pub local_exceeded: bool,
    pub outcome: Outcome,
    pub reason: Reason,
    pub evidence: Evidence,
}

/// Highest present value of `kind` across all summaries.
fn region_max(summaries: &[StationSummary], kind: MeasurementKind) -> Option<f64> {
    summaries
        .iter()
        .filter_map(|summary| summary.max(kind))
        .map(OrderedFloat)
        .max()
        .map(OrderedFloat::into_inner)
}

/// The summary with the smallest distance among those with any data.
///
/// `min_by_key` returns the first of equal minima, so distance ties go to the
/// station listed first.
pub fn closest_with_data(summaries: &[StationSummary]) -> Option<&StationSummary> {
    summaries
        .iter()
        .filter(|summary| summary.has_data())
        .min_by_key(|summary| OrderedFloat(summary.distance_km()))
}

fn strictly_below(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|v| v < threshold)
}

/// Decides whether the recorded wind speeds are sufficient evidence.
///
/// A pure function of its inputs.
///
/// # Errors
///
/// * [`VerdictError::InsufficientData`] if no summary carries any maximum.
/// * [`VerdictError::MissingMeasurementClass`] if one measurement class has no
///   reading at any station, so a region maximum cannot be formed.
pub fn evaluate(
    summaries: &[StationSummary],
    thresholds: &Thresholds,
) -> Result<Verdict, VerdictError> {
    let closest = closest_with_data(summaries).ok_or(VerdictError::InsufficientData {
        stations: summaries.len(),
    })?;
    let region = |kind| {
        region_max(summaries, kind).ok_or(VerdictError::MissingMeasurementClass {
            kind,
            stations: summaries.len(),
        })
    };
    let region_max_sustained = region(MeasurementKind::Sustained)?;
    let region_max_gust = region(MeasurementKind::Gust)?;

    let evidence = Evidence {
        region_max_sustained,
        region_max_gust,
        closest_station: closest.abbreviation().to_string(),
        closest_distance_km: closest.distance_km(),
        closest_max_sustained: closest.max_sustained,
        closest_max_gust: closest.max_gust,
    };

    let region_of = |kind: MeasurementKind| match kind {
        MeasurementKind::Sustained => region_max_sustained,
        MeasurementKind::Gust => region_max_gust,
    };
    let region_below = MeasurementKind::ALL
        .into_iter()
        .all(|kind| region_of(kind) < thresholds.for_kind(kind));
    let local_below = MeasurementKind::ALL.into_iter().all(|kind| {
        region_of(kind) > thresholds.for_kind(kind)
            && strictly_below(closest.max(kind), thresholds.for_kind(kind))
    });

    let (region_exceeded, local_exceeded, outcome, reason) = if region_below {
        (false, false, Outcome::Insufficient, Reason::RegionThresholdNotMet)
    } else if local_below {
        (true, false, Outcome::Insufficient, Reason::LocalThresholdNotMet)
    } else {
        (true, true, Outcome::Sufficient, Reason::CriteriaMet)
    };

    info!(
        "Verdict: {} ({}); region max {} / {} km/h, closest {} at {} km",
        outcome,
        reason,
        region_max_sustained,
        region_max_gust,
        evidence.closest_station,
        evidence.closest_distance_km
    );

    Ok(Verdict {
        region_exceeded,
        local_exceeded,
        outcome,
        reason,
        evidence,
    })
}
