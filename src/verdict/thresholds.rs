use crate::types::observation::MeasurementKind;

/// Sustained (10 minute mean) wind speed that counts as damaging.
pub const DEFAULT_SUSTAINED_THRESHOLD_KMH: f64 = 63.0;
/// Gust peak wind speed that counts as damaging.
pub const DEFAULT_GUST_THRESHOLD_KMH: f64 = 100.0;

/// Regulatory wind speed thresholds in km/h, one per measurement class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub sustained_kmh: f64,
    pub gust_kmh: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            sustained_kmh: DEFAULT_SUSTAINED_THRESHOLD_KMH,
            gust_kmh: DEFAULT_GUST_THRESHOLD_KMH,
        }
    }
}

impl Thresholds {
    pub fn new(sustained_kmh: f64, gust_kmh: f64) -> Self {
        Self {
            sustained_kmh,
            gust_kmh,
        }
    }

    pub fn for_kind(&self, kind: MeasurementKind) -> f64 {
        match kind {
            MeasurementKind::Sustained => self.sustained_kmh,
            MeasurementKind::Gust => self.gust_kmh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_kind_picks_matching_threshold() {
        let defaults = Thresholds::default();
        assert_eq!(defaults.for_kind(MeasurementKind::Sustained), 63.0);
        assert_eq!(defaults.for_kind(MeasurementKind::Gust), 100.0);

        let custom = Thresholds::new(45.0, 75.0);
        assert_eq!(custom.for_kind(MeasurementKind::Sustained), 45.0);
        assert_eq!(custom.for_kind(MeasurementKind::Gust), 75.0);
    }
}
