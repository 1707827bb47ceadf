use audiocare_core::models::frequency::Frequency;

use crate::pure_tone::ThresholdMap;

/// A weighted set of frequencies averaged into one number.
///
/// Both clinical averages share one partial-data policy: the weighted mean
/// over whichever contributing frequencies have a threshold, `None` only when
/// none do. Results are rounded half-up to whole dB.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdAverage {
    pub name: &'static str,
    pub weights: &'static [(Frequency, i64)],
}

/// Counseling average: 500, 1000, 2000 and 4000 Hz, equal weights.
pub const PTA4: ThresholdAverage = ThresholdAverage {
    name: "PTA-4",
    weights: &[
        (Frequency::Hz500, 1),
        (Frequency::Hz1000, 1),
        (Frequency::Hz2000, 1),
        (Frequency::Hz4000, 1),
    ],
};

/// Disability average, six-division formula:
/// (500 + 2×1000 + 2×2000 + 4000) / 6.
pub const PTA6: ThresholdAverage = ThresholdAverage {
    name: "PTA-6",
    weights: &[
        (Frequency::Hz500, 1),
        (Frequency::Hz1000, 2),
        (Frequency::Hz2000, 2),
        (Frequency::Hz4000, 1),
    ],
};

impl ThresholdAverage {
    pub fn frequencies(&self) -> impl Iterator<Item = Frequency> + '_ {
        self.weights.iter().map(|(f, _)| *f)
    }

    pub fn compute(&self, thresholds: &ThresholdMap) -> Option<i32> {
        let (sum, weight) = self
            .weights
            .iter()
            .filter_map(|(f, w)| thresholds.get(*f).map(|v| (i64::from(v) * w, *w)))
            .fold((0i64, 0i64), |(s, t), (v, w)| (s + v, t + w));
        ratio_half_up(sum, weight)
    }
}

pub fn pta4(thresholds: &ThresholdMap) -> Option<i32> {
    PTA4.compute(thresholds)
}

pub fn pta6(thresholds: &ThresholdMap) -> Option<i32> {
    PTA6.compute(thresholds)
}

/// Round half-up (towards positive infinity on ties).
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// `sum / count` rounded half-up, in exact integer arithmetic.
pub(crate) fn ratio_half_up(sum: i64, count: i64) -> Option<i32> {
    if count <= 0 {
        return None;
    }
    let rounded = (2 * sum + count).div_euclid(2 * count);
    i32::try_from(rounded).ok()
}
