//! Windowed Rate-of-Rise computation
//!
//! RoR is the first derivative of bean temperature with respect to time,
//! smoothed over a trailing window and expressed in degrees per minute.
//! A sample whose trailing window has no usable history gets the sentinel
//! `0.0`, matching the convention of the charting tools downstream.

use crate::alog::TemperatureSeries;

/// Default trailing window for RoR smoothing, in seconds.
pub const DEFAULT_WINDOW_SECS: f64 = 30.0;

/// The maximum of a RoR series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RorPeak {
    /// Index of the peak sample.
    pub index: usize,
    /// Sample time in seconds.
    pub time_secs: f64,
    /// Peak value in degrees per minute.
    pub value: f64,
}

/// Compute the RoR series for parallel `times`/`temps` samples.
///
/// For each sample, the earliest sample still inside the trailing
/// `window_secs` window is located by a backwards scan, and the slope
/// across that span is scaled to degrees per minute. Samples with an
/// invalid endpoint (negative temperature), zero elapsed time, or no
/// history inside the window yield `0.0`.
///
/// The output always has the same length as the input.
pub fn ror_series(times: &[f64], temps: &[f64], window_secs: f64) -> Vec<f64> {
    let n = times.len().min(temps.len());
    let mut ror = Vec::with_capacity(n);

    for i in 0..n {
        let lookback = times[i] - window_secs;

        let mut start = i;
        for j in (0..i).rev() {
            if times[j] >= lookback {
                start = j;
            } else {
                break;
            }
        }

        let value = if start < i && temps[i] >= 0.0 && temps[start] >= 0.0 {
            let dt = times[i] - times[start];
            if dt > 0.0 {
                (temps[i] - temps[start]) / dt * 60.0
            } else {
                0.0
            }
        } else {
            0.0
        };
        ror.push(value);
    }
    ror
}

/// RoR for the BT channel of a temperature series, with the default window.
pub fn bt_ror(series: &TemperatureSeries) -> Vec<f64> {
    ror_series(&series.times, &series.bt, DEFAULT_WINDOW_SECS)
}

/// Force RoR samples before the turning point to the sentinel.
///
/// Before TP the bean probe is still recovering from the charge plunge and
/// the derivative is dominated by that transient.
pub fn zero_before(ror: &mut [f64], tp_index: usize) {
    for value in ror.iter_mut().take(tp_index) {
        *value = 0.0;
    }
}

/// Find the peak of a RoR series.
///
/// Returns `None` when the series is empty or never rises above zero.
pub fn peak(ror: &[f64], times: &[f64]) -> Option<RorPeak> {
    let (index, &value) = ror
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))?;
    if value <= 0.0 {
        return None;
    }
    Some(RorPeak {
        index,
        time_secs: times.get(index).copied().unwrap_or(0.0),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_ramp() {
        // 1 degree per 2 seconds = 30 degrees per minute
        let times: Vec<f64> = (0..40).map(|i| i as f64 * 2.0).collect();
        let temps: Vec<f64> = (0..40).map(|i| 200.0 + i as f64).collect();
        let ror = ror_series(&times, &temps, 30.0);
        assert_eq!(ror.len(), 40);
        // First sample has no history
        assert_eq!(ror[0], 0.0);
        // Steady state well inside the data
        assert!((ror[30] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_limits_lookback() {
        // Flat for 60 s, then a step; the window must only see the ramp
        let times: Vec<f64> = (0..60).map(|i| i as f64).collect();
        let mut temps = vec![200.0; 60];
        for (i, t) in temps.iter_mut().enumerate().skip(30) {
            *t = 200.0 + (i - 30) as f64 * 0.5; // 30 deg/min
        }
        let ror = ror_series(&times, &temps, 10.0);
        assert!((ror[59] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_endpoints_are_sentinel() {
        let times = vec![0.0, 1.0, 2.0, 3.0];
        let temps = vec![200.0, -1.0, 202.0, 203.0];
        let ror = ror_series(&times, &temps, 30.0);
        assert_eq!(ror[1], 0.0); // invalid current sample
        assert!(ror[2] > 0.0); // window start skips back to a valid sample
    }

    #[test]
    fn test_duplicate_timestamps() {
        let times = vec![0.0, 5.0, 5.0];
        let temps = vec![200.0, 210.0, 211.0];
        let ror = ror_series(&times, &temps, 30.0);
        // dt across the window is positive, so this still resolves
        assert!(ror[2] > 0.0);
        // but an all-duplicate prefix yields the sentinel
        let ror = ror_series(&[5.0, 5.0], &[210.0, 211.0], 30.0);
        assert_eq!(ror[1], 0.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(ror_series(&[], &[], 30.0).is_empty());
        assert_eq!(peak(&[], &[]), None);
    }

    #[test]
    fn test_zero_before_tp() {
        let mut ror = vec![5.0, 4.0, 3.0, 2.0];
        zero_before(&mut ror, 2);
        assert_eq!(ror, vec![0.0, 0.0, 3.0, 2.0]);
    }

    #[test]
    fn test_peak_detection() {
        let times = vec![0.0, 10.0, 20.0, 30.0];
        let ror = vec![0.0, 12.0, 18.5, 9.0];
        let p = peak(&ror, &times).unwrap();
        assert_eq!(p.index, 2);
        assert_eq!(p.time_secs, 20.0);
        assert_eq!(p.value, 18.5);
    }

    #[test]
    fn test_peak_none_when_flat() {
        assert_eq!(peak(&[0.0, 0.0, -2.0], &[0.0, 1.0, 2.0]), None);
    }

    #[test]
    fn test_output_length_matches_input() {
        let times: Vec<f64> = (0..17).map(|i| i as f64 * 1.5).collect();
        let temps = vec![210.0; 17];
        assert_eq!(ror_series(&times, &temps, 30.0).len(), 17);
    }
}
