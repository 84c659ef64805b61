//! 取樣間隔計算
//!
//! 影格總數通常不是要求寬度的整數倍，因此實際樣本數會和要求的寬度有些出入，
//! 這個差異會如實回報，不會被修正。

/// 取樣計畫：每 `step` 個影格取一張，預計得到 `sample_count` 個樣本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePlan {
    pub step: u64,
    pub sample_count: u64,
}

impl SamplePlan {
    /// step = max(1, round(total_frames / requested_width))
    /// sample_count = round(total_frames / step)
    #[must_use]
    pub fn new(total_frames: u64, requested_width: u32) -> Self {
        let requested_width = u64::from(requested_width.max(1));
        let step = ((total_frames as f64 / requested_width as f64).round() as u64).max(1);
        let sample_count = ((total_frames as f64 / step as f64).round() as u64).max(1);

        Self { step, sample_count }
    }

    /// 實際樣本數與要求寬度的差距
    #[must_use]
    pub fn width_deviation(&self, requested_width: u32) -> i64 {
        self.sample_count as i64 - i64::from(requested_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_division() {
        let plan = SamplePlan::new(1000, 100);
        assert_eq!(plan.step, 10);
        assert_eq!(plan.sample_count, 100);
        assert_eq!(plan.width_deviation(100), 0);
    }

    #[test]
    fn test_rounding_reports_deviation() {
        // 172800 / 5000 = 34.56 -> 35; 172800 / 35 = 4937.14 -> 4937
        let plan = SamplePlan::new(172_800, 5000);
        assert_eq!(plan.step, 35);
        assert_eq!(plan.sample_count, 4937);
        assert_eq!(plan.width_deviation(5000), -63);
    }

    #[test]
    fn test_half_rounds_away_from_zero() {
        // 250 / 100 = 2.5 -> 3
        let plan = SamplePlan::new(250, 100);
        assert_eq!(plan.step, 3);
        assert_eq!(plan.sample_count, 83);
    }

    #[test]
    fn test_fewer_frames_than_width_clamps_step() {
        let plan = SamplePlan::new(30, 5000);
        assert_eq!(plan.step, 1);
        assert_eq!(plan.sample_count, 30);

        let plan = SamplePlan::new(1, 100);
        assert_eq!(plan.step, 1);
        assert_eq!(plan.sample_count, 1);
    }

    #[test]
    fn test_plan_invariants_hold_across_inputs() {
        for total_frames in [1_u64, 2, 7, 99, 100, 101, 1234, 99_999, 1_000_000] {
            for requested_width in [1_u32, 2, 3, 50, 640, 5000] {
                let plan = SamplePlan::new(total_frames, requested_width);
                assert!(plan.step >= 1);
                assert!(plan.sample_count >= 1);
                let ideal = total_frames as f64 / plan.step as f64;
                assert!(
                    (plan.sample_count as f64 - ideal).abs() <= 1.0,
                    "total={total_frames} width={requested_width} plan={plan:?}"
                );
            }
        }
    }
}
