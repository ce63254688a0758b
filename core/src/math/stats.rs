pub struct StatsHelper;

impl StatsHelper {
    pub fn mean_intensity(samples: &[u8]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum: u64 = samples.iter().map(|&v| v as u64).sum();
        sum as f32 / samples.len() as f32
    }
}
