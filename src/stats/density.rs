use super::sample_variance;
use std::f64::consts::PI;

/// Sturges 规则的直方图箱数：ceil(log2 n) + 1
pub fn sturges_bins(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    (n as f64).log2().ceil() as usize + 1
}

/// 在 [lo, hi] 上按等宽箱计数，最后一个箱包含右端点
pub fn histogram(samples: &[f64], lo: f64, hi: f64, bins: usize) -> Vec<usize> {
    let bins = bins.max(1);
    let mut counts = vec![0; bins];
    let width = (hi - lo) / bins as f64;
    for &x in samples {
        if !(lo..=hi).contains(&x) {
            continue;
        }
        let idx = if width > 0.0 {
            (((x - lo) / width) as usize).min(bins - 1)
        } else {
            0
        };
        counts[idx] += 1;
    }
    counts
}

/// Scott 带宽：σ · n^(-1/5)；样本不足或方差为零时返回 None
pub fn scott_bandwidth(samples: &[f64]) -> Option<f64> {
    let sd = sample_variance(samples).sqrt();
    if samples.len() < 2 || sd <= 0.0 || !sd.is_finite() {
        return None;
    }
    Some(sd * (samples.len() as f64).powf(-0.2))
}

/// 高斯核密度估计，在 [lo, hi] 上均匀取 `points` 个点
///
/// 返回 (x, density)，积分为 1；无法估计带宽时返回 None。
pub fn gaussian_kde(samples: &[f64], lo: f64, hi: f64, points: usize) -> Option<Vec<(f64, f64)>> {
    let bandwidth = scott_bandwidth(samples)?;
    let n = samples.len() as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * PI).sqrt());
    let points = points.max(2);
    let step = (hi - lo) / (points - 1) as f64;

    let curve = (0..points)
        .map(|i| {
            let x = lo + step * i as f64;
            let density: f64 = samples
                .iter()
                .map(|s| {
                    let u = (x - s) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum();
            (x, density * norm)
        })
        .collect();
    Some(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sturges_bins() {
        assert_eq!(sturges_bins(0), 1);
        assert_eq!(sturges_bins(1), 1);
        assert_eq!(sturges_bins(3), 3);
        assert_eq!(sturges_bins(8), 4);
        assert_eq!(sturges_bins(100), 8);
    }

    #[test]
    fn test_histogram_counts_every_sample() {
        let samples = [0.0, 0.1, 0.5, 0.9, 1.0];
        let counts = histogram(&samples, 0.0, 1.0, 2);
        assert_eq!(counts, vec![2, 3]);
        assert_eq!(counts.iter().sum::<usize>(), samples.len());
    }

    #[test]
    fn test_histogram_zero_width() {
        assert_eq!(histogram(&[0.9, 0.9], 0.9, 0.9, 3), vec![2, 0, 0]);
    }

    #[test]
    fn test_kde_integrates_to_one() {
        let samples = [0.80, 0.82, 0.81, 0.79, 0.84];
        let curve = gaussian_kde(&samples, 0.5, 1.1, 2000).unwrap();
        let step = curve[1].0 - curve[0].0;
        let area: f64 = curve.iter().map(|(_, y)| y * step).sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-2);
    }

    #[test]
    fn test_kde_zero_variance() {
        assert!(gaussian_kde(&[0.9, 0.9, 0.9], 0.0, 1.0, 10).is_none());
        assert!(scott_bandwidth(&[0.5]).is_none());
    }
}
