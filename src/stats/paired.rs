use super::{StatsError, StatsResult, sample_variance, standard_normal};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// 配对检验所需的最少配对数
pub const MIN_PAIRED_SAMPLES: usize = 2;

/// 精确分布可用的最大有效样本数
const EXACT_WILCOXON_LIMIT: usize = 50;

/// 配对 t 检验结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairedTTest {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: f64,
}

/// Wilcoxon 符号秩检验 p 值的计算方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WilcoxonMethod {
    Exact,
    NormalApproximation,
}

/// Wilcoxon 符号秩检验结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WilcoxonSignedRank {
    /// min(R+, R-)
    pub statistic: f64,
    pub p_value: f64,
    pub method: WilcoxonMethod,
    /// 去掉零差值后参与排序的配对数
    pub effective_n: usize,
}

fn differences(a: &[f64], b: &[f64]) -> StatsResult<Vec<f64>> {
    if a.len() != b.len() {
        return Err(StatsError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.len() < MIN_PAIRED_SAMPLES {
        return Err(StatsError::TooFewSamples {
            required: MIN_PAIRED_SAMPLES,
            actual: a.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x - y).collect())
}

/// 双侧配对 t 检验（自由度 n - 1）
///
/// 差值方差为零时 t 检验无定义：平均差为零视为无差异（p = 1），
/// 否则视为确定的差异（p = 0）。
pub fn paired_t_test(a: &[f64], b: &[f64]) -> StatsResult<PairedTTest> {
    let d = differences(a, b)?;
    let n = d.len() as f64;
    let degrees_of_freedom = n - 1.0;

    let mean = crate::reduce::mean(&d);
    let sd = sample_variance(&d).sqrt();

    if sd <= f64::EPSILON * mean.abs().max(1.0) {
        let (statistic, p_value) = if mean.abs() <= f64::EPSILON {
            (0.0, 1.0)
        } else {
            (f64::INFINITY.copysign(mean), 0.0)
        };
        return Ok(PairedTTest {
            statistic,
            p_value,
            degrees_of_freedom,
        });
    }

    let statistic = mean / (sd / n.sqrt());
    let t_dist = StudentsT::new(0.0, 1.0, degrees_of_freedom)
        .map_err(|e| StatsError::Distribution(e.to_string()))?;
    let p_value = (2.0 * t_dist.sf(statistic.abs())).min(1.0);

    Ok(PairedTTest {
        statistic,
        p_value,
        degrees_of_freedom,
    })
}

/// 双侧 Wilcoxon 符号秩检验
///
/// 零差值被丢弃；|d| 相同的配对取平均秩。有效样本数不超过 50 且
/// 没有并列和零差值时使用精确零分布，否则使用带并列修正的正态近似。
/// 所有差值为零时 p = 1。
pub fn wilcoxon_signed_rank(a: &[f64], b: &[f64]) -> StatsResult<WilcoxonSignedRank> {
    let d = differences(a, b)?;
    let nonzero: Vec<f64> = d.iter().copied().filter(|v| *v != 0.0).collect();
    let zeros_dropped = d.len() - nonzero.len();
    let n = nonzero.len();

    if n == 0 {
        return Ok(WilcoxonSignedRank {
            statistic: 0.0,
            p_value: 1.0,
            method: WilcoxonMethod::Exact,
            effective_n: 0,
        });
    }

    let (ranks, tie_groups) = rank_abs_with_ties(&nonzero);
    let r_plus: f64 = nonzero
        .iter()
        .zip(&ranks)
        .filter(|(v, _)| **v > 0.0)
        .map(|(_, r)| r)
        .sum();
    let total = (n * (n + 1)) as f64 / 2.0;
    let r_minus = total - r_plus;
    let statistic = r_plus.min(r_minus);

    let has_ties = tie_groups.iter().any(|&t| t > 1);
    if n <= EXACT_WILCOXON_LIMIT && !has_ties && zeros_dropped == 0 {
        return Ok(WilcoxonSignedRank {
            statistic,
            p_value: exact_p_value(n, statistic),
            method: WilcoxonMethod::Exact,
            effective_n: n,
        });
    }

    let nf = n as f64;
    let mean = nf * (nf + 1.0) / 4.0;
    let tie_correction: f64 = tie_groups
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum::<f64>()
        / 48.0;
    let variance = nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0 - tie_correction;

    let p_value = if variance <= 0.0 {
        1.0
    } else {
        let z = (statistic - mean) / variance.sqrt();
        (2.0 * standard_normal()?.cdf(z)).min(1.0)
    };

    Ok(WilcoxonSignedRank {
        statistic,
        p_value,
        method: WilcoxonMethod::NormalApproximation,
        effective_n: n,
    })
}

/// |d| 的平均秩（从 1 开始），同时返回每个并列组的大小
fn rank_abs_with_ties(values: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[i].abs().total_cmp(&values[j].abs()));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_groups = Vec::new();
    let mut i = 0;
    while i < order.len() {
        let value = values[order[i]].abs();
        let mut j = i;
        while j < order.len() && values[order[j]].abs() == value {
            j += 1;
        }
        // 位置 i..j 共享秩 (i+1)..=j
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = avg_rank;
        }
        tie_groups.push(j - i);
        i = j;
    }
    (ranks, tie_groups)
}

/// 精确零分布下的双侧 p 值：2·P(W+ <= statistic)
fn exact_p_value(n: usize, statistic: f64) -> f64 {
    let max_sum = n * (n + 1) / 2;
    // counts[s] = 秩 1..=n 的子集中和为 s 的个数
    let mut counts = vec![0.0f64; max_sum + 1];
    counts[0] = 1.0;
    for rank in 1..=n {
        for s in (rank..=max_sum).rev() {
            counts[s] += counts[s - rank];
        }
    }

    let threshold = statistic.floor() as usize;
    let tail: f64 = counts.iter().take(threshold + 1).sum();
    let total = 2f64.powi(n as i32);
    (2.0 * tail / total).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_t_test_known_value() {
        // d = [-1, -2, -3, -4, -5]: t = -3 / (sqrt(2.5) / sqrt(5)) = -4.2426
        let result = paired_t_test(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
        assert_relative_eq!(result.statistic, -4.242640687, epsilon = 1e-6);
        assert_eq!(result.degrees_of_freedom, 4.0);
        assert!(result.p_value > 0.01 && result.p_value < 0.02, "p = {}", result.p_value);
    }

    #[test]
    fn test_t_test_no_difference() {
        let a = [0.81, 0.79, 0.83, 0.80];
        let result = paired_t_test(&a, &a).unwrap();
        assert_eq!(result.p_value, 1.0);
        assert_eq!(result.statistic, 0.0);
    }

    #[test]
    fn test_t_test_constant_shift() {
        let result = paired_t_test(&[1.0, 2.0, 3.0], &[0.5, 1.5, 2.5]).unwrap();
        assert_eq!(result.p_value, 0.0);
        assert!(result.statistic.is_infinite() && result.statistic > 0.0);
    }

    #[test]
    fn test_t_test_symmetric() {
        let a = [0.80, 0.82, 0.81, 0.85];
        let b = [0.60, 0.65, 0.62, 0.61];
        let ab = paired_t_test(&a, &b).unwrap();
        let ba = paired_t_test(&b, &a).unwrap();
        assert_eq!(ab.p_value, ba.p_value);
        assert_eq!(ab.statistic, -ba.statistic);
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            paired_t_test(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0, 4.0]),
            Err(StatsError::LengthMismatch { left: 3, right: 4 })
        );
        assert_eq!(
            wilcoxon_signed_rank(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0, 4.0]),
            Err(StatsError::LengthMismatch { left: 3, right: 4 })
        );
    }

    #[test]
    fn test_too_few_pairs() {
        assert_eq!(
            paired_t_test(&[1.0], &[2.0]),
            Err(StatsError::TooFewSamples { required: 2, actual: 1 })
        );
    }

    #[test]
    fn test_wilcoxon_exact_all_negative() {
        let result = wilcoxon_signed_rank(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
        assert_eq!(result.method, WilcoxonMethod::Exact);
        assert_eq!(result.statistic, 0.0);
        assert_relative_eq!(result.p_value, 2.0 / 32.0);
    }

    #[test]
    fn test_wilcoxon_exact_mixed_signs() {
        // d = [1, -2, 3, 4]: R+ = 8, R- = 2, T = 2
        // P(W+ <= 2) = |{}, {1}, {2}| / 16 = 3/16
        let result = wilcoxon_signed_rank(&[1.0, 0.0, 3.0, 4.0], &[0.0, 2.0, 0.0, 0.0]).unwrap();
        assert_eq!(result.statistic, 2.0);
        assert_relative_eq!(result.p_value, 6.0 / 16.0);
    }

    #[test]
    fn test_wilcoxon_symmetric() {
        let a = [0.80, 0.82, 0.81, 0.85, 0.79, 0.90];
        let b = [0.60, 0.85, 0.62, 0.61, 0.80, 0.70];
        let ab = wilcoxon_signed_rank(&a, &b).unwrap();
        let ba = wilcoxon_signed_rank(&b, &a).unwrap();
        assert_eq!(ab.p_value, ba.p_value);
        assert_eq!(ab.statistic, ba.statistic);
    }

    #[test]
    fn test_wilcoxon_ties_use_normal_approximation() {
        let result = wilcoxon_signed_rank(&[2.0, 3.0, 4.0, 5.0, 6.0], &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(result.method, WilcoxonMethod::NormalApproximation);
        assert_eq!(result.statistic, 0.0);
        assert!(result.p_value > 0.0 && result.p_value < 0.1);
    }

    #[test]
    fn test_wilcoxon_zero_differences_dropped() {
        let result = wilcoxon_signed_rank(&[1.0, 2.0, 5.0], &[1.0, 1.0, 2.0]).unwrap();
        assert_eq!(result.effective_n, 2);
        assert_eq!(result.method, WilcoxonMethod::NormalApproximation);
    }

    #[test]
    fn test_wilcoxon_identical_samples() {
        let a = [0.9, 0.8, 0.7];
        let result = wilcoxon_signed_rank(&a, &a).unwrap();
        assert_eq!(result.p_value, 1.0);
        assert_eq!(result.effective_n, 0);
    }

    #[test]
    fn test_rank_abs_with_ties() {
        let (ranks, ties) = rank_abs_with_ties(&[-1.0, 3.0, 1.0, 2.0]);
        assert_eq!(ranks, vec![1.5, 4.0, 1.5, 3.0]);
        assert_eq!(ties, vec![2, 1, 1]);
    }

    #[test]
    fn test_exact_distribution_sums_to_one() {
        // 最大统计量 n(n+1)/4 的双侧 p 值被截断为 1
        assert_eq!(exact_p_value(6, 10.5), 1.0);
        assert_relative_eq!(exact_p_value(3, 0.0), 2.0 / 8.0);
    }
}
