//! 比较标量样本组所用的统计基础函数
//!
//! - **Shapiro-Wilk**：正态性检验，采用 Royston AS R94 近似
//! - **配对 t 检验**：基于逐对差值的参数检验
//! - **Wilcoxon 符号秩检验**：非参数配对检验，小样本使用精确分布
//! - **高斯核密度 / 直方图**：绘图用的分布摘要
//!
//! ## 参考文献
//!
//! - Royston, P. (1995). "Remark AS R94: A Remark on Algorithm AS 181: The
//!   W-test for Normality." *Applied Statistics*, 44(4), 547-551.
//! - Wilcoxon, F. (1945). "Individual Comparisons by Ranking Methods."
//!   *Biometrics Bulletin*, 1(6), 80-83.

#![allow(clippy::cast_precision_loss)] // 样本统计中的 usize -> f64 转换

pub mod density;
pub mod normality;
pub mod paired;

pub use density::{gaussian_kde, histogram, scott_bandwidth, sturges_bins};
pub use normality::{MAX_NORMALITY_SAMPLES, MIN_NORMALITY_SAMPLES, ShapiroWilk, shapiro_wilk};
pub use paired::{
    MIN_PAIRED_SAMPLES, PairedTTest, WilcoxonMethod, WilcoxonSignedRank, paired_t_test,
    wilcoxon_signed_rank,
};

use statrs::distribution::Normal;
use thiserror::Error;

/// 统计检验本身的错误，不含模型上下文，由引擎补充
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("needs at least {required} samples, got {actual}")]
    TooFewSamples { required: usize, actual: usize },

    #[error("paired samples differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("{0}")]
    Distribution(String),
}

pub type StatsResult<T> = std::result::Result<T, StatsError>;

/// 无偏样本方差（ddof = 1），少于两个样本时为 0
pub fn sample_variance(samples: &[f64]) -> f64 {
    let n = samples.len();
    if n < 2 {
        return 0.0;
    }
    let mean = crate::reduce::mean(samples);
    samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
}

pub(crate) fn standard_normal() -> StatsResult<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| StatsError::Distribution(e.to_string()))
}

/// 多项式求值：c[0] + c[1]·x + c[2]·x² + ...
pub(crate) fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sample_variance() {
        assert_relative_eq!(sample_variance(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2.5);
        assert_eq!(sample_variance(&[4.2]), 0.0);
        assert_eq!(sample_variance(&[0.9, 0.9, 0.9]), 0.0);
    }

    #[test]
    fn test_poly() {
        assert_eq!(poly(&[1.0, 2.0, 3.0], 2.0), 17.0);
        assert_eq!(poly(&[-2.273, 0.459], 0.0), -2.273);
        assert_eq!(poly(&[], 3.0), 0.0);
    }
}
