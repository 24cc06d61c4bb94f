use super::{StatsError, StatsResult, poly, standard_normal};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::FRAC_1_SQRT_2;

/// Shapiro-Wilk 检验所需的最少样本数
pub const MIN_NORMALITY_SAMPLES: usize = 3;

/// 超过该样本数时 p 值近似不再可靠（仍会计算）
pub const MAX_NORMALITY_SAMPLES: usize = 5000;

/// 相对极差低于该值时视为常数样本
const RELATIVE_RANGE_TOLERANCE: f64 = 1e-10;
const TH: f64 = 0.375;

const G: [f64; 2] = [-2.273, 0.459];
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];

/// Shapiro-Wilk 检验结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapiroWilk {
    pub statistic: f64,
    pub p_value: f64,
    /// 样本极差可以忽略：W 与 p 均定义为 1.0
    pub degenerate: bool,
}

/// Shapiro-Wilk 正态性检验
///
/// p 值低说明样本不太可能来自正态分布。极差相对样本量级可以忽略
/// （只差浮点舍入）时不做检验，返回 `W = 1.0, p = 1.0` 并标记 `degenerate`。
pub fn shapiro_wilk(samples: &[f64]) -> StatsResult<ShapiroWilk> {
    let n = samples.len();
    if n < MIN_NORMALITY_SAMPLES {
        return Err(StatsError::TooFewSamples {
            required: MIN_NORMALITY_SAMPLES,
            actual: n,
        });
    }

    let mut x = samples.to_vec();
    x.sort_by(f64::total_cmp);

    let range = x[n - 1] - x[0];
    if !range.is_finite() {
        return Err(StatsError::Distribution(format!(
            "samples must be finite, range is {}",
            range
        )));
    }
    let magnitude = x[0].abs().max(x[n - 1].abs()).max(1.0);
    if range <= RELATIVE_RANGE_TOLERANCE * magnitude {
        return Ok(ShapiroWilk {
            statistic: 1.0,
            p_value: 1.0,
            degenerate: true,
        });
    }

    let a = coefficients(n)?;
    let half = a.len();
    // 先以最小值为原点按极差缩放，避免大量级样本减均值时丢失精度
    let scaled: Vec<f64> = x.iter().map(|xi| (xi - x[0]) / range).collect();
    let mean = scaled.iter().sum::<f64>() / n as f64;

    // W 为排序样本与反对称系数向量的相关系数平方
    let (mut ssa, mut ssx, mut sax) = (0.0, 0.0, 0.0);
    for (i, xi) in scaled.iter().enumerate() {
        let coefficient = if i < half {
            -a[i]
        } else if n - 1 - i < half {
            a[n - 1 - i]
        } else {
            0.0
        };
        let centered = xi - mean;
        ssa += coefficient * coefficient;
        ssx += centered * centered;
        sax += coefficient * centered;
    }

    // w1 = 1 - W，单独计算以减少 W 接近 1 时的舍入误差
    let ssassx = (ssa * ssx).sqrt();
    // W 的理论下界为 n·a1² / (n - 1)
    let w_min = n as f64 * a[0] * a[0] / (ssa * (n - 1) as f64);
    let w1 = ((ssassx - sax) * (ssassx + sax) / (ssa * ssx)).clamp(0.0, 1.0 - w_min);
    let statistic = 1.0 - w1;

    Ok(ShapiroWilk {
        statistic,
        p_value: p_value(n, statistic, w1)?,
        degenerate: false,
    })
}

/// 计算上半部分的权重系数 a[0..n/2]，a[0] 对应极差两端
fn coefficients(n: usize) -> StatsResult<Vec<f64>> {
    let half = n / 2;
    if n == 3 {
        return Ok(vec![FRAC_1_SQRT_2]);
    }

    let normal = standard_normal()?;
    let an = n as f64;
    let an25 = an + 0.25;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal.inverse_cdf((i as f64 - TH) / an25))
        .collect();

    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let mut a = vec![0.0; half];
    let (first_scaled, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        a[1] = a2;
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };
    a[0] = a1;
    for i in first_scaled..half {
        a[i] = -m[i] / fac;
    }
    Ok(a)
}

fn p_value(n: usize, w: f64, w1: f64) -> StatsResult<f64> {
    if n == 3 {
        // 精确分布
        const PI6: f64 = 6.0 / std::f64::consts::PI;
        const STQR: f64 = std::f64::consts::FRAC_PI_3;
        let p = PI6 * (w.sqrt().asin() - STQR);
        return Ok(p.clamp(0.0, 1.0));
    }
    if w1 <= 0.0 {
        return Ok(1.0);
    }

    let an = n as f64;
    let mut y = w1.ln();
    let (m, s) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            return Ok(1e-99);
        }
        y = -(gamma - y).ln();
        (poly(&C3, an), poly(&C4, an).exp())
    } else {
        let xx = an.ln();
        (poly(&C5, xx), poly(&C6, xx).exp())
    };

    let dist = Normal::new(m, s).map_err(|e| StatsError::Distribution(e.to_string()))?;
    Ok(dist.sf(y).clamp(0.0, 1.0))
}
