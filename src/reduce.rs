//! 将每次运行的逐 epoch 指标序列归约为一个标量
//!
//! 引擎只在序列非空时调用归约函数。

/// 文档约定的默认归约：序列最大值（例如最佳验证准确率）
pub const DEFAULT_REDUCTION: fn(&[f64]) -> f64 = max;

/// 最大值，NaN 会被跳过；全部为 NaN 时返回 NaN
pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::max)
}

/// 最小值，例如最低验证损失
pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::min)
}

/// 最后一个 epoch 的值
pub fn last(values: &[f64]) -> f64 {
    values.last().copied().unwrap_or(f64::NAN)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
