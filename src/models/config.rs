use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 默认显著性阈值
pub const DEFAULT_SIGNIFICANCE_THRESHOLD: f64 = 0.01;

/// 比较配置，既可以在代码中构建，也可以从 TOML 加载
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// 分组时忽略的参数名
    #[serde(deserialize_with = "crate::models::utils::deserialize_param_set")]
    pub filter_params: BTreeSet<String>,
    /// p 值阈值，同时用于正态性判断和显著性判断
    pub significance_threshold: f64,
    pub pair_mode: PairMode,
    pub plot: PlotConfig,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            filter_params: BTreeSet::new(),
            significance_threshold: DEFAULT_SIGNIFICANCE_THRESHOLD,
            pair_mode: PairMode::default(),
            plot: PlotConfig::default(),
        }
    }
}

/// 模型组两两配对的方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairMode {
    /// 每个无序组对只检验一次
    #[default]
    Unordered,
    /// 检验所有有序组对，(A, B) 与 (B, A) 各出现一次
    Ordered,
}

/// 分布图配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    /// 直方图箱数，未设置时按 Sturges 规则计算
    pub bins: Option<usize>,
    /// 密度曲线的采样点数
    pub kde_points: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 700,
            bins: None,
            kde_points: 200,
        }
    }
}
