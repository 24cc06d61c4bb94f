use crate::models::signature::HyperparameterSignature;
use serde::Serialize;

/// 指向存储中某一次运行：完整的原始签名以及它在该签名下的序号
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RunRef {
    pub signature: HyperparameterSignature,
    pub run_index: usize,
}

/// 过滤后签名相同的一组运行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunGroup {
    pub key: HyperparameterSignature,
    // ————————————————————————————————————————————————————————————————————————
    // 每次运行归约后的标量，顺序与 members 一一对应
    // ————————————————————————————————————————————————————————————————————————
    pub samples: Vec<f64>,
    pub members: Vec<RunRef>,
}

impl RunGroup {
    pub fn new(key: HyperparameterSignature) -> Self {
        Self {
            key,
            samples: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// 单个模型组的正态性检验结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalityRecord {
    pub model: HyperparameterSignature,
    pub sample_count: usize,
    /// Shapiro-Wilk W 统计量
    pub statistic: f64,
    pub p_value: f64,
    pub is_normal: bool,
    /// 样本极差为零，检验退化，p 值固定为 1.0
    pub degenerate: bool,
}

/// 两个模型组之间的配对检验结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseTestResult {
    pub model1: HyperparameterSignature,
    pub model2: HyperparameterSignature,
    pub t_statistic: f64,
    pub t_p_value: f64,
    pub t_significant: bool,
    pub both_normal: bool,
    pub wilcoxon_statistic: f64,
    pub wilcoxon_p_value: f64,
    pub wilcoxon_significant: bool,
}

/// 一次配对统计比较的完整结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub metric: String,
    pub split: crate::models::DataSplit,
    pub significance_threshold: f64,
    pub normality: Vec<NormalityRecord>,
    pub pairwise: Vec<PairwiseTestResult>,
}

impl ComparisonReport {
    pub fn normality_of(&self, model: &HyperparameterSignature) -> Option<&NormalityRecord> {
        self.normality.iter().find(|record| &record.model == model)
    }

    pub fn pair(
        &self,
        model1: &HyperparameterSignature,
        model2: &HyperparameterSignature,
    ) -> Option<&PairwiseTestResult> {
        self.pairwise
            .iter()
            .find(|result| &result.model1 == model1 && &result.model2 == model2)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
