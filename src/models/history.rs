use crate::models::signature::HyperparameterSignature;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 指标所在的数据划分
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSplit {
    Train,
    Validation,
    Test,
}

impl DataSplit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSplit::Train => "train",
            DataSplit::Validation => "validation",
            DataSplit::Test => "test",
        }
    }
}

impl fmt::Display for DataSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次训练运行的历史记录：(指标名, 数据划分) -> 按 epoch 排列的数值序列
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingRun {
    series: BTreeMap<(String, DataSplit), Vec<f64>>,
}

impl TrainingRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// 构建时添加一条指标序列，同名同划分的序列会被覆盖
    pub fn with_series(
        mut self,
        metric: impl Into<String>,
        split: DataSplit,
        values: impl Into<Vec<f64>>,
    ) -> Self {
        self.series.insert((metric.into(), split), values.into());
        self
    }

    /// 查询某个指标在某个划分上的序列
    pub fn history(&self, metric: &str, split: DataSplit) -> Option<&[f64]> {
        self.series
            .get(&(metric.to_string(), split))
            .map(Vec::as_slice)
    }

    pub fn metrics(&self) -> impl Iterator<Item = (&str, DataSplit)> {
        self.series.keys().map(|(name, split)| (name.as_str(), *split))
    }
}

/// 训练历史存储接口
///
/// 实现者按稳定顺序返回每个签名及其全部运行。配对检验依赖这个顺序：
/// 不同组中第 i 个样本被视为一一对应。
pub trait HistoryStore {
    fn histories(&self) -> Vec<(&HyperparameterSignature, &[TrainingRun])>;

    fn run_count(&self) -> usize {
        self.histories().iter().map(|(_, runs)| runs.len()).sum()
    }
}

/// 内存中的训练历史集合，按签名排序，同签名的运行保持插入顺序
#[derive(Debug, Clone, Default)]
pub struct ModelHistorySet {
    histories: BTreeMap<HyperparameterSignature, Vec<TrainingRun>>,
}

impl ModelHistorySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_run(&mut self, signature: HyperparameterSignature, run: TrainingRun) -> &mut Self {
        self.histories.entry(signature).or_default().push(run);
        self
    }

    pub fn runs(&self, signature: &HyperparameterSignature) -> &[TrainingRun] {
        self.histories
            .get(signature)
            .map(|runs| runs.as_slice())
            .unwrap_or(&[])
    }

    pub fn signature_count(&self) -> usize {
        self.histories.len()
    }
}

impl HistoryStore for ModelHistorySet {
    fn histories(&self) -> Vec<(&HyperparameterSignature, &[TrainingRun])> {
        self.histories
            .iter()
            .map(|(signature, runs)| (signature, runs.as_slice()))
            .collect()
    }
}

impl FromIterator<(HyperparameterSignature, TrainingRun)> for ModelHistorySet {
    fn from_iter<T: IntoIterator<Item = (HyperparameterSignature, TrainingRun)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (signature, run) in iter {
            set.add_run(signature, run);
        }
        set
    }
}
