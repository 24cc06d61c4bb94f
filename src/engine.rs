use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use itertools::Itertools;
use tracing::{debug, info, warn};
use crate::error::{ComparisonError, Result};
use crate::models::{
    ComparisonConfig, ComparisonReport, DataSplit, HistoryStore, HyperparameterSignature,
    NormalityRecord, PairMode, PairwiseTestResult, RunGroup,
};
use crate::plot::{self, DistributionSeries};
use crate::run_grouping;
use crate::stats::{self, StatsError};

/// 正态性判断：p 值不低于阈值才视为正态
pub fn is_normal(p_value: f64, threshold: f64) -> bool {
    p_value >= threshold
}

/// 显著性判断：p 值低于阈值视为显著差异
pub fn is_significant(p_value: f64, threshold: f64) -> bool {
    p_value < threshold
}

/// 阈值必须位于 (0, 1)
pub fn validate_threshold(threshold: f64) -> Result<f64> {
    if threshold > 0.0 && threshold < 1.0 {
        Ok(threshold)
    } else {
        Err(ComparisonError::InvalidThreshold(threshold))
    }
}

/// 模型比较引擎
///
/// 借用一个训练历史存储，并持有一份比较配置。每次比较都从存储重新计算，
/// 调用之间只保留配置。
pub struct ModelComparisonEngine<'a, S: HistoryStore + ?Sized> {
    store: &'a S,
    config: ComparisonConfig,
}

impl<'a, S: HistoryStore + ?Sized> ModelComparisonEngine<'a, S> {
    /// 使用默认配置：不过滤参数，阈值 0.01
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            config: ComparisonConfig::default(),
        }
    }

    pub fn with_config(store: &'a S, config: ComparisonConfig) -> Result<Self> {
        validate_threshold(config.significance_threshold)?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    // ————————————————————————————————————————————————————————————————————————
    // 配置修改，均可链式调用
    // ————————————————————————————————————————————————————————————————————————

    pub fn set_filter_params<I, P>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.config.filter_params = params.into_iter().map(Into::into).collect::<BTreeSet<_>>();
        self
    }

    pub fn set_significance_threshold(&mut self, threshold: f64) -> Result<&mut Self> {
        self.config.significance_threshold = validate_threshold(threshold)?;
        Ok(self)
    }

    pub fn set_pair_mode(&mut self, mode: PairMode) -> &mut Self {
        self.config.pair_mode = mode;
        self
    }

    pub fn with_filter_params<I, P>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.set_filter_params(params);
        self
    }

    pub fn with_significance_threshold(mut self, threshold: f64) -> Result<Self> {
        self.set_significance_threshold(threshold)?;
        Ok(self)
    }

    // ————————————————————————————————————————————————————————————————————————
    // 比较操作
    // ————————————————————————————————————————————————————————————————————————

    /// 按过滤后的签名分组，每次运行归约为一个标量
    ///
    /// `reduce` 通常为 [`crate::reduce::DEFAULT_REDUCTION`]（序列最大值）。
    pub fn group_runs<F>(
        &self,
        metric: &str,
        split: DataSplit,
        reduce: F,
    ) -> Result<BTreeMap<HyperparameterSignature, RunGroup>>
    where
        F: Fn(&[f64]) -> f64,
    {
        let groups =
            run_grouping::group_runs(self.store, &self.config.filter_params, metric, split, reduce)?;
        info!(
            metric,
            %split,
            groups = groups.len(),
            runs = groups.values().map(RunGroup::len).sum::<usize>(),
            "grouped training runs"
        );
        Ok(groups)
    }

    /// 每个组的直方图和密度曲线数据
    pub fn distributions<F>(
        &self,
        metric: &str,
        split: DataSplit,
        reduce: F,
    ) -> Result<Vec<DistributionSeries>>
    where
        F: Fn(&[f64]) -> f64,
    {
        let groups = self.group_runs(metric, split, reduce)?;
        Ok(plot::build_distributions(&groups, &self.config.plot))
    }

    /// 将所有组的分布叠加绘制到一张 SVG 图上
    pub fn plot_distributions<F>(
        &self,
        metric: &str,
        split: DataSplit,
        reduce: F,
        out_path: &Path,
    ) -> Result<()>
    where
        F: Fn(&[f64]) -> f64,
    {
        let series = self.distributions(metric, split, reduce)?;
        let title = format!("{}_{}", split, metric);
        plot::render_distributions(&series, &title, out_path, &self.config.plot)
    }

    /// 对每个组做正态性检验，并对组对做配对 t 检验和 Wilcoxon 符号秩检验
    ///
    /// 不同组中第 i 个样本被视为一对，因此各组样本数必须相同。
    pub fn paired_statistical_test<F>(
        &self,
        metric: &str,
        split: DataSplit,
        reduce: F,
    ) -> Result<ComparisonReport>
    where
        F: Fn(&[f64]) -> f64,
    {
        let threshold = self.config.significance_threshold;
        let groups = self.group_runs(metric, split, reduce)?;

        let normality = groups
            .values()
            .map(|group| self.normality_record(group, threshold))
            .collect::<Result<Vec<_>>>()?;
        let normal_by_model: BTreeMap<&HyperparameterSignature, bool> = normality
            .iter()
            .map(|record| (&record.model, record.is_normal))
            .collect();

        let pairs: Vec<(&RunGroup, &RunGroup)> = match self.config.pair_mode {
            PairMode::Unordered => groups.values().tuple_combinations().collect(),
            PairMode::Ordered => groups
                .values()
                .cartesian_product(groups.values())
                .filter(|(a, b)| a.key != b.key)
                .collect(),
        };

        let pairwise = pairs
            .into_iter()
            .map(|(group1, group2)| {
                let both_normal = normal_by_model[&group1.key] && normal_by_model[&group2.key];
                compare_pair(group1, group2, both_normal, threshold)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            metric,
            %split,
            models = normality.len(),
            pairs = pairwise.len(),
            significant = pairwise.iter().filter(|p| p.t_significant || p.wilcoxon_significant).count(),
            "paired statistical comparison finished"
        );

        Ok(ComparisonReport {
            metric: metric.to_string(),
            split,
            significance_threshold: threshold,
            normality,
            pairwise,
        })
    }

    fn normality_record(&self, group: &RunGroup, threshold: f64) -> Result<NormalityRecord> {
        let result = stats::shapiro_wilk(&group.samples)
            .map_err(|e| from_stats_error(e, "Shapiro-Wilk test", &group.key))?;
        if result.degenerate {
            warn!(group = %group.key, "samples have zero range, normality p-value set to 1.0");
        }
        if group.len() > stats::MAX_NORMALITY_SAMPLES {
            warn!(group = %group.key, samples = group.len(), "Shapiro-Wilk p-value may be inaccurate for more than 5000 samples");
        }
        debug!(group = %group.key, w = result.statistic, p = result.p_value, "normality test");

        Ok(NormalityRecord {
            model: group.key.clone(),
            sample_count: group.len(),
            statistic: result.statistic,
            p_value: result.p_value,
            is_normal: is_normal(result.p_value, threshold),
            degenerate: result.degenerate,
        })
    }
}

fn compare_pair(
    group1: &RunGroup,
    group2: &RunGroup,
    both_normal: bool,
    threshold: f64,
) -> Result<PairwiseTestResult> {
    if group1.len() != group2.len() {
        return Err(ComparisonError::MismatchedSampleCount {
            model1: group1.key.clone(),
            model2: group2.key.clone(),
            left: group1.len(),
            right: group2.len(),
        });
    }

    let t_test = stats::paired_t_test(&group1.samples, &group2.samples)
        .map_err(|e| from_stats_error(e, "paired t-test", &group1.key))?;
    let wilcoxon = stats::wilcoxon_signed_rank(&group1.samples, &group2.samples)
        .map_err(|e| from_stats_error(e, "Wilcoxon signed-rank test", &group1.key))?;
    debug!(
        model1 = %group1.key,
        model2 = %group2.key,
        t_p = t_test.p_value,
        wilcoxon_p = wilcoxon.p_value,
        "paired tests"
    );

    Ok(PairwiseTestResult {
        model1: group1.key.clone(),
        model2: group2.key.clone(),
        t_statistic: t_test.statistic,
        t_p_value: t_test.p_value,
        t_significant: is_significant(t_test.p_value, threshold),
        both_normal,
        wilcoxon_statistic: wilcoxon.statistic,
        wilcoxon_p_value: wilcoxon.p_value,
        wilcoxon_significant: is_significant(wilcoxon.p_value, threshold),
    })
}

fn from_stats_error(err: StatsError, test: &'static str, model: &HyperparameterSignature) -> ComparisonError {
    match err {
        StatsError::TooFewSamples { required, actual } => ComparisonError::InsufficientSamples {
            test,
            model: model.clone(),
            required,
            actual,
        },
        // 组对的长度在 compare_pair 中已经检查过，这里只有单个模型可用
        StatsError::LengthMismatch { left, right } => ComparisonError::Distribution(format!(
            "{test} for {{{model}}}: sample lengths differ ({left} vs {right})"
        )),
        StatsError::Distribution(message) => ComparisonError::Distribution(message),
    }
}
