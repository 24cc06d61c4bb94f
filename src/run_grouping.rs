// src/run_grouping.rs
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use crate::error::{ComparisonError, Result};
use crate::models::{DataSplit, HistoryStore, HyperparameterSignature, RunGroup, RunRef};

/// 将训练运行按过滤后的签名分组，并把每次运行归约为一个标量
///
/// 遍历顺序与存储返回的顺序一致，因此同一组内样本的顺序是确定的。
/// 每次运行恰好进入一个组。缺失或为空的指标序列、归约结果非有限值都会
/// 直接返回错误，不会跳过。
pub fn group_runs<S, F>(
    store: &S,
    filter_params: &BTreeSet<String>,
    metric: &str,
    split: DataSplit,
    reduce: F,
) -> Result<BTreeMap<HyperparameterSignature, RunGroup>>
where
    S: HistoryStore + ?Sized,
    F: Fn(&[f64]) -> f64,
{
    let mut groups: BTreeMap<HyperparameterSignature, RunGroup> = BTreeMap::new();

    for (signature, runs) in store.histories() {
        // 过滤签名，被忽略的参数不参与分组
        let key = signature.filtered(filter_params);

        for (run_index, run) in runs.iter().enumerate() {
            let series = run.history(metric, split).ok_or_else(|| ComparisonError::MetricNotFound {
                metric: metric.to_string(),
                split,
                signature: signature.clone(),
                run_index,
            })?;

            if series.is_empty() {
                return Err(ComparisonError::EmptySeries {
                    metric: metric.to_string(),
                    split,
                    signature: signature.clone(),
                    run_index,
                });
            }

            let value = reduce(series);
            if !value.is_finite() {
                return Err(ComparisonError::NonFiniteSample {
                    value,
                    signature: signature.clone(),
                    run_index,
                });
            }

            let group = groups
                .entry(key.clone())
                .or_insert_with(|| RunGroup::new(key.clone()));
            group.samples.push(value);
            group.members.push(RunRef {
                signature: signature.clone(),
                run_index,
            });
        }
    }

    for group in groups.values() {
        debug!(group = %group.key, samples = group.len(), "grouped runs");
    }

    Ok(groups)
}
