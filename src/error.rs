use crate::models::{DataSplit, HyperparameterSignature};
use thiserror::Error;

/// 比较操作的错误类型
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("metric '{metric}' ({split}) not found in run {run_index} of model {{{signature}}}")]
    MetricNotFound {
        metric: String,
        split: DataSplit,
        signature: HyperparameterSignature,
        run_index: usize,
    },

    #[error("metric '{metric}' ({split}) is empty in run {run_index} of model {{{signature}}}")]
    EmptySeries {
        metric: String,
        split: DataSplit,
        signature: HyperparameterSignature,
        run_index: usize,
    },

    #[error("reduction produced non-finite value {value} for run {run_index} of model {{{signature}}}")]
    NonFiniteSample {
        value: f64,
        signature: HyperparameterSignature,
        run_index: usize,
    },

    #[error("paired test between {{{model1}}} ({left} samples) and {{{model2}}} ({right} samples) needs equal sample counts")]
    MismatchedSampleCount {
        model1: HyperparameterSignature,
        model2: HyperparameterSignature,
        left: usize,
        right: usize,
    },

    #[error("{test} for {{{model}}} needs at least {required} samples, got {actual}")]
    InsufficientSamples {
        test: &'static str,
        model: HyperparameterSignature,
        required: usize,
        actual: usize,
    },

    #[error("significance threshold must be in (0, 1), got {0}")]
    InvalidThreshold(f64),

    #[error("distribution error: {0}")]
    Distribution(String),

    #[error("plot error: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, ComparisonError>;
