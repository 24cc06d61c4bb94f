// models.rs - 作为模块目录入口文件（Rust 2018+ 风格）
// 导出所有子模块
pub mod config;
pub mod history;
pub mod parameter_value;
pub mod report;
pub mod signature;
pub mod utils;

// 重新导出常用类型，保持API一致性
pub use config::{ComparisonConfig, DEFAULT_SIGNIFICANCE_THRESHOLD, PairMode, PlotConfig};
pub use history::{DataSplit, HistoryStore, ModelHistorySet, TrainingRun};
pub use parameter_value::{BasicParameterValue, ParameterValue};
pub use report::{ComparisonReport, NormalityRecord, PairwiseTestResult, RunGroup, RunRef};
pub use signature::HyperparameterSignature;
pub use utils::deserialize_param_set;
