// src/lib.rs
//! 训练运行比较：按超参数签名分组，归约指标序列，并做正态性与配对显著性检验。
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod plot;
pub mod reduce;
pub mod renderer;
pub mod run_grouping;
pub mod stats;
pub mod yaml_parser;

pub use config::load_config;
pub use engine::{ModelComparisonEngine, is_normal, is_significant};
pub use error::{ComparisonError, Result};
pub use models::*;
pub use plot::DistributionSeries;
pub use reduce::DEFAULT_REDUCTION;
pub use renderer::TableRenderer;
