use crate::engine::validate_threshold;
use crate::models::ComparisonConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::warn;

pub fn load_config(config_path: impl AsRef<Path>) -> Result<ComparisonConfig> {
    let config_path = config_path.as_ref();
    // 检查配置文件是否存在，如果不存在则创建默认配置
    if !config_path.exists() {
        create_default_config(config_path)?;
        warn!(path = %config_path.display(), "config file not found, created default");
    }

    // 读取配置文件内容
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    // 解析TOML配置
    let config: ComparisonConfig = toml::from_str(&config_content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    validate_threshold(config.significance_threshold)
        .with_context(|| format!("Invalid config file: {}", config_path.display()))?;

    Ok(config)
}

fn create_default_config(config_path: &Path) -> Result<()> {
    let default_config = r#"# 分组时忽略的参数，也可以写成逗号分隔的字符串 "seed, fold"
filter_params = [
    "seed",
    "random_seed",
    "fold",
    "devices",
]

# p 值阈值：p >= 阈值视为正态，p < 阈值视为显著
significance_threshold = 0.01

# "unordered" 每个组对检验一次，"ordered" 检验所有有序组对
pair_mode = "unordered"

[plot]
width = 1200
height = 700
# bins = 20
kde_points = 200
"#;

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    fs::write(config_path, default_config)
        .with_context(|| format!("Failed to create default config file: {}", config_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_SIGNIFICANCE_THRESHOLD, PairMode};
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("compare.toml");

        let config = load_config(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.significance_threshold, DEFAULT_SIGNIFICANCE_THRESHOLD);
        assert_eq!(config.pair_mode, PairMode::Unordered);
        assert!(config.filter_params.contains("seed"));
        assert_eq!(config.plot.bins, None);

        // 再次加载时读取已有文件
        let again = load_config(&path).unwrap();
        assert_eq!(config, again);
    }

    #[test]
    fn test_existing_config_is_used() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("compare.toml");
        fs::write(&path, "filter_params = \"seed, fold\"\nsignificance_threshold = 0.05\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.significance_threshold, 0.05);
        assert_eq!(config.filter_params.len(), 2);
        assert!(config.filter_params.contains("fold"));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("compare.toml");
        fs::write(&path, "significance_threshold = 1.5\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_malformed_config_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("compare.toml");
        fs::write(&path, "significance_threshold = [").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
