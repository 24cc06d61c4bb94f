// src/yaml_parser.rs
use std::collections::BTreeMap;
use anyhow::{Context, Result};
use crate::models::{ParameterValue, BasicParameterValue};

/// 解析 hparams 文本（YAML，JSON 是其子集）为扁平的参数映射
// ————————————————————————————————————————————————————————————————————————
// 核心解析函数
// ————————————————————————————————————————————————————————————————————————
pub fn parse_hparams_str(contents: &str) -> Result<BTreeMap<String, ParameterValue>> {
    let yaml_value: serde_yaml::Value = serde_yaml::from_str(contents)
        .context("Failed to parse hparams YAML")?;

    let mut result = BTreeMap::new();
    flatten_yaml_value(&yaml_value, &mut result, String::new())?;
    Ok(result)
}

/// 解析 JSON 格式的 hparams，先转换为 YAML 值再复用同一套扁平化规则
pub fn parse_hparams_json(value: &serde_json::Value) -> Result<BTreeMap<String, ParameterValue>> {
    let yaml_value = convert_json_to_yaml(value.clone());
    let mut result = BTreeMap::new();
    flatten_yaml_value(&yaml_value, &mut result, String::new())?;
    Ok(result)
}

// ————————————————————————————————————————————————————————————————————————
// 递归扁平化函数：处理路径拼接
// ————————————————————————————————————————————————————————————————————————
fn flatten_yaml_value(
    value: &serde_yaml::Value,
    output: &mut BTreeMap<String, ParameterValue>,
    path: String,
) -> Result<()> {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, val) in map {
                let key_str = key.as_str()
                    .ok_or_else(|| anyhow::anyhow!("Non-string key in mapping: {:?}", key))?;
                let new_path = if path.is_empty() { key_str.to_string() } else { format!("{}-{}", path, key_str) };
                flatten_yaml_value(val, output, new_path)?;
            }
        }

        serde_yaml::Value::Sequence(seq) => {
            // 纯标量列表保留为单个参数
            if seq.iter().all(|v| matches!(v, serde_yaml::Value::String(_) | serde_yaml::Value::Number(_) | serde_yaml::Value::Bool(_))) {
                let list: Result<Vec<ParameterValue>> = seq
                    .iter().map(base_value_to_parameter_value).collect();
                output.insert(path, ParameterValue::List(list?));
            } else {
                // 复杂列表项（映射或嵌套列表）按下标递归展开
                for (i, item) in seq.iter().enumerate() {
                    let item_path = format!("{}-{}", path, i);
                    flatten_yaml_value(item, output, item_path)?;
                }
            }
        }

        serde_yaml::Value::Tagged(tagged) => {
            flatten_yaml_value(&tagged.value, output, path)?;
        }

        serde_yaml::Value::Null => {}

        _ => {
            if path.is_empty() {
                anyhow::bail!("hparams document must be a mapping, got {:?}", value);
            }
            output.insert(path, base_value_to_parameter_value(value)?);
        }
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————
// 将 serde_yaml::Value 标量转换为 ParameterValue
// ————————————————————————————————————————————————————————————————————————
fn base_value_to_parameter_value(value: &serde_yaml::Value) -> Result<ParameterValue> {
    match value {
        serde_yaml::Value::String(s) => Ok(ParameterValue::Basic(BasicParameterValue::String(s.clone()))),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(ParameterValue::Basic(BasicParameterValue::Int(i)))
            } else if let Some(f) = n.as_f64() {
                Ok(ParameterValue::Basic(BasicParameterValue::Float(f)))
            } else {
                Err(anyhow::anyhow!("Unsupported number format in YAML"))
            }
        }
        serde_yaml::Value::Bool(b) => Ok(ParameterValue::Basic(BasicParameterValue::Bool(*b))),
        _ => Err(anyhow::anyhow!("Unexpected YAML value type: {:?}", value)),
    }
}

/// 将serde_json::Value转换为serde_yaml::Value
fn convert_json_to_yaml(json_value: serde_json::Value) -> serde_yaml::Value {
    match json_value {
        serde_json::Value::Null => serde_yaml::Value::Null,
        serde_json::Value::Bool(b) => serde_yaml::Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_yaml::Value::Number(serde_yaml::Number::from(i))
            } else if let Some(f) = n.as_f64() {
                serde_yaml::Value::Number(serde_yaml::Number::from(f))
            } else {
                serde_yaml::Value::String(n.to_string())
            }
        },
        serde_json::Value::String(s) => serde_yaml::Value::String(s),
        serde_json::Value::Array(arr) => serde_yaml::Value::Sequence(
            arr.into_iter().map(convert_json_to_yaml).collect()
        ),
        serde_json::Value::Object(obj) => {
            let mut mapping = serde_yaml::Mapping::new();
            for (k, v) in obj {
                mapping.insert(serde_yaml::Value::String(k), convert_json_to_yaml(v));
            }
            serde_yaml::Value::Mapping(mapping)
        }
    }
}
