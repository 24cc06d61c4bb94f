use crate::models::parameter_value::ParameterValue;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 超参数签名：参数名到参数值的有序映射，作为分组键使用
///
/// 键有序存储，因此相等性、排序和哈希与插入顺序无关。
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HyperparameterSignature {
    params: BTreeMap<String, ParameterValue>,
}

impl HyperparameterSignature {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式添加参数
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParameterValue>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.params.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterValue)> {
        self.params.iter()
    }

    /// 去掉过滤集合中的参数，返回新的签名
    pub fn filtered(&self, filter_params: &BTreeSet<String>) -> Self {
        self.params
            .iter()
            .filter(|(key, _)| !filter_params.contains(*key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// 从 hparams.yaml 文本构建签名，嵌套键以 `-` 连接
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(crate::yaml_parser::parse_hparams_str(contents)?.into_iter().collect())
    }

    /// 从 JSON 文档构建签名，规则与 YAML 相同
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self> {
        Ok(crate::yaml_parser::parse_hparams_json(value)?.into_iter().collect())
    }
}

impl FromIterator<(String, ParameterValue)> for HyperparameterSignature {
    fn from_iter<T: IntoIterator<Item = (String, ParameterValue)>>(iter: T) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for HyperparameterSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            return write!(f, "(all)");
        }
        let items: Vec<String> = self
            .params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        write!(f, "{}", items.join(", "))
    }
}

impl fmt::Debug for HyperparameterSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self)
    }
}
