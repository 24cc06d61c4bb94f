use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 超参数值类型枚举，支持递归结构
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    // ————————————————————————————————————————————————————————————————————————
    // 基本参数值类型，包含字符串、数字、布尔值等基本类型
    // ————————————————————————————————————————————————————————————————————————
    Basic(BasicParameterValue),
    // ————————————————————————————————————————————————————————————————————————
    // 参数值列表类型，例如 devices: [0, 1]
    // ————————————————————————————————————————————————————————————————————————
    List(Vec<ParameterValue>),
}

/// 基本参数值类型
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BasicParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl BasicParameterValue {
    /// 变体的排序序号，不同类型之间按此排序
    fn rank(&self) -> u8 {
        match self {
            BasicParameterValue::Bool(_) => 0,
            BasicParameterValue::Int(_) => 1,
            BasicParameterValue::Float(_) => 2,
            BasicParameterValue::String(_) => 3,
        }
    }

    pub fn to_string_repr(&self) -> String {
        match self {
            BasicParameterValue::String(s) => s.clone(),
            BasicParameterValue::Float(n) => n.to_string(),
            BasicParameterValue::Int(n) => n.to_string(),
            BasicParameterValue::Bool(b) => b.to_string(),
        }
    }
}

// 浮点数按 total_cmp / to_bits 比较，保证分组键满足 Eq + Ord + Hash
impl Ord for BasicParameterValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (BasicParameterValue::Bool(a), BasicParameterValue::Bool(b)) => a.cmp(b),
            (BasicParameterValue::Int(a), BasicParameterValue::Int(b)) => a.cmp(b),
            (BasicParameterValue::Float(a), BasicParameterValue::Float(b)) => a.total_cmp(b),
            (BasicParameterValue::String(a), BasicParameterValue::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for BasicParameterValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for BasicParameterValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BasicParameterValue {}

impl Hash for BasicParameterValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            BasicParameterValue::Bool(b) => b.hash(state),
            BasicParameterValue::Int(i) => i.hash(state),
            BasicParameterValue::Float(f) => f.to_bits().hash(state),
            BasicParameterValue::String(s) => s.hash(state),
        }
    }
}

impl Ord for ParameterValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ParameterValue::Basic(a), ParameterValue::Basic(b)) => a.cmp(b),
            (ParameterValue::List(a), ParameterValue::List(b)) => a.cmp(b),
            (ParameterValue::Basic(_), ParameterValue::List(_)) => Ordering::Less,
            (ParameterValue::List(_), ParameterValue::Basic(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for ParameterValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ParameterValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ParameterValue {}

impl Hash for ParameterValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ParameterValue::Basic(basic) => {
                0u8.hash(state);
                basic.hash(state);
            }
            ParameterValue::List(list) => {
                1u8.hash(state);
                list.len().hash(state);
                for item in list {
                    item.hash(state);
                }
            }
        }
    }
}

/// 为BasicParameterValue实现Debug trait，使用Display的格式
impl fmt::Debug for BasicParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for BasicParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_repr())
    }
}

impl fmt::Debug for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Basic(basic_value) => write!(f, "{}", basic_value),
            ParameterValue::List(list) => {
                let items: Vec<String> = list.iter().map(|item| item.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Basic(BasicParameterValue::String(value.to_string()))
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::Basic(BasicParameterValue::String(value))
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Basic(BasicParameterValue::Float(value))
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Basic(BasicParameterValue::Int(value))
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Basic(BasicParameterValue::Bool(value))
    }
}

impl From<&BasicParameterValue> for JsonValue {
    fn from(val: &BasicParameterValue) -> Self {
        match val {
            BasicParameterValue::String(s) => JsonValue::String(s.clone()),
            BasicParameterValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            BasicParameterValue::Int(i) => JsonValue::Number((*i).into()),
            BasicParameterValue::Bool(b) => JsonValue::Bool(*b),
        }
    }
}

impl From<&ParameterValue> for JsonValue {
    fn from(val: &ParameterValue) -> Self {
        match val {
            ParameterValue::Basic(basic) => basic.into(),
            ParameterValue::List(list) => {
                JsonValue::Array(list.iter().map(|item| item.into()).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_basic_parameter_value_display() {
        assert_eq!(format!("{}", BasicParameterValue::String("adam".to_string())), "adam");
        assert_eq!(format!("{}", BasicParameterValue::Float(0.01)), "0.01");
        assert_eq!(format!("{}", BasicParameterValue::Int(42)), "42");
        assert_eq!(format!("{}", BasicParameterValue::Bool(true)), "true");
    }

    #[test]
    fn test_parameter_value_debug_list() {
        let list = ParameterValue::List(vec![
            ParameterValue::from(1i64),
            ParameterValue::from("two"),
            ParameterValue::from(3.5),
        ]);
        assert_eq!(format!("{:?}", list), "[1, two, 3.5]");
        assert_eq!(format!("{:?}", list), format!("{}", list));
    }

    #[test]
    fn test_float_equality_is_total() {
        let a = ParameterValue::from(f64::NAN);
        let b = ParameterValue::from(f64::NAN);
        assert_eq!(a, b);
        assert_ne!(ParameterValue::from(0.1), ParameterValue::from(0.2));
    }

    #[test]
    fn test_int_and_float_are_distinct_keys() {
        // 1 与 1.0 在 hparams 中是不同的写法，不合并
        assert_ne!(ParameterValue::from(1i64), ParameterValue::from(1.0));
    }

    #[test]
    fn test_hash_consistent_with_eq() {
        let mut set = HashSet::new();
        set.insert(ParameterValue::from(0.01));
        set.insert(ParameterValue::from(0.01));
        set.insert(ParameterValue::List(vec![ParameterValue::from(1i64)]));
        set.insert(ParameterValue::List(vec![ParameterValue::from(1i64)]));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_json_conversion() {
        let value = ParameterValue::List(vec![ParameterValue::from(true), ParameterValue::from(2i64)]);
        let json: JsonValue = (&value).into();
        assert_eq!(json, serde_json::json!([true, 2]));
    }
}
