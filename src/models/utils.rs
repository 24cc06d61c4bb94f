use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;

#[derive(Deserialize)]
#[serde(untagged)]
enum ParamSetRepr {
    List(Vec<String>),
    Joined(String),
}

/// 反序列化参数名集合，既接受列表，也接受逗号分隔的字符串
///
/// # 参数
/// - `deserializer`: 用于反序列化的serde反序列化器
///
/// # 返回值
/// 去除空白和空项后的参数名集合
pub fn deserialize_param_set<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = match ParamSetRepr::deserialize(deserializer)? {
        ParamSetRepr::List(list) => list,
        ParamSetRepr::Joined(joined) => joined.split(',').map(|s| s.to_string()).collect(),
    };
    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}
