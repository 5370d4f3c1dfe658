use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 编辑请求参数
///
/// 参数名到参数值的映射，序列化为扁平的 JSON 对象：
///
/// ```json
/// { "action": "edit", "title": "Foo", "appendtext": "..." }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditRequest {
    params: BTreeMap<String, String>,
}

impl EditRequest {
    /// 创建空请求
    pub fn new() -> Self {
        Self::default()
    }

    /// 从键值对构造请求
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// 获取参数值，不存在时返回空字符串
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.params.remove(key)
    }

    /// 请求的 action 参数
    pub fn action(&self) -> Option<&str> {
        self.get("action")
    }

    /// 是否为编辑请求
    pub fn is_edit(&self) -> bool {
        self.action() == Some("edit")
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// 按参数名顺序迭代
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
