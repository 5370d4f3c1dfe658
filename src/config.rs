use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::gate::BypassPolicy;
use crate::rewriter::TrimOrder;
use crate::utils::ModerationError;

/// 审核配置
///
/// 缺失的字段使用默认值，因此覆盖文件只需要写出要修改的部分。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// 跳过审核的用户和用户组
    pub bypass: BypassPolicy,
    /// 章节改写时去除末尾空白的时机
    pub trim_order: TrimOrder,
}

impl ModerationConfig {
    /// 加载内置的默认配置
    pub fn embedded() -> Result<Self, ModerationError> {
        let json_data = include_str!("../data/default_config.json");
        Ok(serde_json::from_str(json_data)?)
    }

    /// 从 JSON 文件加载配置
    pub fn load(path: &Path) -> Result<Self, ModerationError> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        tracing::debug!(path = %path.display(), "loaded moderation config");
        Ok(config)
    }

    /// 有覆盖文件时加载覆盖文件，否则使用内置配置
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self, ModerationError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::embedded(),
        }
    }
}
