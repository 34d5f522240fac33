//! 主机配置

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use protocol::{DiceSet, DEFAULT_ROUND_SECS};
use serde::{Deserialize, Serialize};

/// 主机配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// 使用的骰子组
    pub dice: DiceSet,
    /// 每轮时长（秒）
    pub round_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            dice: DiceSet::Classic,
            round_secs: DEFAULT_ROUND_SECS,
        }
    }
}

impl HostConfig {
    /// 从 JSON 解析，缺省字段取默认值
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("解析主机配置失败")?;
        if config.round_secs == 0 {
            anyhow::bail!("每轮时长必须大于 0");
        }
        Ok(config)
    }

    /// 从文件载入
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("读取文件失败: {:?}", path))?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = HostConfig::default();
        assert_eq!(config.dice, DiceSet::Classic);
        assert_eq!(config.round_secs, 180);
    }

    #[test]
    fn test_partial_json() {
        let config = HostConfig::from_json(r#"{ "dice": "Big" }"#).unwrap();
        assert_eq!(config.dice, DiceSet::Big);
        assert_eq!(config.round_secs, DEFAULT_ROUND_SECS);
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(HostConfig::from_json(r#"{ "round_secs": 0 }"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "dice": "Classic", "round_secs": 60 }}"#).unwrap();

        let config = HostConfig::load(file.path()).unwrap();
        assert_eq!(config.round_secs, 60);
    }
}
