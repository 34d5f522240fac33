//! 本地偏好设置
//!
//! 记住上次使用的名字和主机地址，保存在用户配置目录下的 JSON 文件中。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 偏好设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// 上次使用的名字
    pub player_name: Option<String>,
    /// 上次加入的主机
    pub last_host: Option<String>,
    /// 上次使用的端口
    pub last_port: Option<u16>,
    /// 最近一次保存时间
    pub saved_at: Option<DateTime<Utc>>,
}

impl Preferences {
    /// 获取偏好文件路径
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("boggle");
            path.push("preferences.json");
            path
        })
    }

    /// 从默认位置加载，失败时使用默认值
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            tracing::warn!("无法获取配置目录，使用默认偏好");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// 从指定文件加载，失败时使用默认值
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("偏好文件不存在，使用默认偏好");
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(prefs) => {
                    tracing::info!("已加载偏好: {:?}", path);
                    prefs
                }
                Err(e) => {
                    tracing::warn!("偏好文件格式无效: {}，使用默认偏好", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("无法读取偏好文件: {}，使用默认偏好", e);
                Self::default()
            }
        }
    }

    /// 保存到默认位置
    pub fn save(&mut self) -> Result<()> {
        let path = Self::default_path().context("无法获取配置目录")?;
        self.save_to(&path)
    }

    /// 保存到指定文件
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {:?}", parent))?;
        }

        self.saved_at = Some(Utc::now());
        let content = serde_json::to_string_pretty(self).context("序列化偏好失败")?;
        std::fs::write(path, content)
            .with_context(|| format!("写入偏好文件失败: {:?}", path))?;

        tracing::info!("偏好已保存: {:?}", path);
        Ok(())
    }

    /// 记下一次成功加入
    pub fn remember_host(&mut self, address: &str) {
        match address.rsplit_once(':') {
            Some((host, port)) => {
                self.last_host = Some(host.to_string());
                self.last_port = port.parse().ok();
            }
            None => self.last_host = Some(address.to_string()),
        }
    }

    /// 上次加入的完整地址
    pub fn last_address(&self) -> Option<String> {
        let host = self.last_host.as_ref()?;
        Some(match self.last_port {
            Some(port) => format!("{}:{}", host, port),
            None => host.clone(),
        })
    }
}
