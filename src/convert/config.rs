//! 转换配置模块
//!
//! 提供转换流程的配置管理功能，支持从YAML文件加载配置。

use crate::epub::error::{EpubError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "epub2md.yaml";

fn default_coverage_threshold() -> f64 {
    0.5
}

fn default_pandoc_path() -> String {
    "pandoc".to_string()
}

fn default_markdown_format() -> String {
    "gfm".to_string()
}

fn default_wrap() -> String {
    "none".to_string()
}

fn default_max_slug_length() -> usize {
    60
}

/// EPUB转Markdown的转换配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// 目录覆盖率阈值：目录覆盖的文件数低于(阅读顺序文件数×阈值)时
    /// 放弃目录，改用阅读顺序切分章节
    #[serde(default = "default_coverage_threshold")]
    pub coverage_threshold: f64,
    /// pandoc可执行文件路径
    #[serde(default = "default_pandoc_path")]
    pub pandoc_path: String,
    /// pandoc输出格式
    #[serde(default = "default_markdown_format")]
    pub markdown_format: String,
    /// pandoc换行策略
    #[serde(default = "default_wrap")]
    pub wrap: String,
    /// 输出文件名中标题片段的最大长度
    #[serde(default = "default_max_slug_length")]
    pub max_slug_length: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            coverage_threshold: default_coverage_threshold(),
            pandoc_path: default_pandoc_path(),
            markdown_format: default_markdown_format(),
            wrap: default_wrap(),
            max_slug_length: default_max_slug_length(),
        }
    }
}

impl ConvertConfig {
    /// 从指定的YAML文件中加载转换配置
    ///
    /// # 参数
    ///
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    ///
    /// * `Result<Self>` - 加载成功返回配置实例，失败返回错误
    ///
    /// # 示例
    ///
    /// ```rust,no_run
    /// use epub2md::convert::ConvertConfig;
    /// let config = ConvertConfig::from_file("epub2md.yaml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| EpubError::ConfigError(format!("无法读取配置文件: {}", e)))?;

        serde_yml::from_str(&content)
            .map_err(|e| EpubError::ConfigError(format!("配置文件格式错误: {}", e)))
    }

    /// 生成默认配置文件到当前目录
    ///
    /// 配置文件将生成为当前目录下的 `epub2md.yaml`
    ///
    /// # 返回值
    ///
    /// * `Result<()>` - 生成成功返回Ok，失败返回错误
    pub fn generate_default_config() -> Result<()> {
        let yaml_content = serde_yml::to_string(&Self::default())
            .map_err(|e| EpubError::ConfigError(format!("序列化配置失败: {}", e)))?;

        // 在YAML内容前添加注释说明
        let content_with_header = format!(
            "# epub2md 转换配置文件\n# coverage_threshold: 目录覆盖率阈值，低于该比例时改用阅读顺序\n# pandoc_path / markdown_format / wrap: pandoc调用参数\n# max_slug_length: 输出文件名中标题片段的最大长度\n\n{}",
            yaml_content
        );

        fs::write(DEFAULT_CONFIG_PATH, content_with_header)
            .map_err(|e| EpubError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConvertConfig::default();
        assert_eq!(config.coverage_threshold, 0.5);
        assert_eq!(config.pandoc_path, "pandoc");
        assert_eq!(config.markdown_format, "gfm");
        assert_eq!(config.wrap, "none");
        assert_eq!(config.max_slug_length, 60);
    }

    #[test]
    fn test_partial_yaml_uses_field_defaults() {
        let config: ConvertConfig = serde_yml::from_str("coverage_threshold: 0.8\n").unwrap();
        assert_eq!(config.coverage_threshold, 0.8);
        assert_eq!(config.markdown_format, "gfm");
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("epub2md.yaml");
        let yaml = serde_yml::to_string(&ConvertConfig::default()).unwrap();
        fs::write(&path, yaml).unwrap();

        let config = ConvertConfig::from_file(&path).unwrap();
        assert_eq!(config.pandoc_path, "pandoc");
    }

    #[test]
    fn test_from_file_missing() {
        assert!(ConvertConfig::from_file("不存在的配置.yaml").is_err());
    }

    #[test]
    fn test_from_file_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "coverage_threshold: [哦不]\n").unwrap();

        assert!(ConvertConfig::from_file(&path).is_err());
    }
}
