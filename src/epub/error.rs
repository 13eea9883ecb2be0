use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpubError>;

/// Epub相关的错误类型
///
/// 注意：结构解析层的错误（container.xml、OPF、导航文档）不会穿透到
/// 调用方，它们在各自的组件内被吸收为空值/默认值。真正会向用户报告的
/// 只有`NoContent`和pandoc相关的错误。
#[derive(Error, Debug)]
pub enum EpubError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("Zip文件错误: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML解析错误: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("配置文件错误: {0}")]
    ConfigError(String),

    #[error("没有找到目录或书脊，无法提取任何章节")]
    NoContent,

    #[error("未找到pandoc: {0}")]
    PandocNotFound(String),

    #[error("pandoc转换失败: {0}")]
    PandocFailed(String),
}
