//! 章节模块
//!
//! 章节是结构解析引擎的输出单位：从目录条目或书脊路径创建，经过
//! 锚点范围解析后交给渲染环节。

pub mod builder;
pub mod fragment;
pub mod segment;
pub mod title;

pub use builder::{resolve_chapters, ChapterPlan, ChapterSource};

use std::path::PathBuf;

/// 解析完成的章节
#[derive(Debug, Clone)]
pub struct Chapter {
    /// 最终输出顺序(从1开始，连续)
    pub order: usize,
    /// 标题
    pub title: String,
    /// 目标文件的相对路径(相对于导航基准目录)
    pub src: String,
    /// 文档内锚点(可选)
    pub fragment: Option<String>,
    /// 目标文件的完整路径(已确认存在)
    pub path: PathBuf,
    /// 解析出的起始锚点
    pub start_id: Option<String>,
    /// 解析出的结束锚点
    pub end_id: Option<String>,
}

impl Chapter {
    /// 创建新章节，锚点范围留待后续解析
    pub fn new(order: usize, title: String, src: String, fragment: Option<String>, path: PathBuf) -> Self {
        Self {
            order,
            title,
            src,
            fragment,
            path,
            start_id: None,
            end_id: None,
        }
    }

    /// 起止锚点都缺席时，章节对应整个文件
    pub fn is_whole_file(&self) -> bool {
        self.start_id.is_none() && self.end_id.is_none()
    }
}
