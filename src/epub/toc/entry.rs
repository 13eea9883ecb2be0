//! 目录条目模块
//!
//! 定义两种目录格式解析后的统一条目结构。

use crate::epub::unquote;

/// 标题为空时使用的占位符
pub const UNTITLED: &str = "untitled";

/// 目录条目
///
/// 条目顺序就是源导航结构的文档顺序，也是最终章节的规范顺序。
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// 标题(可能是占位符)
    pub title: String,
    /// 目标文件路径(相对路径，已URL解码)
    pub source: String,
    /// 文档内锚点(可选)
    pub fragment: Option<String>,
}

impl TocEntry {
    /// 从href构建目录条目
    ///
    /// href在第一个`#`处拆分为文件路径和片段锚点，空片段视为无锚点，
    /// 文件路径为空时整个条目无效。标题为空白时使用占位符。
    ///
    /// # 参数
    /// * `title` - 链接文本
    /// * `href` - 链接目标
    ///
    /// # 返回值
    /// * `Option<TocEntry>` - 有效时返回条目
    pub fn from_href(title: &str, href: &str) -> Option<TocEntry> {
        let (file_part, fragment) = match href.split_once('#') {
            Some((file, frag)) => (file, Some(frag)),
            None => (href, None),
        };
        if file_part.is_empty() {
            return None;
        }

        let title = title.trim();
        Some(TocEntry {
            title: if title.is_empty() { UNTITLED.to_string() } else { title.to_string() },
            source: unquote(file_part),
            fragment: fragment.filter(|f| !f.is_empty()).map(|f| f.to_string()),
        })
    }
}
