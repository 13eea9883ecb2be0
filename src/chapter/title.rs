//! 章节标题推断模块
//!
//! 书脊回退产生的章节没有目录标题，从文件内容的标题元素推断。

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::path::Path;

use crate::epub::toc::read_text_lossy;

/// 标题候选选择器，按优先级排列(h1优先于h2优先于h3)
static HEADING_SELECTORS: Lazy<[Selector; 3]> = Lazy::new(|| {
    [
        Selector::parse("h1").unwrap(),
        Selector::parse("h2").unwrap(),
        Selector::parse("h3").unwrap(),
    ]
});

/// 推断章节标题
///
/// 扫描文件中第一个一级/二级/三级标题元素并剥离内部标记；找不到
/// 标题时退回文件名(去掉扩展名)。文件不可读也走文件名回退，这个
/// 函数永远不会失败。
///
/// # 参数
/// * `path` - 章节文件路径
///
/// # 返回值
/// * `String` - 推断出的标题
pub fn infer(path: &Path) -> String {
    extract_heading(path).unwrap_or_else(|| file_stem(path))
}

/// 提取文件中第一个非空标题元素的纯文本
fn extract_heading(path: &Path) -> Option<String> {
    let text = read_text_lossy(path)?;
    let document = Html::parse_document(&text);

    for selector in HEADING_SELECTORS.iter() {
        if let Some(element) = document.select(selector).next() {
            // 拼接文本节点并折叠空白，等效于剥离内部标记
            let heading = element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            if !heading.is_empty() {
                return Some(heading);
            }
        }
    }
    None
}

/// 文件基本名(去掉扩展名)，最后的兜底
fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string())
}
