//! NCX（Navigation Control file for XML）解析模块
//!
//! 把NCX文件中的navPoint元素按声明顺序展平为目录条目。嵌套的navPoint
//! 按文档顺序(先父后子)产出，不按playOrder重新排序。

use crate::epub::error::{EpubError, Result};
use crate::epub::toc::entry::TocEntry;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// 单个navPoint的解析进度
#[derive(Debug, Default)]
struct NavPointFrame {
    /// navLabel下第一个text元素的内容
    label: Option<String>,
    /// content元素的src属性
    src: Option<String>,
    /// 是否已产出条目
    emitted: bool,
}

/// 解析NCX文件内容
///
/// 缺少text或content子元素、或href文件部分为空的navPoint被跳过。
/// XML格式错误一律吸收为空结果。
///
/// # 参数
/// * `xml_content` - NCX文件的XML内容
///
/// # 返回值
/// * `Vec<TocEntry>` - 按声明顺序排列的目录条目(可能为空)
pub fn parse(xml_content: &str) -> Vec<TocEntry> {
    parse_xml(xml_content).unwrap_or_default()
}

fn parse_xml(xml_content: &str) -> Result<Vec<TocEntry>> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);
    reader.config_mut().expand_empty_elements = true;

    let mut entries = Vec::new();
    let mut buf = Vec::new();

    let mut stack: Vec<NavPointFrame> = Vec::new();
    let mut in_nav_label = false;
    let mut capturing_text = false;
    let mut text_content = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                match e.local_name().as_ref() {
                    b"navPoint" => {
                        stack.push(NavPointFrame::default());
                    }
                    b"navLabel" if !stack.is_empty() => {
                        in_nav_label = true;
                    }
                    b"text" if in_nav_label => {
                        capturing_text = true;
                        text_content.clear();
                    }
                    b"content" if !stack.is_empty() => {
                        let src = parse_content_src(e)?;
                        if let Some(frame) = stack.last_mut() {
                            if frame.src.is_none() && !src.is_empty() {
                                frame.src = Some(src);
                            }
                        }
                        try_emit(&mut stack, &mut entries);
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => {
                match e.local_name().as_ref() {
                    b"navPoint" => {
                        stack.pop();
                    }
                    b"navLabel" => {
                        in_nav_label = false;
                        try_emit(&mut stack, &mut entries);
                    }
                    b"text" if capturing_text => {
                        capturing_text = false;
                        if let Some(frame) = stack.last_mut() {
                            if frame.label.is_none() {
                                frame.label = Some(text_content.trim().to_string());
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(e) => {
                if capturing_text {
                    text_content.push_str(&e.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

/// 当前navPoint的标签和内容都齐全时，立即按文档顺序产出条目
///
/// 产出点必须在子navPoint开始之前，这样父条目才排在子条目前面。
fn try_emit(stack: &mut [NavPointFrame], entries: &mut Vec<TocEntry>) {
    if let Some(frame) = stack.last_mut() {
        if !frame.emitted {
            if let (Some(label), Some(src)) = (&frame.label, &frame.src) {
                if let Some(entry) = TocEntry::from_href(label, src) {
                    entries.push(entry);
                }
                frame.emitted = true;
            }
        }
    }
}

/// 解析content元素的src属性
fn parse_content_src(e: &quick_xml::events::BytesStart) -> Result<String> {
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
        if attr.key.local_name().as_ref() == b"src" {
            return Ok(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    Ok(String::new())
}
