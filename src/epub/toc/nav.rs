//! EPUB3语义导航文档解析模块
//!
//! 解析manifest中标记为`nav`的XHTML导航文档，把嵌套列表结构按
//! 文档顺序展平为目录条目序列。

use crate::epub::error::{EpubError, Result};
use crate::epub::toc::entry::TocEntry;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// 一个`<nav>`区域的解析结果
#[derive(Debug)]
struct NavRegion {
    /// type属性是否包含"toc"标记
    is_toc: bool,
    /// 按文档顺序展平的条目
    entries: Vec<TocEntry>,
}

/// 解析导航文档
///
/// 选择type属性包含`toc`的`<nav>`区域，没有显式标记时使用文档中
/// 第一个`<nav>`。XML格式错误一律吸收为空结果。
///
/// # 参数
/// * `xml_content` - 导航文档的内容
///
/// # 返回值
/// * `Vec<TocEntry>` - 展平后的目录条目(可能为空)
pub fn parse(xml_content: &str) -> Vec<TocEntry> {
    parse_xml(xml_content).unwrap_or_default()
}

fn parse_xml(xml_content: &str) -> Result<Vec<TocEntry>> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(false);
    reader.config_mut().expand_empty_elements = true;

    let mut regions: Vec<NavRegion> = Vec::new();
    let mut buf = Vec::new();

    // 解析状态：只在<nav>内部有效
    let mut nav_depth = 0usize;
    let mut list_depth = 0usize;
    // 每层<li>一个标记：该列表项是否已经消费过第一个链接
    let mut li_stack: Vec<bool> = Vec::new();
    let mut current_href: Option<String> = None;
    let mut link_text = String::new();
    let mut in_link = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                match e.local_name().as_ref() {
                    b"nav" => {
                        if nav_depth == 0 {
                            regions.push(NavRegion {
                                is_toc: nav_type_is_toc(e)?,
                                entries: Vec::new(),
                            });
                            list_depth = 0;
                            li_stack.clear();
                            in_link = false;
                        }
                        nav_depth += 1;
                    }
                    b"ol" | b"ul" if nav_depth > 0 => {
                        list_depth += 1;
                    }
                    b"li" if nav_depth > 0 && list_depth > 0 => {
                        li_stack.push(false);
                    }
                    b"a" if nav_depth > 0 => {
                        // 每个列表项只取第一个链接，没有href的链接也算消费掉。
                        // 链接归属于包含它的最内层<li>：父项自己没有直接链接、
                        // 只有子列表里有时，父项不产出条目，链接只记给子项，
                        // 不会重复。
                        if let Some(consumed) = li_stack.last_mut() {
                            if !*consumed {
                                *consumed = true;
                                current_href = link_href(e)?;
                                link_text.clear();
                                in_link = true;
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => {
                match e.local_name().as_ref() {
                    b"nav" => {
                        nav_depth = nav_depth.saturating_sub(1);
                    }
                    b"ol" | b"ul" if nav_depth > 0 => {
                        list_depth = list_depth.saturating_sub(1);
                    }
                    b"li" if nav_depth > 0 => {
                        li_stack.pop();
                    }
                    b"a" if in_link => {
                        in_link = false;
                        if let (Some(href), Some(region)) = (current_href.take(), regions.last_mut()) {
                            if let Some(entry) = TocEntry::from_href(&link_text, &href) {
                                region.entries.push(entry);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(e) => {
                if in_link {
                    link_text.push_str(&e.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // 优先使用标记为toc的区域，否则退回第一个区域
    let chosen = regions.iter()
        .position(|r| r.is_toc)
        .or(if regions.is_empty() { None } else { Some(0) });

    Ok(chosen.map(|i| regions.swap_remove(i).entries).unwrap_or_default())
}

/// 检查nav元素的type属性(任意命名空间前缀)是否包含toc标记
fn nav_type_is_toc(e: &quick_xml::events::BytesStart) -> Result<bool> {
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
        if attr.key.local_name().as_ref() == b"type" {
            let value = String::from_utf8_lossy(&attr.value);
            if value.contains("toc") {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// 读取链接的href属性，空值视为无效
fn link_href(e: &quick_xml::events::BytesStart) -> Result<Option<String>> {
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
        if attr.key.local_name().as_ref() == b"href" {
            let value = String::from_utf8_lossy(&attr.value).to_string();
            return Ok(if value.is_empty() { None } else { Some(value) });
        }
    }
    Ok(None)
}
