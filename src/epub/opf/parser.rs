//! OPF解析器模块
//!
//! 提供OPF（Open Packaging Format）文件的XML解析功能。

use crate::epub::error::{EpubError, Result};
use crate::epub::opf::{manifest::ManifestItem, spine::SpineItem};
use crate::epub::unquote;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::path::Path;

/// OPF文件解析结果
#[derive(Debug, Clone, Default)]
pub struct Opf {
    /// 清单项(文件列表)
    pub manifest: HashMap<String, ManifestItem>,
    /// 清单项ID的声明顺序，扫描清单时以此为准，保证结果确定
    pub manifest_order: Vec<String>,
    /// 脊柱(阅读顺序)
    pub spine: Vec<SpineItem>,
    /// 脊柱的目录引用
    pub spine_toc: Option<String>,
}

impl Opf {
    /// 解析OPF文件内容
    ///
    /// # 参数
    /// * `xml_content` - OPF文件的XML内容
    ///
    /// # 返回值
    /// * `Result<Opf, EpubError>` - 解析后的OPF信息
    pub fn parse_xml(xml_content: &str) -> Result<Opf> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut manifest = HashMap::new();
        let mut manifest_order = Vec::new();
        let mut spine = Vec::new();
        let mut spine_toc = None;

        let mut buf = Vec::new();
        let mut current_section = String::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref());

                    match local_name.as_ref() {
                        "manifest" => {
                            current_section = "manifest".to_string();
                        }
                        "spine" => {
                            current_section = "spine".to_string();
                            spine_toc = Self::parse_spine_toc(e)?;
                        }
                        "item" if current_section == "manifest" => {
                            Self::parse_manifest_item(e, &mut manifest, &mut manifest_order)?;
                        }
                        "itemref" if current_section == "spine" => {
                            Self::parse_spine_item(e, &mut spine)?;
                        }
                        _ => {}
                    }
                }
                Event::End(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref());

                    if matches!(local_name.as_ref(), "manifest" | "spine") {
                        current_section.clear();
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Opf {
            manifest,
            manifest_order,
            spine,
            spine_toc,
        })
    }

    /// 从磁盘加载并解析OPF文件
    ///
    /// 文件不可读或XML格式错误时返回空的Opf（空清单、无脊柱），
    /// 让调用方的回退逻辑继续运行，而不是中断整个流程。
    ///
    /// # 参数
    /// * `path` - OPF文件路径
    pub fn load(path: &Path) -> Opf {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| Self::parse_xml(&content).ok())
            .unwrap_or_default()
    }

    /// 解析spine元素的toc属性
    fn parse_spine_toc(e: &quick_xml::events::BytesStart) -> Result<Option<String>> {
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            if attr.key.local_name().as_ref() == b"toc" {
                return Ok(Some(String::from_utf8_lossy(&attr.value).to_string()));
            }
        }
        Ok(None)
    }

    /// 解析清单项
    fn parse_manifest_item(
        e: &quick_xml::events::BytesStart,
        manifest: &mut HashMap<String, ManifestItem>,
        manifest_order: &mut Vec<String>,
    ) -> Result<()> {
        let mut item = ManifestItem {
            id: String::new(),
            href: String::new(),
            media_type: String::new(),
            properties: None,
        };

        // 解析item属性
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|e| EpubError::XmlError(quick_xml::Error::InvalidAttr(e)))?;
            match attr.key.local_name().as_ref() {
                b"id" => {
                    item.id = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"href" => {
                    item.href = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"media-type" => {
                    item.media_type = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"properties" => {
                    item.properties = Some(String::from_utf8_lossy(&attr.value).to_string());
                }
                _ => {}
            }
        }

        // 没有id的条目直接丢弃；重复id只保留最后一个，顺序记第一次出现
        if !item.id.is_empty() {
            if !manifest.contains_key(&item.id) {
                manifest_order.push(item.id.clone());
            }
            manifest.insert(item.id.clone(), item);
        }

        Ok(())
    }

    /// 解析脊柱项
    fn parse_spine_item(
        e: &quick_xml::events::BytesStart,
        spine: &mut Vec<SpineItem>,
    ) -> Result<()> {
        let mut spine_item = SpineItem {
            idref: String::new(),
            linear: true,
        };

        // 解析itemref属性
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|e| EpubError::XmlError(quick_xml::Error::InvalidAttr(e)))?;
            match attr.key.local_name().as_ref() {
                b"idref" => {
                    spine_item.idref = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"linear" => {
                    let linear_value = String::from_utf8_lossy(&attr.value);
                    spine_item.linear = linear_value != "no";
                }
                _ => {}
            }
        }

        if !spine_item.idref.is_empty() {
            spine.push(spine_item);
        }

        Ok(())
    }

    /// 按声明顺序遍历清单项
    fn items_in_order(&self) -> impl Iterator<Item = &ManifestItem> {
        self.manifest_order.iter().filter_map(|id| self.manifest.get(id))
    }

    /// 获取EPUB3语义导航文档的路径
    ///
    /// 多个条目都带nav属性时，取清单中最先声明的那个。
    ///
    /// # 返回值
    /// * `Option<String>` - 导航文档相对于OPF的路径
    pub fn nav_href(&self) -> Option<String> {
        self.items_in_order()
            .find(|item| item.is_nav() && !item.href.is_empty())
            .map(|item| item.href.clone())
    }

    /// 获取NCX导航控制文件的路径
    ///
    /// 优先使用spine的toc属性引用的清单项；引用无效时，退而扫描清单中
    /// 第一个声明的NCX媒体类型条目。
    ///
    /// # 返回值
    /// * `Option<String>` - NCX文件相对于OPF的路径
    pub fn ncx_href(&self) -> Option<String> {
        let from_spine = self.spine_toc.as_ref()
            .and_then(|idref| self.manifest.get(idref));
        let item = from_spine
            .or_else(|| self.items_in_order().find(|item| item.is_ncx()))?;

        if item.href.is_empty() {
            None
        } else {
            Some(item.href.clone())
        }
    }

    /// 获取书脊声明的阅读顺序(HTML类内容文档的相对路径)
    ///
    /// 按书脊声明顺序解析idref；清单中不存在的idref跳过，不视为错误。
    /// 路径经过URL解码。
    ///
    /// # 返回值
    /// * `Vec<String>` - 内容文档路径列表
    pub fn reading_order(&self) -> Vec<String> {
        self.spine.iter()
            .filter_map(|spine_item| self.manifest.get(&spine_item.idref))
            .filter(|item| !item.href.is_empty() && item.is_document())
            .map(|item| unquote(&item.href))
            .collect()
    }
}
