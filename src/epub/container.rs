use crate::epub::error::{EpubError, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::path::{Path, PathBuf};

/// Container.xml的固定路径（相对于解压后的根目录）
const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Container.xml中的rootfile信息
#[derive(Debug, Clone)]
pub struct RootFile {
    pub full_path: String,
    pub media_type: String,
}

/// Container.xml的解析结果
#[derive(Debug, Clone)]
pub struct Container {
    pub rootfiles: Vec<RootFile>,
}

impl Container {
    /// 解析container.xml内容
    ///
    /// # 参数
    /// * `xml_content` - container.xml的文件内容
    ///
    /// # 返回值
    /// * `Result<Container, EpubError>` - 解析后的Container信息
    pub fn parse_xml(xml_content: &str) -> Result<Container> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut rootfiles = Vec::new();
        let mut buf = Vec::new();
        let mut in_rootfiles = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let local_name = e.local_name();
                    match local_name.as_ref() {
                        b"rootfiles" => {
                            in_rootfiles = true;
                        }
                        b"rootfile" if in_rootfiles => {
                            let mut full_path = String::new();
                            let mut media_type = String::new();

                            // 解析属性
                            for attr_result in e.attributes() {
                                let attr = attr_result.map_err(|e| EpubError::XmlError(quick_xml::Error::InvalidAttr(e)))?;
                                match attr.key.local_name().as_ref() {
                                    b"full-path" => {
                                        full_path = String::from_utf8_lossy(&attr.value).to_string();
                                    }
                                    b"media-type" => {
                                        media_type = String::from_utf8_lossy(&attr.value).to_string();
                                    }
                                    _ => {}
                                }
                            }

                            if !full_path.is_empty() {
                                rootfiles.push(RootFile {
                                    full_path,
                                    media_type,
                                });
                            }
                        }
                        _ => {}
                    }
                }
                Event::End(ref e) => {
                    if e.local_name().as_ref() == b"rootfiles" {
                        in_rootfiles = false;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Container { rootfiles })
    }

    /// 获取主要的OPF文件路径
    ///
    /// # 返回值
    /// * `Option<String>` - OPF文件的完整路径
    pub fn opf_path(&self) -> Option<String> {
        // 查找第一个application/oebps-package+xml类型的rootfile
        for rootfile in &self.rootfiles {
            if rootfile.media_type == "application/oebps-package+xml" {
                return Some(rootfile.full_path.clone());
            }
        }

        // 如果没有找到标准类型，返回第一个rootfile
        self.rootfiles.first().map(|rf| rf.full_path.clone())
    }
}

/// 在解压后的EPUB根目录中定位OPF文件
///
/// 注册文件缺失、XML格式错误、没有rootfile指针、指向的文件不存在，
/// 这些情况一律返回`None`，绝不作为致命错误向上传播。
///
/// # 参数
/// * `root` - 解压后的EPUB根目录
///
/// # 返回值
/// * `Option<PathBuf>` - OPF文件的完整路径
pub fn locate(root: &Path) -> Option<PathBuf> {
    let content = std::fs::read_to_string(root.join(CONTAINER_PATH)).ok()?;
    let container = Container::parse_xml(&content).ok()?;
    let opf = root.join(container.opf_path()?);
    if opf.exists() { Some(opf) } else { None }
}
