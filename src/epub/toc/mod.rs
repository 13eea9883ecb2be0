//! 目录提取模块
//!
//! 此模块负责从EPUB包中提取目录结构。两种来源按顺序尝试，第一个
//! 产出非空结果的胜出：
//!
//! 1. EPUB3语义导航文档(manifest中带`nav`属性的条目)
//! 2. NCX导航控制文件(spine的toc引用，或清单中的NCX媒体类型)
//!
//! 两种来源都失败时返回空结果，提示调用方回退到书脊顺序。

pub mod entry;
pub mod nav;
pub mod ncx;

pub use entry::TocEntry;

use crate::epub::opf::Opf;
use std::path::{Path, PathBuf};

/// 目录提取结果
///
/// `base_dir`是条目中相对路径的解析基准(导航文档所在目录)。
#[derive(Debug)]
pub struct Toc {
    pub base_dir: PathBuf,
    pub entries: Vec<TocEntry>,
}

/// 从EPUB包中提取目录
///
/// # 参数
/// * `opf_dir` - OPF文件所在目录
/// * `opf` - 解析后的OPF信息
///
/// # 返回值
/// * `Option<Toc>` - 非空目录；两种来源都为空时返回`None`
pub fn extract(opf_dir: &Path, opf: &Opf) -> Option<Toc> {
    // 先尝试EPUB3导航文档
    if let Some(href) = opf.nav_href() {
        let nav_path = opf_dir.join(&href);
        if let Some(content) = read_text_lossy(&nav_path) {
            let entries = nav::parse(&content);
            if !entries.is_empty() {
                return Some(Toc {
                    base_dir: parent_dir(&nav_path),
                    entries,
                });
            }
        }
    }

    // 再尝试NCX
    if let Some(href) = opf.ncx_href() {
        let ncx_path = opf_dir.join(&href);
        if let Some(content) = read_text_lossy(&ncx_path) {
            let entries = ncx::parse(&content);
            if !entries.is_empty() {
                return Some(Toc {
                    base_dir: parent_dir(&ncx_path),
                    entries,
                });
            }
        }
    }

    None
}

/// 尽力读取整个文本文件，无效UTF-8按lossy处理，失败返回`None`
pub fn read_text_lossy(path: &Path) -> Option<String> {
    std::fs::read(path)
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}
