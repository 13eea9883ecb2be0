pub mod error;
pub mod archive;
pub mod container;
pub mod opf;
pub mod toc;

// 重新导出错误处理
pub use error::{EpubError, Result};

// 重新导出EPUB读取器
pub use archive::Epub;

// 重新导出容器相关
pub use container::{Container, RootFile};

// 重新导出OPF相关
pub use opf::{Opf, ManifestItem, SpineItem};

// 重新导出目录相关
pub use toc::{Toc, TocEntry};

use percent_encoding::percent_decode_str;

/// 对URL编码的路径进行解码
///
/// EPUB中的href可能包含%20之类的URL编码，与磁盘上的文件名对不上，
/// 统一在这里解码。无效的编码序列按lossy处理。
pub fn unquote(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("text/chapter%201.xhtml"), "text/chapter 1.xhtml");
        assert_eq!(unquote("普通路径.xhtml"), "普通路径.xhtml");
        assert_eq!(unquote("%E7%AB%A0.xhtml"), "章.xhtml");
    }
}
