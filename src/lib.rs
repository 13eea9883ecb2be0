pub mod chapter;
pub mod convert;
pub mod epub;

// === 核心API重新导出 ===

/// EPUB压缩包读取器
pub use epub::Epub;

/// 错误处理
pub use epub::{EpubError, Result};

/// 转换器（主要接口）
pub use convert::{ConvertConfig, ConvertReport, Converter};

// === 数据结构 ===

/// 章节信息
pub use chapter::{Chapter, ChapterPlan, ChapterSource};

/// 目录条目
pub use epub::{Toc, TocEntry};

// === 底层组件（高级用法） ===

/// 容器组件
pub use epub::{Container, RootFile};

/// OPF组件
pub use epub::{ManifestItem, Opf, SpineItem};

/// 结构解析入口
pub use chapter::resolve_chapters;

// === 库信息 ===

/// epub2md库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// epub2md库的描述
pub const DESCRIPTION: &str = "把EPUB电子书转换为按章节切分的Markdown文件";

// === 便捷函数 ===

/// 用默认配置转换一本EPUB
///
/// 这是 `Converter::convert` 的便捷包装函数。
///
/// # 参数
/// * `epub_path` - EPUB文件路径
/// * `outdir` - Markdown输出目录
///
/// # 返回值
/// * `Result<ConvertReport>` - 转换结果汇总
///
/// # 示例
///
/// ```rust,no_run
/// use std::path::Path;
///
/// let report = epub2md::convert(Path::new("book.epub"), Path::new("book"))?;
/// println!("共转换 {} 章", report.converted);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn convert(epub_path: &std::path::Path, outdir: &std::path::Path) -> Result<ConvertReport> {
    Converter::new(ConvertConfig::default()).convert(epub_path, outdir)
}
