//! 转换流程模块
//!
//! 把结构解析和pandoc调用串联成完整的EPUB转Markdown流程：
//! 解包到临时目录，解析章节结构，逐章调用pandoc写出Markdown，
//! 最后整理图片引用。

pub mod config;
pub mod pandoc;

pub use config::{ConvertConfig, DEFAULT_CONFIG_PATH};
pub use pandoc::{Pandoc, PandocInput, LUA_FILTER};

use std::fs;
use std::path::{Path, PathBuf};

use crate::chapter::{resolve_chapters, ChapterSource};
use crate::epub::error::Result;
use crate::epub::{toc, Epub};

/// 转换结果汇总
#[derive(Debug, Default)]
pub struct ConvertReport {
    /// 成功写出的Markdown文件数
    pub converted: usize,
    /// 转换失败的章节(顺序号, 失败原因)
    pub failures: Vec<(usize, String)>,
    /// 提取出的图片文件数
    pub images: usize,
    /// 输出目录
    pub outdir: PathBuf,
}

/// EPUB转Markdown转换器
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    /// 创建转换器
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    /// 执行完整的转换流程
    ///
    /// # 参数
    ///
    /// * `epub_path` - EPUB文件路径
    /// * `outdir` - Markdown输出目录(不存在时创建)
    ///
    /// # 返回值
    ///
    /// * `Result<ConvertReport>` - 单章失败不会中断流程，只计入失败数；
    ///   整体失败(找不到pandoc、无任何章节等)返回错误
    pub fn convert(&self, epub_path: &Path, outdir: &Path) -> Result<ConvertReport> {
        let version = Pandoc::probe(&self.config.pandoc_path)?;
        println!("🔧 {}", version);

        fs::create_dir_all(outdir)?;
        let media_dir = outdir.join("images");
        fs::create_dir_all(&media_dir)?;
        fs::write(media_dir.join(".gitignore"), "*\n")?;

        // 解包到临时目录，作用域结束时自动清理
        let tmp = tempfile::tempdir()?;
        let mut epub = Epub::new(epub_path)?;
        epub.unpack_to(tmp.path())?;

        let plan = resolve_chapters(tmp.path(), self.config.coverage_threshold)?;
        if plan.toc_entry_count > 0 {
            println!("📖 目录提供了 {} 个条目", plan.toc_entry_count);
        }
        if plan.source == ChapterSource::Spine {
            if let Some((toc_files, spine_files)) = plan.coverage {
                println!(
                    "⚠️  目录只覆盖 {}/{} 个书脊文件，改用书脊顺序",
                    toc_files, spine_files
                );
            }
            println!("📖 按书脊顺序提取 {} 个文件", plan.chapters.len());
        }

        let pandoc = Pandoc::new(&self.config, tmp.path())?;
        let mut report = ConvertReport {
            outdir: outdir.to_path_buf(),
            ..Default::default()
        };

        for chapter in &plan.chapters {
            let slug = pandoc::slugify(&chapter.title, self.config.max_slug_length);
            let out_path = outdir.join(format!("{:02}-{}.md", chapter.order, slug));

            // 片段章节先截取HTML文本，截取失败时退回整文件
            let snippet = if chapter.is_whole_file() {
                None
            } else {
                let text = toc::read_text_lossy(&chapter.path).unwrap_or_default();
                let segment = crate::chapter::segment::extract_segment(
                    &text,
                    chapter.start_id.as_deref(),
                    chapter.end_id.as_deref(),
                );
                if matches!(segment.as_deref(), Some("")) {
                    println!("⚠️  章节 {:02} 的锚点区间为空: {}", chapter.order, chapter.title);
                }
                segment
            };

            let input = match &snippet {
                Some(text) => PandocInput::Snippet(text),
                None => PandocInput::File(&chapter.src),
            };

            match pandoc.render(&plan.base_dir, input, &media_dir, &out_path) {
                Ok(()) => {
                    pandoc::relocate_image_links(&out_path, &media_dir)?;
                    report.converted += 1;
                    println!("✓ {:02} {}", chapter.order, chapter.title);
                }
                Err(e) => {
                    eprintln!("✗ {} ({})", chapter.title, e);
                    report.failures.push((chapter.order, e.to_string()));
                }
            }
        }

        report.images = count_images(&media_dir);
        Ok(report)
    }
}

/// 统计图片目录下带扩展名的文件数(不含.gitignore)
fn count_images(media_dir: &Path) -> usize {
    fn walk(dir: &Path, count: &mut usize) {
        let Ok(entries) = fs::read_dir(dir) else { return };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(&path, count);
            } else if path.extension().is_some() {
                *count += 1;
            }
        }
    }

    let mut count = 0;
    walk(media_dir, &mut count);
    count
}
