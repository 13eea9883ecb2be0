//! 章节构建与覆盖度裁决模块
//!
//! 把目录条目或书脊顺序转换为最终的章节序列。目录对书脊内容文件的
//! 覆盖度不足时，整体退回书脊顺序(标题从文件内容推断)。

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::chapter::{fragment, title, Chapter};
use crate::epub::error::{EpubError, Result};
use crate::epub::opf::Opf;
use crate::epub::{container, toc};

/// 最终章节序列的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterSource {
    /// 目录(导航文档或NCX)
    Toc,
    /// 书脊声明顺序
    Spine,
}

/// 结构解析的完整结果
#[derive(Debug)]
pub struct ChapterPlan {
    /// 章节相对路径的解析基准目录
    pub base_dir: PathBuf,
    /// 最终章节序列(order从1开始连续)
    pub chapters: Vec<Chapter>,
    /// 序列来源
    pub source: ChapterSource,
    /// 目录条目总数(用于诊断输出)
    pub toc_entry_count: usize,
    /// 触发书脊回退时观察到的覆盖情况(目录文件数, 书脊文件数)
    pub coverage: Option<(usize, usize)>,
}

/// 解析EPUB的章节结构
///
/// 流程：定位OPF → 提取目录与书脊 → 覆盖度裁决 → 锚点范围解析。
///
/// # 参数
/// * `root` - 解压后的EPUB根目录
/// * `coverage_threshold` - 覆盖度阈值(默认0.5)，目录引用的文件数
///   严格小于`阈值 × 书脊文件数`时放弃目录
///
/// # 返回值
/// * `Result<ChapterPlan>` - 目录和书脊都无法产出章节时返回`NoContent`
pub fn resolve_chapters(root: &Path, coverage_threshold: f64) -> Result<ChapterPlan> {
    let opf_path = container::locate(root);
    let opf = opf_path.as_deref().map(Opf::load).unwrap_or_default();
    let opf_dir = opf_path
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());

    let toc = toc::extract(&opf_dir, &opf);
    let spine_files = opf.reading_order();

    let toc_entry_count = toc.as_ref().map(|t| t.entries.len()).unwrap_or(0);
    let mut coverage = None;
    let mut use_spine = toc.is_none();

    let mut base_dir = opf_dir.clone();
    let mut chapters = Vec::new();

    if let Some(toc) = &toc {
        chapters = build_from_toc(toc);
        base_dir = toc.base_dir.clone();

        // 覆盖度裁决：目录引用的物理文件不足书脊的一半时视为不可靠
        let toc_files = distinct_files(chapters.iter().map(|ch| ch.path.clone()));
        let spine_resolved = distinct_files(
            spine_files.iter().map(|sf| opf_dir.join(sf)).filter(|p| p.exists()),
        );
        if !spine_resolved.is_empty()
            && (toc_files.len() as f64) < (spine_resolved.len() as f64) * coverage_threshold
        {
            coverage = Some((toc_files.len(), spine_resolved.len()));
            use_spine = true;
        }
    }

    if use_spine {
        base_dir = opf_dir.clone();
        chapters = build_from_spine(&opf_dir, &spine_files);
        if chapters.is_empty() {
            return Err(EpubError::NoContent);
        }
    }

    if chapters.is_empty() {
        return Err(EpubError::NoContent);
    }

    // 丢弃无效候选后重新编号，保证最终顺序从1开始连续
    for (i, chapter) in chapters.iter_mut().enumerate() {
        chapter.order = i + 1;
    }

    fragment::resolve(&mut chapters);

    Ok(ChapterPlan {
        base_dir,
        chapters,
        source: if use_spine { ChapterSource::Spine } else { ChapterSource::Toc },
        toc_entry_count,
        coverage,
    })
}

/// 从目录条目构建候选章节
///
/// 只保留HTML类目标且文件实际存在的条目，其余静默丢弃。
fn build_from_toc(toc: &toc::Toc) -> Vec<Chapter> {
    let mut chapters = Vec::new();
    for (i, entry) in toc.entries.iter().enumerate() {
        if !is_html_path(&entry.source) {
            continue;
        }
        let path = toc.base_dir.join(&entry.source);
        if !path.exists() {
            continue;
        }
        chapters.push(Chapter::new(
            i + 1,
            entry.title.clone(),
            entry.source.clone(),
            entry.fragment.clone(),
            path,
        ));
    }
    chapters
}

/// 从书脊顺序构建章节，标题从文件内容推断
fn build_from_spine(spine_dir: &Path, spine_files: &[String]) -> Vec<Chapter> {
    let mut chapters = Vec::new();
    for (i, src) in spine_files.iter().enumerate() {
        let path = spine_dir.join(src);
        if !path.exists() {
            continue;
        }
        chapters.push(Chapter::new(
            i + 1,
            title::infer(&path),
            src.clone(),
            None,
            path,
        ));
    }
    chapters
}

/// 目标文件是否为HTML类文档
fn is_html_path(src: &str) -> bool {
    src.ends_with(".xhtml") || src.ends_with(".html") || src.ends_with(".htm")
}

/// 把路径集合归一化去重，符号链接等通过canonicalize折叠
fn distinct_files<I: IntoIterator<Item = PathBuf>>(paths: I) -> HashSet<PathBuf> {
    paths
        .into_iter()
        .map(|p| std::fs::canonicalize(&p).unwrap_or(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// 搭建一个最小的解压后EPUB目录
    ///
    /// `toc_targets`是NCX引用的文件，`spine_targets`是书脊引用的文件，
    /// 两者都会被写入磁盘(除非出现在`missing`中)。
    fn build_fixture(
        root: &Path,
        toc_targets: &[(&str, &str)],
        spine_targets: &[&str],
        missing: &[&str],
    ) {
        fs::create_dir_all(root.join("META-INF")).unwrap();
        fs::create_dir_all(root.join("OEBPS")).unwrap();

        fs::write(
            root.join("META-INF/container.xml"),
            r#"<container xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
<rootfiles><rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles>
</container>"#,
        )
        .unwrap();

        let mut manifest = String::new();
        let mut spine = String::new();
        for (i, target) in spine_targets.iter().enumerate() {
            manifest.push_str(&format!(
                r#"<item id="c{}" href="{}" media-type="application/xhtml+xml"/>"#,
                i, target
            ));
            spine.push_str(&format!(r#"<itemref idref="c{}"/>"#, i));
        }
        if !toc_targets.is_empty() {
            manifest.push_str(r#"<item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>"#);
        }

        fs::write(
            root.join("OEBPS/content.opf"),
            format!(
                r#"<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
<manifest>{}</manifest>
<spine{}>{}</spine>
</package>"#,
                manifest,
                if toc_targets.is_empty() { "" } else { r#" toc="ncx""# },
                spine
            ),
        )
        .unwrap();

        if !toc_targets.is_empty() {
            let mut nav_points = String::new();
            for (i, (label, src)) in toc_targets.iter().enumerate() {
                nav_points.push_str(&format!(
                    r#"<navPoint id="np{}"><navLabel><text>{}</text></navLabel><content src="{}"/></navPoint>"#,
                    i, label, src
                ));
            }
            fs::write(
                root.join("OEBPS/toc.ncx"),
                format!(
                    r#"<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/"><navMap>{}</navMap></ncx>"#,
                    nav_points
                ),
            )
            .unwrap();
        }

        let mut written = HashSet::new();
        for target in spine_targets.iter().copied()
            .chain(toc_targets.iter().map(|(_, src)| src.split('#').next().unwrap()))
        {
            if missing.contains(&target) || !written.insert(target.to_string()) {
                continue;
            }
            let path = root.join("OEBPS").join(target);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(
                &path,
                format!("<html><body><h1>{}的标题</h1><p>内容</p></body></html>", target),
            )
            .unwrap();
        }
    }

    #[test]
    fn test_toc_chapters_in_toc_order() {
        let dir = tempfile::tempdir().unwrap();
        build_fixture(
            dir.path(),
            &[("第一章", "ch1.xhtml"), ("第二章", "ch2.xhtml")],
            &["ch1.xhtml", "ch2.xhtml"],
            &[],
        );

        let plan = resolve_chapters(dir.path(), 0.5).unwrap();
        assert_eq!(plan.source, ChapterSource::Toc);
        assert_eq!(plan.toc_entry_count, 2);
        let titles: Vec<&str> = plan.chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["第一章", "第二章"]);
    }

    #[test]
    fn test_low_coverage_falls_back_to_spine() {
        // 目录只列2个文件，书脊有10个：0.2 < 0.5触发回退
        let dir = tempfile::tempdir().unwrap();
        let spine: Vec<String> = (0..10).map(|i| format!("ch{}.xhtml", i)).collect();
        let spine_refs: Vec<&str> = spine.iter().map(String::as_str).collect();
        build_fixture(
            dir.path(),
            &[("第一章", "ch0.xhtml"), ("第二章", "ch1.xhtml")],
            &spine_refs,
            &[],
        );

        let plan = resolve_chapters(dir.path(), 0.5).unwrap();
        assert_eq!(plan.source, ChapterSource::Spine);
        assert_eq!(plan.coverage, Some((2, 10)));
        assert_eq!(plan.chapters.len(), 10);
        // 书脊回退时标题从文件内容推断
        assert_eq!(plan.chapters[0].title, "ch0.xhtml的标题");
        // 保持书脊声明顺序
        assert_eq!(plan.chapters[9].src, "ch9.xhtml");
    }

    #[test]
    fn test_exact_half_coverage_keeps_toc() {
        // 边界情况：T == 0.5·S不触发回退(严格小于)
        let dir = tempfile::tempdir().unwrap();
        let spine: Vec<String> = (0..10).map(|i| format!("ch{}.xhtml", i)).collect();
        let spine_refs: Vec<&str> = spine.iter().map(String::as_str).collect();
        build_fixture(
            dir.path(),
            &[
                ("一", "ch0.xhtml"),
                ("二", "ch1.xhtml"),
                ("三", "ch2.xhtml"),
                ("四", "ch3.xhtml"),
                ("五", "ch4.xhtml"),
            ],
            &spine_refs,
            &[],
        );

        let plan = resolve_chapters(dir.path(), 0.5).unwrap();
        assert_eq!(plan.source, ChapterSource::Toc);
        assert_eq!(plan.coverage, None);
    }

    #[test]
    fn test_no_toc_uses_spine() {
        let dir = tempfile::tempdir().unwrap();
        build_fixture(dir.path(), &[], &["ch1.xhtml", "ch2.xhtml"], &[]);

        let plan = resolve_chapters(dir.path(), 0.5).unwrap();
        assert_eq!(plan.source, ChapterSource::Spine);
        assert_eq!(plan.toc_entry_count, 0);
        assert_eq!(plan.chapters.len(), 2);
    }

    #[test]
    fn test_no_toc_no_spine_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            resolve_chapters(dir.path(), 0.5),
            Err(EpubError::NoContent)
        ));
    }

    #[test]
    fn test_missing_target_dropped_and_renumbered() {
        // 中间的目标文件缺失：条目被静默丢弃，顺序重新编号保持连续
        let dir = tempfile::tempdir().unwrap();
        build_fixture(
            dir.path(),
            &[
                ("一", "ch1.xhtml"),
                ("二", "ch2.xhtml"),
                ("三", "ch3.xhtml"),
            ],
            &["ch1.xhtml", "ch2.xhtml", "ch3.xhtml"],
            &["ch2.xhtml"],
        );

        let plan = resolve_chapters(dir.path(), 0.5).unwrap();
        let orders: Vec<usize> = plan.chapters.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![1, 2]);
        assert_eq!(plan.chapters[1].src, "ch3.xhtml");
    }

    #[test]
    fn test_non_html_toc_targets_skipped() {
        let dir = tempfile::tempdir().unwrap();
        build_fixture(
            dir.path(),
            &[("图片", "cover.jpg"), ("正文", "ch1.xhtml")],
            &["ch1.xhtml"],
            &[],
        );
        // cover.jpg不是HTML路径，对应条目被丢弃
        let plan = resolve_chapters(dir.path(), 0.5).unwrap();
        assert_eq!(plan.chapters.len(), 1);
        assert_eq!(plan.chapters[0].src, "ch1.xhtml");
    }

    #[test]
    fn test_shared_file_fragments_resolved() {
        // 一个物理文件包含三个章节锚点
        let dir = tempfile::tempdir().unwrap();
        build_fixture(
            dir.path(),
            &[
                ("一", "all.xhtml#part1"),
                ("二", "all.xhtml#part2"),
                ("三", "all.xhtml#part3"),
            ],
            &["all.xhtml"],
            &[],
        );

        let plan = resolve_chapters(dir.path(), 0.5).unwrap();
        assert_eq!(plan.chapters.len(), 3);
        assert_eq!(plan.chapters[0].start_id, Some("part1".to_string()));
        assert_eq!(plan.chapters[0].end_id, Some("part2".to_string()));
        assert_eq!(plan.chapters[2].start_id, Some("part3".to_string()));
        assert_eq!(plan.chapters[2].end_id, None);
    }
}
