//! 锚点范围解析模块
//!
//! 多个逻辑章节共用一个物理文件时，用各自的片段锚点把文件切分成
//! 前后相接的范围。解析按物理文件分组独立进行，结果写回章节的
//! start_id/end_id字段。

use std::collections::HashMap;
use std::path::PathBuf;

use crate::chapter::Chapter;

/// 为所有章节解析锚点范围
///
/// 规则(按组内原始顺序)：
/// - 组内没有任何章节带片段锚点时，整组保持整文件模式；
/// - 否则每个章节的结束锚点取组内它之后第一个带锚点章节的锚点，
///   没有后继锚点则到文件结尾；
/// - 起始锚点取自己的片段锚点；
/// - 组内第一个章节自己没有锚点而后面有时，仍然接收后继锚点作为
///   结束锚点，形成从文件开头到第一个真实章节边界的"序言"段。
///
/// 重复调用是幂等的：结果只由片段锚点决定。
pub fn resolve(chapters: &mut [Chapter]) {
    // 按目标文件建立索引，组内保持原始章节顺序
    let mut by_file: HashMap<PathBuf, Vec<usize>> = HashMap::new();
    for (i, chapter) in chapters.iter().enumerate() {
        by_file.entry(chapter.path.clone()).or_default().push(i);
    }

    for group in by_file.values_mut() {
        group.sort_by_key(|&i| chapters[i].order);

        if !group.iter().any(|&i| chapters[i].fragment.is_some()) {
            continue;
        }

        for pos in 0..group.len() {
            // 向前扫描组内下一个带锚点的章节
            let end_id = group[pos + 1..]
                .iter()
                .find_map(|&j| chapters[j].fragment.clone());

            let i = group[pos];
            if chapters[i].fragment.is_some() {
                chapters[i].start_id = chapters[i].fragment.clone();
                chapters[i].end_id = end_id;
            } else if pos == 0 && end_id.is_some() {
                // 序言段：从文件开头到第一个真实章节边界
                chapters[i].start_id = None;
                chapters[i].end_id = end_id;
            }
        }
    }
}
