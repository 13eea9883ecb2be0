//! 片段截取模块
//!
//! 根据起止锚点从HTML文本中截取字节区间。锚点通过id/name属性的
//! 字面模式定位，命中后回退到所在标签的`<`处，使截取边界落在
//! 完整的标签开头。

/// 定位锚点所在标签的起始字节偏移
///
/// 依次尝试`id="…"`、`id='…'`、`name="…"`、`name='…'`四种字面
/// 写法，取所有命中里最靠前的一个，再向前回退到最近的`<`。
/// 属性前带空格等变体不会命中，这和常见EPUB生成器的输出一致。
pub fn find_anchor(text: &str, anchor: &str) -> Option<usize> {
    let patterns = [
        format!("id=\"{}\"", anchor),
        format!("id='{}'", anchor),
        format!("name=\"{}\"", anchor),
        format!("name='{}'", anchor),
    ];

    let pos = patterns
        .iter()
        .filter_map(|p| text.find(p.as_str()))
        .min()?;

    // 回退到属性所在标签的开头，找不到`<`就从命中处截断
    Some(text[..pos].rfind('<').unwrap_or(pos))
}

/// 按起止锚点截取文本区间
///
/// # 返回值
///
/// - 起止锚点都缺席：`None`，调用方应使用整个文件；
/// - 起始锚点给出但定位失败：`None`，同样退回整个文件；
/// - 起始锚点缺席：区间从文件开头算起；
/// - 结束锚点缺席或定位失败：区间到文件结尾；
/// - 区间退化(起点不在终点之前)：`Some("")`，调用方可据此告警。
pub fn extract_segment(text: &str, start_id: Option<&str>, end_id: Option<&str>) -> Option<String> {
    if start_id.is_none() && end_id.is_none() {
        return None;
    }

    let start = match start_id {
        Some(id) => find_anchor(text, id)?,
        None => 0,
    };
    let end = end_id
        .and_then(|id| find_anchor(text, id))
        .unwrap_or(text.len());

    if start >= end {
        return Some(String::new());
    }
    Some(text[start..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = concat!(
        "<html><body>",
        "<p>序言内容</p>",
        "<h1 id=\"ch1\">第一章</h1><p>第一章内容</p>",
        "<h1 id='ch2'>第二章</h1><p>第二章内容</p>",
        "<a name=\"ch3\"></a><p>第三章内容</p>",
        "</body></html>"
    );

    #[test]
    fn test_find_anchor_backtracks_to_tag_start() {
        let pos = find_anchor(PAGE, "ch1").unwrap();
        assert!(PAGE[pos..].starts_with("<h1 id=\"ch1\">"));
    }

    #[test]
    fn test_find_anchor_quote_and_name_variants() {
        let pos = find_anchor(PAGE, "ch2").unwrap();
        assert!(PAGE[pos..].starts_with("<h1 id='ch2'>"));

        let pos = find_anchor(PAGE, "ch3").unwrap();
        assert!(PAGE[pos..].starts_with("<a name=\"ch3\">"));
    }

    #[test]
    fn test_find_anchor_missing() {
        assert_eq!(find_anchor(PAGE, "nowhere"), None);
    }

    #[test]
    fn test_find_anchor_takes_earliest_match() {
        // 同一锚点以不同写法出现时取最靠前的命中
        let text = "<a name=\"x\"></a>..<h1 id=\"x\">..</h1>";
        let pos = find_anchor(text, "x").unwrap();
        assert_eq!(pos, 0);
    }

    #[test]
    fn test_adjacent_segments_cover_file() {
        // 序言 + 三个章节区间首尾相接，拼起来还原整个文件
        let preamble = extract_segment(PAGE, None, Some("ch1")).unwrap();
        let ch1 = extract_segment(PAGE, Some("ch1"), Some("ch2")).unwrap();
        let ch2 = extract_segment(PAGE, Some("ch2"), Some("ch3")).unwrap();
        let ch3 = extract_segment(PAGE, Some("ch3"), None).unwrap();

        assert!(preamble.contains("序言内容"));
        assert!(ch1.contains("第一章内容"));
        assert!(!ch1.contains("第二章内容"));
        assert!(ch2.contains("第二章内容"));
        assert!(ch3.contains("第三章内容"));
        assert_eq!(format!("{preamble}{ch1}{ch2}{ch3}"), PAGE);
    }

    #[test]
    fn test_whole_file_when_no_anchors() {
        assert_eq!(extract_segment(PAGE, None, None), None);
    }

    #[test]
    fn test_unresolved_start_falls_back_to_whole_file() {
        assert_eq!(extract_segment(PAGE, Some("ghost"), None), None);
    }

    #[test]
    fn test_unresolved_end_runs_to_eof() {
        let seg = extract_segment(PAGE, Some("ch2"), Some("ghost")).unwrap();
        assert!(seg.ends_with("</html>"));
    }

    #[test]
    fn test_degenerate_range_yields_empty() {
        // 终点锚点位于起点之前
        let seg = extract_segment(PAGE, Some("ch2"), Some("ch1")).unwrap();
        assert_eq!(seg, "");
    }
}
