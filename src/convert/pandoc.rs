//! pandoc调用模块
//!
//! 把单个章节的HTML交给pandoc转换为Markdown。整文件章节直接把
//! 相对路径传给pandoc，片段章节通过标准输入喂入截取出来的HTML。
//! 随转换附带一个LUA过滤器，剥掉div/span包装并清理图片属性。

use crate::epub::error::{EpubError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::config::ConvertConfig;

/// 转换时注入的pandoc LUA过滤器
///
/// - 展开Div/Span，避免生成多余的HTML残留；
/// - 丢弃只含单个反斜杠的段落(常见于EPUB强制换行的翻译产物)；
/// - 清空图片的class和属性，只保留路径和alt。
pub const LUA_FILTER: &str = r#"
function Div(el) return el.content end
function Span(el) return el.content end
function Para(el)
  if el.content and #el.content==1 and el.content[1].t=='Str' and el.content[1].text=='\\' then return {} end
  return el
end
function Plain(el)
  if el.content and #el.content==1 and el.content[1].t=='Str' and el.content[1].text=='\\' then return {} end
  return el
end
function Image(el) el.classes={} el.attributes={} return el end
"#;

/// 单个章节的转换输入
pub enum PandocInput<'a> {
    /// 整文件章节：相对于基准目录的文件路径
    File(&'a str),
    /// 片段章节：已截取的HTML文本，经标准输入传入
    Snippet(&'a str),
}

/// pandoc调用器
///
/// 持有可执行文件路径、输出参数和LUA过滤器的落盘位置。
pub struct Pandoc {
    path: String,
    format: String,
    wrap: String,
    filter_path: PathBuf,
}

impl Pandoc {
    /// 创建调用器并把LUA过滤器写入指定目录
    ///
    /// # 参数
    ///
    /// * `config` - 转换配置
    /// * `filter_dir` - 过滤器文件的存放目录(通常是解包用的临时目录)
    pub fn new(config: &ConvertConfig, filter_dir: &Path) -> Result<Self> {
        let filter_path = filter_dir.join("f.lua");
        fs::write(&filter_path, LUA_FILTER)?;

        Ok(Self {
            path: config.pandoc_path.clone(),
            format: config.markdown_format.clone(),
            wrap: config.wrap.clone(),
            filter_path,
        })
    }

    /// 探测pandoc是否可用
    ///
    /// # 返回值
    ///
    /// * `Result<String>` - 可用时返回版本信息的第一行
    pub fn probe(pandoc_path: &str) -> Result<String> {
        let output = Command::new(pandoc_path)
            .arg("--version")
            .output()
            .map_err(|e| EpubError::PandocNotFound(format!("{}: {}", pandoc_path, e)))?;

        if !output.status.success() {
            return Err(EpubError::PandocNotFound(pandoc_path.to_string()));
        }

        let version = String::from_utf8_lossy(&output.stdout);
        Ok(version.lines().next().unwrap_or("pandoc").to_string())
    }

    /// 转换单个章节并写出Markdown文件
    ///
    /// # 参数
    ///
    /// * `base_dir` - 章节相对路径的基准目录，同时作为pandoc的工作目录
    /// * `input` - 整文件或片段输入
    /// * `media_dir` - pandoc提取图片的目标目录
    /// * `out_path` - Markdown输出路径
    ///
    /// # 返回值
    ///
    /// * `Result<()>` - pandoc退出码非零时返回`PandocFailed`，附带
    ///   截断后的标准错误内容
    pub fn render(
        &self,
        base_dir: &Path,
        input: PandocInput<'_>,
        media_dir: &Path,
        out_path: &Path,
    ) -> Result<()> {
        let mut command = Command::new(&self.path);
        command.current_dir(base_dir);

        match input {
            PandocInput::File(src) => {
                command.arg(src).stdin(Stdio::null());
            }
            PandocInput::Snippet(_) => {
                command.arg("-").stdin(Stdio::piped());
            }
        }

        command
            .args(["-f", "html", "-t", &self.format])
            .arg(format!("--wrap={}", self.wrap))
            .arg("--lua-filter")
            .arg(&self.filter_path)
            .arg("--extract-media")
            .arg(media_dir)
            .arg("-o")
            .arg(out_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn()?;
        if let PandocInput::Snippet(text) = input {
            // 子进程的stdin在作用域结束时关闭，pandoc才能读到EOF
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(text.as_bytes())?;
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let brief: String = stderr.chars().take(200).collect();
            return Err(EpubError::PandocFailed(brief));
        }
        Ok(())
    }
}

/// 把图片的绝对路径引用改写为输出目录内的相对路径
///
/// pandoc的`--extract-media`会在Markdown里写入图片目录的绝对路径，
/// 转换完成后统一替换为`images/`前缀。
pub fn relocate_image_links(md_path: &Path, media_dir: &Path) -> Result<()> {
    let abs_prefix = format!("{}/", media_dir.display());
    let content = fs::read_to_string(md_path)?;
    if content.contains(&abs_prefix) {
        fs::write(md_path, content.replace(&abs_prefix, "images/"))?;
    }
    Ok(())
}

/// 从章节标题生成文件名片段
///
/// 小写化后把非字母数字的连续字符折叠成`-`，去掉首尾的`-`，
/// 再截断到最大长度。结果为空时落到`untitled`。
pub fn slugify(title: &str, max_length: usize) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug.truncate(max_length);
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}
