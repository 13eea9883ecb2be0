use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use crate::epub::error::Result;

/// EPUB文件要求的mimetype内容
const EXPECTED_MIMETYPE: &str = "application/epub+zip";

/// 表示一个EPUB文件
pub struct Epub {
    archive: ZipArchive<File>,
}

impl Epub {
    /// 从文件路径创建Epub实例
    ///
    /// # 参数
    /// * `path` - epub文件的路径
    ///
    /// # 返回值
    /// * `Result<Epub, EpubError>` - 成功返回Epub实例，失败返回错误
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Epub> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;

        let mut epub = Epub { archive };
        epub.validate();

        Ok(epub)
    }

    /// 检查mimetype文件
    ///
    /// 野生的EPUB文件经常缺失或写错mimetype，但内容本身仍然可用，
    /// 所以这里只提示不报错。真正损坏的zip在`new`中就已经失败了。
    fn validate(&mut self) {
        match self.archive.by_name("mimetype") {
            Ok(mut file) => {
                let mut content = String::new();
                if file.read_to_string(&mut content).is_ok() && content.trim() != EXPECTED_MIMETYPE {
                    println!("⚠️  mimetype不标准: {}", content.trim());
                }
            }
            Err(_) => {
                println!("⚠️  缺少mimetype文件，继续处理");
            }
        }
    }

    /// 提取指定文件的文本内容
    ///
    /// # 参数
    /// * `filename` - 要提取的文件名
    ///
    /// # 返回值
    /// * `Result<String, EpubError>` - 文件内容
    pub fn extract_file(&mut self, filename: &str) -> Result<String> {
        let mut file = self.archive.by_name(filename)?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(content)
    }

    /// 将EPUB的全部内容解压到指定目录
    ///
    /// 目录项会被创建，文件项写入对应的相对路径。解压后的目录
    /// 就是结构解析引擎的输入根目录。
    ///
    /// # 参数
    /// * `dest` - 解压目标目录（必须已存在）
    pub fn unpack_to(&mut self, dest: &Path) -> Result<()> {
        for i in 0..self.archive.len() {
            let mut entry = self.archive.by_index(i)?;
            let Some(relative) = entry.enclosed_name() else {
                // 路径穿越的条目直接跳过
                continue;
            };
            let target = dest.join(relative);

            if entry.is_dir() {
                std::fs::create_dir_all(&target)?;
            } else {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let mut out = File::create(&target)?;
                std::io::copy(&mut entry, &mut out)?;
            }
        }
        Ok(())
    }
}
