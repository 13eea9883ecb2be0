use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use epub2md::convert::DEFAULT_CONFIG_PATH;
use epub2md::{ConvertConfig, Converter, Result};

/// 📚 epub2md - EPUB转Markdown工具
#[derive(Parser)]
#[command(name = "epub2md")]
#[command(about = "把EPUB电子书转换为按章节切分的Markdown文件")]
#[command(version)]
struct Args {
    /// EPUB文件路径
    #[arg(help = "要转换的EPUB文件路径")]
    epub_file: String,

    /// 输出目录(缺省为EPUB文件名去掉扩展名)
    #[arg(help = "Markdown输出目录")]
    outdir: Option<String>,

    /// 配置文件路径
    #[arg(short, long, help = "YAML配置文件路径(缺省读取当前目录的epub2md.yaml)")]
    config: Option<String>,

    /// 生成默认配置文件
    #[arg(long, help = "在当前目录生成默认配置文件epub2md.yaml后退出")]
    generate_config: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.generate_config {
        return match ConvertConfig::generate_default_config() {
            Ok(()) => {
                println!("📝 已生成默认配置文件: {}", DEFAULT_CONFIG_PATH);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ 错误: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let epub_path = PathBuf::from(&args.epub_file);
    if !epub_path.exists() {
        eprintln!("❌ 错误: 找不到文件 {}", args.epub_file);
        return ExitCode::FAILURE;
    }

    let outdir = args
        .outdir
        .map(PathBuf::from)
        .unwrap_or_else(|| default_outdir(&epub_path));

    println!("📚 正在转换: {}", epub_path.display());

    match run(&epub_path, &outdir, args.config.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ 错误: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(epub_path: &Path, outdir: &Path, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let report = Converter::new(config).convert(epub_path, outdir)?;

    println!(
        "\n🎉 完成！{} 章 → {}/",
        report.converted,
        report.outdir.display()
    );
    if !report.failures.is_empty() {
        println!("⚠️  {} 章转换失败", report.failures.len());
    }
    if report.images > 0 {
        println!("🖼️  {} 张图片 → {}/images/", report.images, report.outdir.display());
    }
    Ok(())
}

/// 加载转换配置
///
/// 显式指定的配置文件必须可读；未指定时尝试当前目录的默认配置，
/// 不存在就使用内置默认值。
fn load_config(config_path: Option<&str>) -> Result<ConvertConfig> {
    match config_path {
        Some(path) => ConvertConfig::from_file(path),
        None => {
            if Path::new(DEFAULT_CONFIG_PATH).exists() {
                ConvertConfig::from_file(DEFAULT_CONFIG_PATH)
            } else {
                Ok(ConvertConfig::default())
            }
        }
    }
}

/// 缺省输出目录：EPUB文件名去掉扩展名
fn default_outdir(epub_path: &Path) -> PathBuf {
    epub_path
        .file_stem()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("epub2md-out"))
}
