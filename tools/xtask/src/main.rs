//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 like-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `profile-check`: 检查序列配置档（格式、数值、观感）

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use like_runtime::{DiagnosticResult, analyze_json};
use walkdir::WalkDir;

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    let status = cmd.status();
    match status {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "like-runtime", "--all-features", "--html"]);
            run(
                "cargo llvm-cov -p like-runtime --all-features --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // 说明：
            // - workspace 覆盖率不作为主目标，主要用于"趋势观察"
            // - 在口径上排除 tool crate（xtask）以免稀释信号
            let mut cov = Command::new("cargo");
            cov.args([
                "llvm-cov",
                "--workspace",
                "--exclude",
                "xtask",
                "--all-features",
                "--html",
            ]);
            run(
                "cargo llvm-cov --workspace --exclude xtask --all-features --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "profile-check" => {
            let path = args.next();
            profile_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-runtime     运行 like-runtime 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  profile-check   检查序列配置档

PROFILE-CHECK:
  cargo xtask profile-check [path]

  不带参数：检查 profiles/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - JSON 格式与字段类型
    - 非法数值（非正时长、粒子数为 0、看门狗系数为 0）
    - 观感问题（亚单帧时长、过大粒子数、激进看门狗）

ALIASES (in .cargo/config.toml):
  cargo check-all     -> cargo xtask check-all
  cargo cov-runtime   -> cargo xtask cov-runtime
  cargo cov-workspace -> cargo xtask cov-workspace
  cargo profile-check -> cargo xtask profile-check
"#
    );
}

//=============================================================================
// profile-check 命令实现
//=============================================================================

/// 配置档检查结果
struct ProfileCheckResult {
    /// 检查的配置档数量
    profiles_checked: usize,
    /// 无法读取的文件数量
    unreadable: usize,
    /// 诊断结果
    diagnostics: DiagnosticResult,
}

/// 执行配置档检查
fn profile_check(path: Option<&str>) -> anyhow::Result<()> {
    let default_dir = PathBuf::from("profiles");

    // 确定要检查的文件
    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_profile_files(&path)
            } else {
                anyhow::bail!("路径不存在: {}", p);
            }
        }
        None => {
            if !default_dir.exists() {
                anyhow::bail!(
                    "默认配置档目录不存在: {}\n请在 workspace 根目录运行，或指定配置档路径",
                    default_dir.display()
                );
            }
            collect_profile_files(&default_dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到配置档文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个配置档...\n", files.len());

    let mut result = ProfileCheckResult {
        profiles_checked: 0,
        unreadable: 0,
        diagnostics: DiagnosticResult::new(),
    };

    // 检查每个配置档
    for file in &files {
        check_profile_file(file, &mut result);
    }

    // 输出结果
    print_check_result(&result);

    // 如果有错误则返回失败
    if result.unreadable > 0 || result.diagnostics.has_errors() {
        anyhow::bail!("配置档检查发现错误");
    }

    Ok(())
}

/// 收集目录下的所有配置档文件
fn collect_profile_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// 检查单个配置档
fn check_profile_file(file: &Path, result: &mut ProfileCheckResult) {
    let profile_id = file.display().to_string();
    result.profiles_checked += 1;

    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[ERROR] {}: 无法读取文件 - {}", profile_id, e);
            result.unreadable += 1;
            return;
        }
    };

    result.diagnostics.merge(analyze_json(&profile_id, &content));
}

/// 输出检查结果
fn print_check_result(result: &ProfileCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个配置档", result.profiles_checked);
    eprintln!();

    // 输出诊断
    for diag in &result.diagnostics.diagnostics {
        eprintln!("{}", diag);
    }

    // 汇总
    let error_count = result.unreadable + result.diagnostics.error_count();
    let warn_count = result.diagnostics.warn_count();

    eprintln!();
    if error_count > 0 {
        eprintln!("❌ {} 个错误, {} 个警告", error_count, warn_count);
    } else if warn_count > 0 {
        eprintln!("⚠️  0 个错误, {} 个警告", warn_count);
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}
