//! # 诊断模块
//!
//! 提供配置档静态检查 API，不依赖 IO 或引擎。
//!
//! ## 设计原则
//!
//! - 纯函数 API，可在无 IO 环境下运行
//! - 诊断分级：Error（必须修复）、Warn（建议修复）、Info（信息提示）
//! - Error 级检查与 [`SequenceConfig::validate`] 保持一致，
//!   但一次列出全部问题而不是止步于第一个

use crate::config::SequenceConfig;

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warn,
    /// 错误（必须修复）
    Error,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 配置档 ID / 文件路径
    pub profile_id: String,
    /// 诊断消息
    pub message: String,
    /// 诊断详情（可选）
    pub detail: Option<String>,
}

impl Diagnostic {
    /// 创建错误诊断
    pub fn error(profile_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            profile_id: profile_id.into(),
            message: message.into(),
            detail: None,
        }
    }

    /// 创建警告诊断
    pub fn warn(profile_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warn,
            profile_id: profile_id.into(),
            message: message.into(),
            detail: None,
        }
    }

    /// 创建信息诊断
    pub fn info(profile_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            profile_id: profile_id.into(),
            message: message.into(),
            detail: None,
        }
    }

    /// 设置详情
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.profile_id, self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n  | {}", detail)?;
        }
        Ok(())
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    /// 创建空结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: DiagnosticResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// 获取错误数量
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
            .count()
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warn)
            .count()
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 按级别过滤
    pub fn filter_by_level(&self, min_level: DiagnosticLevel) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level >= min_level)
            .collect()
    }
}

//=============================================================================
// 配置分析 API
//=============================================================================

/// 单帧时长（60 FPS），短于它的阶段观感上等于硬切
const SINGLE_FRAME_SECS: f32 = 1.0 / 60.0;

/// 分析配置，返回诊断结果
///
/// Error 级检查与 [`SequenceConfig::validate`] 一致；
/// 此外补充观感与健壮性层面的 Warn / Info。
///
/// # 参数
///
/// - `profile_id`: 配置档标识（通常为文件路径）
/// - `config`: 待分析的配置
///
/// # 返回
///
/// 诊断结果
pub fn analyze_config(profile_id: &str, config: &SequenceConfig) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();

    // ---- Error 级：与 validate 对齐 ----
    for (field, value) in [
        ("stage_duration", config.stage_duration),
        ("firework_duration", config.firework_duration),
    ] {
        if !value.is_finite() {
            result.push(Diagnostic::error(
                profile_id,
                format!("参数 '{}' 必须为有限数，当前为 {}", field, value),
            ));
        } else if value <= 0.0 {
            result.push(Diagnostic::error(
                profile_id,
                format!("参数 '{}' 必须为正数，当前为 {}", field, value),
            ));
        }
    }

    for (field, value) in [
        ("dot_travel", config.dot_travel),
        ("dot_end_scale", config.dot_end_scale),
    ] {
        if !value.is_finite() {
            result.push(Diagnostic::error(
                profile_id,
                format!("参数 '{}' 必须为有限数，当前为 {}", field, value),
            ));
        }
    }

    if config.dot_count == 0 {
        result.push(Diagnostic::error(profile_id, "粒子数 dot_count 不能为 0"));
    }

    if config.watchdog_factor == 0 {
        result.push(Diagnostic::error(
            profile_id,
            "看门狗系数 watchdog_factor 不能为 0",
        ));
    }

    // ---- Warn 级：能跑，但多半不是想要的效果 ----
    if config.stage_duration.is_finite()
        && config.stage_duration > 0.0
        && config.stage_duration < SINGLE_FRAME_SECS
    {
        result.push(
            Diagnostic::warn(
                profile_id,
                format!("主阶段时长 {} 秒短于单帧", config.stage_duration),
            )
            .with_detail("60 FPS 下一帧约 0.0167 秒，更短的阶段观感上等于硬切"),
        );
    }

    if config.watchdog_factor == 1 {
        result.push(
            Diagnostic::warn(profile_id, "看门狗系数为 1，时限等于标称时长")
                .with_detail("Host 侧任何调度延迟都会误杀健康的播放，建议至少为 2"),
        );
    }

    if config.dot_count > 32 {
        result.push(
            Diagnostic::warn(
                profile_id,
                format!("粒子数 {} 偏大", config.dot_count),
            )
            .with_detail("指令量与回报量随粒子数线性增长"),
        );
    }

    if config.dot_travel == 0.0 {
        result.push(Diagnostic::warn(profile_id, "粒子位移为 0，烟花原地不动"));
    }

    if config.dot_end_scale.is_finite() && config.dot_end_scale <= 0.0 {
        result.push(Diagnostic::warn(
            profile_id,
            "粒子终点缩放不为正，烟花全程不可见",
        ));
    }

    // ---- Info 级：偏离原型观感 ----
    if config.firework_duration.is_finite()
        && config.stage_duration.is_finite()
        && config.firework_duration > 0.0
        && config.firework_duration < config.stage_duration
    {
        result.push(Diagnostic::info(
            profile_id,
            "烟花时长短于主阶段（原型为主阶段的两倍）",
        ));
    }

    if config.dot_count != 0 && !(6..=12).contains(&config.dot_count) {
        result.push(Diagnostic::info(
            profile_id,
            format!("粒子数 {} 偏离原型观感（原型为 8）", config.dot_count),
        ));
    }

    result
}

/// 解析 JSON 配置档并分析
///
/// 解析失败时返回单条 Error 级诊断，不再继续分析。
pub fn analyze_json(profile_id: &str, json: &str) -> DiagnosticResult {
    let config: SequenceConfig = match serde_json::from_str(json) {
        Ok(config) => config,
        Err(e) => {
            let mut result = DiagnosticResult::new();
            result.push(
                Diagnostic::error(profile_id, "配置 JSON 解析失败")
                    .with_detail(e.to_string()),
            );
            return result;
        }
    };

    analyze_config(profile_id, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error("profiles/bad.json", "粒子数 dot_count 不能为 0")
            .with_detail("烟花阶段至少需要一个粒子");

        let display = format!("{}", diag);
        assert!(display.contains("[ERROR]"));
        assert!(display.contains("profiles/bad.json"));
        assert!(display.contains("dot_count"));
        assert!(display.contains("  | "));
    }

    #[test]
    fn test_analyze_default_config_is_clean() {
        let result = analyze_config("default", &SequenceConfig::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_analyze_lists_all_errors() {
        // validate 只报第一个错误，analyze 要全部列出
        let config = SequenceConfig::default()
            .with_stage_duration(0.0)
            .with_dot_count(0)
            .with_watchdog_factor(0);

        let result = analyze_config("broken", &config);
        assert!(result.has_errors());
        assert!(result.error_count() >= 3);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_analyze_warns_subframe_duration() {
        let config = SequenceConfig::default().with_stage_duration(0.005);
        let result = analyze_config("fast", &config);

        assert!(!result.has_errors());
        assert!(result.warn_count() >= 1);
        assert!(result.diagnostics[0].message.contains("短于单帧"));
    }

    #[test]
    fn test_analyze_warns_aggressive_watchdog() {
        let config = SequenceConfig::default().with_watchdog_factor(1);
        let result = analyze_config("tight", &config);

        assert!(!result.has_errors());
        assert_eq!(result.warn_count(), 1);
    }

    #[test]
    fn test_analyze_info_for_unusual_dot_count() {
        let config = SequenceConfig::default().with_dot_count(24);
        let result = analyze_config("many", &config);

        assert!(!result.has_errors());
        assert_eq!(result.warn_count(), 0);
        // 24 在硬上限内，只提示偏离原型
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].level, DiagnosticLevel::Info);
    }

    #[test]
    fn test_analyze_json_parse_failure() {
        let result = analyze_json("garbage.json", "{ not json");

        assert!(result.has_errors());
        assert_eq!(result.error_count(), 1);
        assert!(result.diagnostics[0].detail.is_some());
    }

    #[test]
    fn test_analyze_json_partial_profile() {
        // 缺省字段回落默认值后应当干净
        let result = analyze_json("partial.json", r#"{ "dot_count": 8 }"#);
        assert!(result.is_empty());
    }

    #[test]
    fn test_diagnostic_result_filter() {
        let mut result = DiagnosticResult::new();
        result.push(Diagnostic::error("test", "错误1"));
        result.push(Diagnostic::warn("test", "警告1"));
        result.push(Diagnostic::info("test", "信息1"));

        let errors = result.filter_by_level(DiagnosticLevel::Error);
        assert_eq!(errors.len(), 1);

        let warns_and_errors = result.filter_by_level(DiagnosticLevel::Warn);
        assert_eq!(warns_and_errors.len(), 2);

        let all = result.filter_by_level(DiagnosticLevel::Info);
        assert_eq!(all.len(), 3);
    }
}
