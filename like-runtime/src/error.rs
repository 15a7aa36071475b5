//! # Error 模块
//!
//! 定义 like-runtime 中使用的错误类型。

use thiserror::Error;

use crate::snapshot::SnapshotError;

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 配置 JSON 解析失败
    #[error("配置解析失败: {0}")]
    InvalidJson(String),

    /// 时长字段必须为正数
    #[error("参数 '{field}' 必须为正数，当前为 {value}")]
    NonPositiveDuration { field: &'static str, value: f32 },

    /// 数值字段必须有限（拒绝 NaN / 无穷）
    #[error("参数 '{field}' 必须为有限数，当前为 {value}")]
    NonFiniteValue { field: &'static str, value: f32 },

    /// 粒子数不能为 0
    #[error("粒子数 dot_count 不能为 0")]
    ZeroDotCount,

    /// 看门狗系数不能为 0
    #[error("看门狗系数 watchdog_factor 不能为 0")]
    ZeroWatchdogFactor,
}

/// like-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LikeError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 快照错误
    #[error("快照错误: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Result 类型别名
pub type LikeResult<T> = Result<T, LikeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NonPositiveDuration {
            field: "stage_duration",
            value: -0.5,
        };
        assert!(err.to_string().contains("stage_duration"));
        assert!(err.to_string().contains("-0.5"));
    }

    #[test]
    fn test_error_conversion() {
        let err: LikeError = ConfigError::ZeroDotCount.into();
        assert!(matches!(err, LikeError::Config(ConfigError::ZeroDotCount)));
        assert!(err.to_string().contains("配置错误"));
    }
}
