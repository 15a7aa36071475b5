//! # Snapshot 模块
//!
//! 点赞状态的持久化格式。
//!
//! ## 设计说明
//!
//! 快照只保存点赞结果，不保存进行中的动画：编排是瞬态的，
//! 恢复时一律回到空闲稳态，由 Runtime 重新下发同步指令。
//! 版本号用于向后兼容：主版本相同即可加载。

use serde::{Deserialize, Serialize};

use crate::state::LikeState;

/// 当前快照格式主版本
pub const SNAPSHOT_VERSION_MAJOR: u32 = 1;
/// 当前快照格式次版本
pub const SNAPSHOT_VERSION_MINOR: u32 = 0;

/// 快照格式版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotVersion {
    /// 主版本（不兼容变更时递增）
    pub major: u32,
    /// 次版本（兼容变更时递增）
    pub minor: u32,
}

impl SnapshotVersion {
    /// 当前版本
    pub fn current() -> Self {
        Self {
            major: SNAPSHOT_VERSION_MAJOR,
            minor: SNAPSHOT_VERSION_MINOR,
        }
    }

    /// 是否与当前版本兼容（主版本相同）
    pub fn is_compatible(&self) -> bool {
        self.major == SNAPSHOT_VERSION_MAJOR
    }
}

impl std::fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// 点赞状态快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 格式版本
    pub version: SnapshotVersion,
    /// 保存时间（Unix 秒的字符串形式）
    pub saved_at: String,
    /// 点赞状态
    pub like: LikeState,
}

impl Snapshot {
    /// 创建快照
    pub fn new(like: LikeState) -> Self {
        Self {
            version: SnapshotVersion::current(),
            saved_at: unix_timestamp(),
            like,
        }
    }

    /// 序列化为 JSON 字符串
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// 从 JSON 字符串反序列化
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;

        // 检查版本兼容性
        if !snapshot.version.is_compatible() {
            return Err(SnapshotError::IncompatibleVersion {
                snapshot_version: snapshot.version.to_string(),
                current_version: SnapshotVersion::current().to_string(),
            });
        }

        Ok(snapshot)
    }
}

/// 快照错误
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// 序列化失败
    SerializationFailed(String),
    /// 反序列化失败
    DeserializationFailed(String),
    /// 版本不兼容
    IncompatibleVersion {
        snapshot_version: String,
        current_version: String,
    },
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::SerializationFailed(e) => write!(f, "序列化失败: {}", e),
            SnapshotError::DeserializationFailed(e) => write!(f, "反序列化失败: {}", e),
            SnapshotError::IncompatibleVersion {
                snapshot_version,
                current_version,
            } => {
                write!(
                    f,
                    "快照版本不兼容: 快照版本 {} vs 当前版本 {}",
                    snapshot_version, current_version
                )
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

/// 获取当前时间戳（Unix 秒的字符串形式）
fn unix_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}", duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_version_compatibility() {
        let current = SnapshotVersion::current();
        assert!(current.is_compatible());

        let old_minor = SnapshotVersion { major: 1, minor: 0 };
        assert!(old_minor.is_compatible());

        let incompatible = SnapshotVersion { major: 2, minor: 0 };
        assert!(!incompatible.is_compatible());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let snapshot = Snapshot::new(LikeState::Liked);

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("Liked"));

        let loaded = Snapshot::from_json(&json).unwrap();
        assert_eq!(loaded.like, LikeState::Liked);
        assert_eq!(loaded.version, SnapshotVersion::current());
    }

    #[test]
    fn test_incompatible_version_error() {
        let json = r#"{
            "version": { "major": 99, "minor": 0 },
            "saved_at": "0",
            "like": "Unliked"
        }"#;

        let err = Snapshot::from_json(json).unwrap_err();
        assert!(matches!(err, SnapshotError::IncompatibleVersion { .. }));
        assert!(err.to_string().contains("99.0"));
    }

    #[test]
    fn test_garbage_json_error() {
        let err = Snapshot::from_json("not a snapshot").unwrap_err();
        assert!(matches!(err, SnapshotError::DeserializationFailed(_)));
    }
}
