//! # Input 模块
//!
//! 定义 Host → Runtime 的输入事件。
//!
//! Runtime 不感知真实时间，也不订阅渲染器：用户点击、
//! 渲染器的起止回报、看门狗超时，全部以输入事件的形式
//! 在 Host 的节奏下送进 [`tick`](crate::runtime::LikeRuntime::tick)。

use serde::{Deserialize, Serialize};

use crate::stage::StageId;

/// Host 输入事件
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SequencerInput {
    /// 用户点击
    Tap,

    /// 渲染器回报：某个阶段真正开始播放
    StageStarted {
        /// 开始的阶段
        stage: StageId,
    },

    /// 渲染器回报：某个阶段停止播放
    StageStopped {
        /// 停止的阶段
        stage: StageId,
        /// 是否自然播完（false 表示被中断）
        finished: bool,
    },

    /// 看门狗超时：等待的回报迟迟未到
    ///
    /// 计时由 Host 完成，时限见
    /// [`WaitingReason`](crate::state::WaitingReason) 携带的值。
    WatchdogElapsed,
}

impl SequencerInput {
    /// 创建点击输入
    pub fn tap() -> Self {
        SequencerInput::Tap
    }

    /// 创建阶段开始回报
    pub fn started(stage: StageId) -> Self {
        SequencerInput::StageStarted { stage }
    }

    /// 创建阶段停止回报
    pub fn stopped(stage: StageId, finished: bool) -> Self {
        SequencerInput::StageStopped { stage, finished }
    }

    /// 创建看门狗超时输入
    pub fn watchdog() -> Self {
        SequencerInput::WatchdogElapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_constructors() {
        assert_eq!(SequencerInput::tap(), SequencerInput::Tap);
        assert_eq!(
            SequencerInput::started(StageId::IconFadeOut),
            SequencerInput::StageStarted {
                stage: StageId::IconFadeOut
            }
        );
        assert_eq!(
            SequencerInput::stopped(StageId::IconFadeIn, false),
            SequencerInput::StageStopped {
                stage: StageId::IconFadeIn,
                finished: false
            }
        );
    }

    #[test]
    fn test_input_serialization() {
        let input = SequencerInput::stopped(StageId::FireworkDot { index: 3 }, true);

        let json = serde_json::to_string(&input).unwrap();
        let loaded: SequencerInput = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, input);
    }
}
