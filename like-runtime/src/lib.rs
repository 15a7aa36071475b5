//! # Like Runtime
//!
//! 点赞动画编排器的核心运行时库。
//!
//! ## 架构概述
//!
//! `like-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 它通过 **命令驱动模式** 与宿主层（Host）通信：
//!
//! ```text
//! Host                          Runtime
//!   │                              │
//!   │──── SequencerInput ────────►│
//!   │                              │ tick()
//!   │◄─── (Vec<RenderCommand>, WaitingReason) ──│
//!   │                              │
//! ```
//!
//! Host 负责真正播放动画，并把每个阶段的开始与停止回报给
//! Runtime；Runtime 负责决定下一步播什么、等什么、何时放弃等待。
//!
//! ## 核心类型
//!
//! - [`RenderCommand`]：Runtime 向 Host 发出的指令
//! - [`SequencerInput`]：Host 向 Runtime 传递的输入
//! - [`WaitingReason`]：Runtime 的等待状态（携带看门狗时限）
//! - [`SequencerState`]：可序列化的运行时状态
//!
//! ## 使用示例
//!
//! ```ignore
//! use like_runtime::{LikeRuntime, SequencerInput, WaitingReason};
//!
//! let mut runtime = LikeRuntime::new();
//!
//! // 主循环
//! loop {
//!     let (commands, waiting) = runtime.tick(input);
//!
//!     // Host 执行 commands
//!     for cmd in commands {
//!         host.execute(cmd);
//!     }
//!
//!     // 根据 waiting 状态采集输入
//!     input = match waiting {
//!         WaitingReason::None => wait_for_tap(),
//!         WaitingReason::WaitForStage { stage, timeout } => {
//!             wait_for_stage_report(stage, timeout)
//!         }
//!         WaitingReason::WaitForFireworks { timeout, .. } => {
//!             wait_for_dot_report(timeout)
//!         }
//!     };
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`command`]：RenderCommand 定义
//! - [`input`]：SequencerInput 定义
//! - [`state`]：SequencerState 和 WaitingReason 定义
//! - [`stage`]：阶段标识与动画规格
//! - [`config`]：序列配置
//! - [`error`]：错误类型定义
//! - [`runtime`]：执行引擎

pub mod command;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod input;
pub mod runtime;
pub mod snapshot;
pub mod stage;
pub mod state;
pub mod trace;

// 重导出核心类型
pub use command::{IconAsset, LayerId, LayerProperty, RenderCommand};
pub use config::SequenceConfig;
pub use diagnostic::{Diagnostic, DiagnosticLevel, DiagnosticResult, analyze_config, analyze_json};
pub use error::{ConfigError, LikeError, LikeResult};
pub use input::SequencerInput;
pub use runtime::LikeRuntime;
pub use snapshot::{Snapshot, SnapshotError, SnapshotVersion};
pub use stage::{PropertyTrack, StageId, StageSpec, dot_offset};
pub use state::{LayerVisibility, LikeState, Phase, SequencerState, WaitingReason};
pub use trace::{SequenceTrace, TraceCounters, TraceEvent};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // 验证所有公共类型都可以正常使用
        let _cmd = RenderCommand::SetVisibility {
            layer: LayerId::Icon,
            hidden: false,
        };

        let _input = SequencerInput::Tap;

        let _waiting = WaitingReason::None;

        let _state = SequencerState::new();

        let _runtime = LikeRuntime::new();
    }
}
