//! # State 模块
//!
//! 定义 Runtime 的可序列化状态。
//!
//! ## 设计原则
//!
//! - 状态是唯一事实来源：`Phase` 同时扮演阶段指针和重入护栏，
//!   不再维护一个独立的布尔标志（原型中标志与动画回调赛跑，
//!   留下过双击窗口）
//! - 所有字段可序列化，与快照系统对齐
//! - Runtime 不感知真实时间：看门狗时限只是向 Host 声明的上限，
//!   计时由 Host 完成

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::LayerId;
use crate::stage::StageId;

/// 点赞状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LikeState {
    /// 未点赞
    #[default]
    Unliked,
    /// 已点赞
    Liked,
}

impl LikeState {
    /// 是否已点赞
    pub fn is_liked(&self) -> bool {
        matches!(self, LikeState::Liked)
    }

    /// 翻转状态
    pub fn toggled(&self) -> LikeState {
        match self {
            LikeState::Unliked => LikeState::Liked,
            LikeState::Liked => LikeState::Unliked,
        }
    }
}

impl std::fmt::Display for LikeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LikeState::Unliked => write!(f, "unliked"),
            LikeState::Liked => write!(f, "liked"),
        }
    }
}

/// 编排阶段指针
///
/// 记录序列当前推进到哪一环。`Idle` 之外的任何值都意味着
/// 动画进行中，新的点击会被丢弃。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// 空闲（可接受点击）
    #[default]
    Idle,
    /// 图标淡出中
    FadingOut,
    /// 红圆揭示中
    RevealingRed,
    /// 白圆揭示中
    RevealingWhite,
    /// 图标淡入中
    FadingIn,
    /// 烟花迸发中
    Bursting {
        /// 尚未停止的粒子数
        remaining: u8,
    },
}

impl Phase {
    /// 是否空闲
    pub fn is_idle(&self) -> bool {
        matches!(self, Phase::Idle)
    }

    /// 是否处于烟花迸发阶段
    pub fn is_bursting(&self) -> bool {
        matches!(self, Phase::Bursting { .. })
    }

    /// 线性阶段期望的回报阶段
    ///
    /// 烟花阶段并行推进、没有唯一期望值，返回 `None`。
    pub fn expected_stage(&self) -> Option<StageId> {
        match self {
            Phase::FadingOut => Some(StageId::IconFadeOut),
            Phase::RevealingRed => Some(StageId::RedCircleReveal),
            Phase::RevealingWhite => Some(StageId::WhiteCircleReveal),
            Phase::FadingIn => Some(StageId::IconFadeIn),
            Phase::Idle | Phase::Bursting { .. } => None,
        }
    }
}

/// 图层可见性
///
/// Runtime 维护的影子拷贝，用于只在状态真正变化时
/// 下发 `SetVisibility` 指令。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerVisibility {
    /// 图标层是否隐藏
    pub icon_hidden: bool,
    /// 红圆层是否隐藏
    pub red_circle_hidden: bool,
    /// 白圆层是否隐藏
    pub white_circle_hidden: bool,
    /// 烟花层是否隐藏
    pub fireworks_hidden: bool,
}

impl Default for LayerVisibility {
    /// 静止状态：只有图标可见
    fn default() -> Self {
        Self {
            icon_hidden: false,
            red_circle_hidden: true,
            white_circle_hidden: true,
            fireworks_hidden: true,
        }
    }
}

impl LayerVisibility {
    /// 查询图层是否隐藏
    ///
    /// 粒子子层跟随烟花容器层。
    pub fn hidden(&self, layer: LayerId) -> bool {
        match layer.visibility_group() {
            LayerId::Icon => self.icon_hidden,
            LayerId::RedCircle => self.red_circle_hidden,
            LayerId::WhiteCircle => self.white_circle_hidden,
            LayerId::Fireworks | LayerId::Dot(_) => self.fireworks_hidden,
        }
    }

    /// 更新图层可见性，返回值是否发生变化
    pub fn set_hidden(&mut self, layer: LayerId, hidden: bool) -> bool {
        let slot = match layer.visibility_group() {
            LayerId::Icon => &mut self.icon_hidden,
            LayerId::RedCircle => &mut self.red_circle_hidden,
            LayerId::WhiteCircle => &mut self.white_circle_hidden,
            LayerId::Fireworks | LayerId::Dot(_) => &mut self.fireworks_hidden,
        };
        let changed = *slot != hidden;
        *slot = hidden;
        changed
    }
}

/// 等待原因
///
/// Runtime 通过它声明自己在等什么。`WaitFor*` 变体同时携带
/// 看门狗时限：Host 在时限内没有送来对应回报时，
/// 应投递 `WatchdogElapsed` 强制释放序列。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum WaitingReason {
    /// 不等待
    #[default]
    None,

    /// 等待某个线性阶段的回报
    WaitForStage {
        /// 期望回报的阶段
        stage: StageId,
        /// 看门狗时限
        timeout: Duration,
    },

    /// 等待烟花粒子逐个停止
    WaitForFireworks {
        /// 尚未停止的粒子数
        remaining: u8,
        /// 看门狗时限（整场烟花共用）
        timeout: Duration,
    },
}

impl WaitingReason {
    /// 是否处于等待状态
    pub fn is_waiting(&self) -> bool {
        !matches!(self, WaitingReason::None)
    }

    /// 等待线性阶段
    pub fn stage(stage: StageId, timeout: Duration) -> Self {
        WaitingReason::WaitForStage { stage, timeout }
    }

    /// 等待烟花粒子
    pub fn fireworks(remaining: u8, timeout: Duration) -> Self {
        WaitingReason::WaitForFireworks { remaining, timeout }
    }

    /// 看门狗时限（不等待时为 `None`）
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            WaitingReason::None => None,
            WaitingReason::WaitForStage { timeout, .. } => Some(*timeout),
            WaitingReason::WaitForFireworks { timeout, .. } => Some(*timeout),
        }
    }
}

/// Runtime 完整状态
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SequencerState {
    /// 点赞状态
    pub like: LikeState,
    /// 编排阶段指针
    pub phase: Phase,
    /// 图层可见性影子拷贝
    pub layers: LayerVisibility,
    /// 当前等待原因
    pub waiting: WaitingReason,
}

impl SequencerState {
    /// 创建初始状态（未点赞、空闲、只有图标可见）
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否有动画进行中
    pub fn is_animating(&self) -> bool {
        !self.phase.is_idle()
    }

    /// 进入等待状态
    pub fn wait(&mut self, reason: WaitingReason) {
        self.waiting = reason;
    }

    /// 清除等待状态
    pub fn clear_wait(&mut self) {
        self.waiting = WaitingReason::None;
    }
}
