//! # Trace 模块
//!
//! 序列运行轨迹，用于调试回放和宿主侧日志。
//!
//! ## 设计原则
//!
//! - 记录编排的关键节点（点击、阶段起止、看门狗、完成）
//! - 所有数据可序列化，与快照系统对齐
//! - 事件列表有上限，计数器不受淘汰影响

use serde::{Deserialize, Serialize};

use crate::stage::StageId;
use crate::state::LikeState;

/// 轨迹事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceEvent {
    /// 点击被接受（序列启动或立即取消点赞）
    TapAccepted {
        /// 时间戳（Unix 秒）
        timestamp: u64,
    },

    /// 点击被丢弃（动画进行中）
    TapDropped {
        /// 时间戳
        timestamp: u64,
    },

    /// 阶段开始回报
    StageStarted {
        /// 阶段标识
        stage: StageId,
        /// 时间戳
        timestamp: u64,
    },

    /// 阶段停止回报
    StageStopped {
        /// 阶段标识
        stage: StageId,
        /// 是否自然播完（false 表示被中断）
        finished: bool,
        /// 时间戳
        timestamp: u64,
    },

    /// 过期回报被忽略（与当前阶段不匹配）
    NotificationIgnored {
        /// 回报携带的阶段标识
        stage: StageId,
        /// 时间戳
        timestamp: u64,
    },

    /// 看门狗触发，序列被强制释放
    WatchdogFired {
        /// 时间戳
        timestamp: u64,
    },

    /// 序列完成，回到空闲稳态
    SequenceCompleted {
        /// 完成后的点赞状态
        like: LikeState,
        /// 时间戳
        timestamp: u64,
    },
}

impl TraceEvent {
    /// 获取事件时间戳
    pub fn timestamp(&self) -> u64 {
        match self {
            TraceEvent::TapAccepted { timestamp }
            | TraceEvent::TapDropped { timestamp }
            | TraceEvent::StageStarted { timestamp, .. }
            | TraceEvent::StageStopped { timestamp, .. }
            | TraceEvent::NotificationIgnored { timestamp, .. }
            | TraceEvent::WatchdogFired { timestamp }
            | TraceEvent::SequenceCompleted { timestamp, .. } => *timestamp,
        }
    }

    /// 创建点击接受事件
    pub fn tap_accepted() -> Self {
        TraceEvent::TapAccepted {
            timestamp: current_timestamp(),
        }
    }

    /// 创建点击丢弃事件
    pub fn tap_dropped() -> Self {
        TraceEvent::TapDropped {
            timestamp: current_timestamp(),
        }
    }

    /// 创建阶段开始事件
    pub fn stage_started(stage: StageId) -> Self {
        TraceEvent::StageStarted {
            stage,
            timestamp: current_timestamp(),
        }
    }

    /// 创建阶段停止事件
    pub fn stage_stopped(stage: StageId, finished: bool) -> Self {
        TraceEvent::StageStopped {
            stage,
            finished,
            timestamp: current_timestamp(),
        }
    }

    /// 创建过期回报事件
    pub fn notification_ignored(stage: StageId) -> Self {
        TraceEvent::NotificationIgnored {
            stage,
            timestamp: current_timestamp(),
        }
    }

    /// 创建看门狗触发事件
    pub fn watchdog_fired() -> Self {
        TraceEvent::WatchdogFired {
            timestamp: current_timestamp(),
        }
    }

    /// 创建序列完成事件
    pub fn sequence_completed(like: LikeState) -> Self {
        TraceEvent::SequenceCompleted {
            like,
            timestamp: current_timestamp(),
        }
    }
}

impl std::fmt::Display for TraceEvent {
    /// 稳定的单行格式，刻意不含时间戳，便于日志对比
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceEvent::TapAccepted { .. } => write!(f, "tap-accepted"),
            TraceEvent::TapDropped { .. } => write!(f, "tap-dropped"),
            TraceEvent::StageStarted { stage, .. } => write!(f, "stage-started {}", stage),
            TraceEvent::StageStopped {
                stage, finished, ..
            } => {
                let how = if *finished { "ok" } else { "cut" };
                write!(f, "stage-stopped {} {}", stage, how)
            }
            TraceEvent::NotificationIgnored { stage, .. } => {
                write!(f, "notification-ignored {}", stage)
            }
            TraceEvent::WatchdogFired { .. } => write!(f, "watchdog-fired"),
            TraceEvent::SequenceCompleted { like, .. } => {
                write!(f, "sequence-completed {}", like)
            }
        }
    }
}

/// 轨迹计数器
///
/// 事件列表有上限、会淘汰旧条目，计数器则一直累加，
/// 适合做长期运行的健康指标。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraceCounters {
    /// 被接受的点击数
    pub taps_accepted: u32,
    /// 被丢弃的点击数
    pub taps_dropped: u32,
    /// 被忽略的过期回报数
    pub stale_notifications: u32,
    /// 看门狗触发次数
    pub watchdog_releases: u32,
    /// 完成的序列数
    pub sequences_completed: u32,
}

/// 序列运行轨迹容器
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceTrace {
    /// 事件列表（按时间顺序）
    events: Vec<TraceEvent>,
    /// 最大记录数（防止内存无限增长）
    max_events: usize,
    /// 累计计数器
    counters: TraceCounters,
}

impl SequenceTrace {
    /// 默认最大记录数
    pub const DEFAULT_MAX_EVENTS: usize = 256;

    /// 创建新的轨迹
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            max_events: Self::DEFAULT_MAX_EVENTS,
            counters: TraceCounters::default(),
        }
    }

    /// 设置最大记录数
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// 添加事件
    pub fn push(&mut self, event: TraceEvent) {
        match &event {
            TraceEvent::TapAccepted { .. } => self.counters.taps_accepted += 1,
            TraceEvent::TapDropped { .. } => self.counters.taps_dropped += 1,
            TraceEvent::NotificationIgnored { .. } => self.counters.stale_notifications += 1,
            TraceEvent::WatchdogFired { .. } => self.counters.watchdog_releases += 1,
            TraceEvent::SequenceCompleted { .. } => self.counters.sequences_completed += 1,
            TraceEvent::StageStarted { .. } | TraceEvent::StageStopped { .. } => {}
        }

        self.events.push(event);

        // 如果超过最大数量，移除最早的事件
        while self.events.len() > self.max_events {
            self.events.remove(0);
        }
    }

    /// 获取所有事件
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// 获取累计计数器
    pub fn counters(&self) -> &TraceCounters {
        &self.counters
    }

    /// 按稳定格式逐行渲染全部事件
    pub fn render(&self) -> String {
        self.events
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 清空轨迹（事件与计数器一并清零）
    pub fn clear(&mut self) {
        self.events.clear();
        self.counters = TraceCounters::default();
    }

    /// 获取事件总数
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// 获取当前时间戳（Unix 秒）
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
