//! # Engine 模块
//!
//! 点赞编排引擎核心。
//!
//! ## 执行模型
//!
//! ```text
//! tick(input) -> (Vec<RenderCommand>, WaitingReason)
//! ```
//!
//! 1. 点击：空闲时启动序列（或立即取消点赞），忙时丢弃
//! 2. 起止回报：与当前阶段比对，匹配则施加效果并派发下一步
//! 3. 看门狗：等待超时时强制回到空闲稳态
//!
//! 原型把这套推进逻辑摊在一组动画代理回调里，靠附在动画对象上的
//! 字符串键认领回调；这里收拢成一台显式状态机，回报自带类型化的
//! 阶段标识，每个箭头只在对应阶段的停止回报上触发。

use crate::command::RenderCommand;
use crate::config::SequenceConfig;
use crate::error::{ConfigError, LikeResult};
use crate::input::SequencerInput;
use crate::runtime::executor::{ExecuteResult, Executor};
use crate::snapshot::Snapshot;
use crate::stage::StageId;
use crate::state::{LikeState, Phase, SequencerState, WaitingReason};
use crate::trace::{SequenceTrace, TraceEvent};

/// 点赞编排引擎
///
/// 这是 like-runtime 的核心类型，负责把点击翻译成一条
/// 确定性的、不重叠的视觉效果链。
///
/// # 使用示例
///
/// ```ignore
/// let mut runtime = LikeRuntime::new();
///
/// loop {
///     let (commands, waiting) = runtime.tick(input);
///
///     // Host 执行 commands，播放动画并回报起止...
///
///     // waiting 携带看门狗时限，超时则投递 WatchdogElapsed...
/// }
/// ```
pub struct LikeRuntime {
    /// 序列配置
    config: SequenceConfig,
    /// 运行时状态
    state: SequencerState,
    /// 编排执行器
    executor: Executor,
    /// 运行轨迹
    trace: SequenceTrace,
}

impl LikeRuntime {
    /// 用默认配置创建 Runtime 实例
    pub fn new() -> Self {
        // 默认配置恒为合法，跳过校验
        Self {
            config: SequenceConfig::default(),
            state: SequencerState::new(),
            executor: Executor::new(),
            trace: SequenceTrace::new(),
        }
    }

    /// 用指定配置创建 Runtime 实例
    ///
    /// # 参数
    ///
    /// - `config`: 序列配置，构造时校验一次
    pub fn with_config(config: SequenceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: SequencerState::new(),
            executor: Executor::new(),
            trace: SequenceTrace::new(),
        })
    }

    /// 从 JSON 配置档创建 Runtime 实例
    pub fn from_profile_json(json: &str) -> LikeResult<Self> {
        let config = SequenceConfig::from_json(json)?;
        Ok(Self::with_config(config)?)
    }

    /// 核心驱动函数
    ///
    /// 根据输入推进编排，返回产生的指令和新的等待状态。
    /// 不会失败：唯一建模的异常（无法识别的阶段回报）按约定
    /// 静默丢弃并计入轨迹计数器。
    ///
    /// # 参数
    ///
    /// - `input`: Host 传入的输入事件
    ///
    /// # 返回
    ///
    /// - `Vec<RenderCommand>`: 本次 tick 产生的所有指令
    /// - `WaitingReason`: 新的等待状态（含看门狗时限）
    pub fn tick(&mut self, input: SequencerInput) -> (Vec<RenderCommand>, WaitingReason) {
        let result = match input {
            SequencerInput::Tap => self.handle_tap(),
            SequencerInput::StageStarted { stage } => self.handle_started(stage),
            SequencerInput::StageStopped { stage, finished } => {
                self.handle_stopped(stage, finished)
            }
            SequencerInput::WatchdogElapsed => self.handle_watchdog(),
        };

        if let Some(waiting) = result.waiting {
            self.state.wait(waiting);
        }

        (result.commands, self.state.waiting.clone())
    }

    /// 处理点击
    fn handle_tap(&mut self) -> ExecuteResult {
        // 重入护栏：序列进行中的点击直接丢弃，不排队、不延迟
        if self.state.is_animating() {
            self.trace.push(TraceEvent::tap_dropped());
            return ExecuteResult::empty();
        }

        self.trace.push(TraceEvent::tap_accepted());

        match self.state.like {
            // 取消点赞是单步同步操作，护栏全程不抬起
            LikeState::Liked => {
                let result = self.executor.toggle_unliked(&mut self.state);
                self.trace
                    .push(TraceEvent::sequence_completed(self.state.like));
                result
            }
            // 点赞序列在点击当下就抬起护栏，不等第一个开始回报
            LikeState::Unliked => {
                self.state.phase = Phase::FadingOut;
                self.executor.begin_like_sequence(&self.config, &mut self.state)
            }
        }
    }

    /// 处理阶段开始回报
    fn handle_started(&mut self, stage: StageId) -> ExecuteResult {
        if !self.recognizes(stage) {
            self.trace.push(TraceEvent::notification_ignored(stage));
            return ExecuteResult::empty();
        }

        self.trace.push(TraceEvent::stage_started(stage));
        self.executor.apply_start_effects(stage, &mut self.state)
    }

    /// 处理阶段停止回报
    ///
    /// `finished` 只进轨迹，不改变推进：原型从不检查这个标志，
    /// 被移除的动画与播完的动画走同一条收尾路径。
    fn handle_stopped(&mut self, stage: StageId, finished: bool) -> ExecuteResult {
        if !self.recognizes(stage) {
            self.trace.push(TraceEvent::notification_ignored(stage));
            return ExecuteResult::empty();
        }

        self.trace.push(TraceEvent::stage_stopped(stage, finished));

        match self.state.phase {
            Phase::Bursting { remaining } => {
                // 显式倒数：清理只在最后一个粒子停止后发生一次
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.state.phase = Phase::Idle;
                    let result = self.executor.complete_burst(&self.config, &mut self.state);
                    self.trace
                        .push(TraceEvent::sequence_completed(self.state.like));
                    result
                } else {
                    self.state.phase = Phase::Bursting { remaining };
                    self.executor.burst_progress(remaining, &self.config)
                }
            }
            phase => {
                self.state.phase = match phase {
                    Phase::FadingOut => Phase::RevealingRed,
                    Phase::RevealingRed => Phase::RevealingWhite,
                    Phase::RevealingWhite => Phase::FadingIn,
                    Phase::FadingIn => Phase::Bursting {
                        remaining: self.config.dot_count,
                    },
                    // recognizes 已排除空闲与烟花
                    Phase::Idle | Phase::Bursting { .. } => phase,
                };
                self.executor.advance_after(stage, &self.config, &mut self.state)
            }
        }
    }

    /// 处理看门狗超时
    fn handle_watchdog(&mut self) -> ExecuteResult {
        // 空闲时的超时是 Host 侧的过期计时器，无事可做
        if self.state.phase.is_idle() {
            return ExecuteResult::empty();
        }

        self.trace.push(TraceEvent::watchdog_fired());
        self.state.phase = Phase::Idle;
        self.executor.force_reset(&self.config, &mut self.state)
    }

    /// 回报是否与当前阶段匹配
    ///
    /// 线性阶段要求精确对应；烟花阶段接受索引在配置范围内的
    /// 任意粒子。其余组合（含空闲时的一切回报）一律不认。
    fn recognizes(&self, stage: StageId) -> bool {
        match self.state.phase {
            Phase::Bursting { .. } => {
                matches!(stage, StageId::FireworkDot { index } if index < self.config.dot_count)
            }
            phase => phase.expected_stage() == Some(stage),
        }
    }

    /// 生成让 Host 画面与当前稳态对齐的指令
    ///
    /// 初始化或恢复快照后调用。只描述稳态：图层可见性、
    /// 图标属性与素材，不含任何播放指令。
    pub fn sync_commands(&self) -> Vec<RenderCommand> {
        use crate::command::{IconAsset, LayerId, LayerProperty};

        let layers = &self.state.layers;
        vec![
            RenderCommand::SetVisibility {
                layer: LayerId::Icon,
                hidden: layers.icon_hidden,
            },
            RenderCommand::SetVisibility {
                layer: LayerId::RedCircle,
                hidden: layers.red_circle_hidden,
            },
            RenderCommand::SetVisibility {
                layer: LayerId::WhiteCircle,
                hidden: layers.white_circle_hidden,
            },
            RenderCommand::SetVisibility {
                layer: LayerId::Fireworks,
                hidden: layers.fireworks_hidden,
            },
            RenderCommand::SetProperty {
                layer: LayerId::Icon,
                property: LayerProperty::Opacity,
                value: 1.0,
            },
            RenderCommand::SetProperty {
                layer: LayerId::Icon,
                property: LayerProperty::Scale,
                value: 1.0,
            },
            RenderCommand::SwapIcon {
                asset: IconAsset::for_state(self.state.like),
            },
        ]
    }

    /// 生成当前点赞状态的快照
    ///
    /// 只持久化点赞结果；进行中的编排是瞬态的，不进快照。
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.state.like)
    }

    /// 从快照恢复
    ///
    /// 编排一律回到空闲稳态。返回的指令让 Host 画面与
    /// 恢复后的稳态对齐。
    pub fn restore(&mut self, snapshot: &Snapshot) -> Vec<RenderCommand> {
        self.state = SequencerState::new();
        self.state.like = snapshot.like;
        self.sync_commands()
    }

    /// 从 JSON 快照恢复
    pub fn restore_json(&mut self, json: &str) -> LikeResult<Vec<RenderCommand>> {
        let snapshot = Snapshot::from_json(json)?;
        Ok(self.restore(&snapshot))
    }

    /// 获取当前状态
    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    /// 获取当前点赞状态
    pub fn like(&self) -> LikeState {
        self.state.like
    }

    /// 是否有序列进行中（重入护栏）
    pub fn is_animating(&self) -> bool {
        self.state.is_animating()
    }

    /// 获取当前等待状态
    pub fn waiting(&self) -> &WaitingReason {
        &self.state.waiting
    }

    /// 获取序列配置
    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    /// 获取运行轨迹
    pub fn trace(&self) -> &SequenceTrace {
        &self.trace
    }
}

impl Default for LikeRuntime {
    fn default() -> Self {
        Self::new()
    }
}
