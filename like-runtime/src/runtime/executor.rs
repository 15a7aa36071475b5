//! # Executor 模块
//!
//! 将编排节点转换为 RenderCommand。
//!
//! ## 职责
//!
//! - 产生阶段对应的指令（播放、可见性、属性复位）
//! - 维护图层可见性影子拷贝与点赞状态的写入
//! - 决定下一步的等待原因
//!
//! 阶段图本身（"接下来轮到谁"）由 [`engine`](super::engine) 掌管，
//! Executor 只回答"这一步要向 Host 说什么"。

use crate::command::{IconAsset, LayerId, LayerProperty, RenderCommand};
use crate::config::SequenceConfig;
use crate::stage::StageId;
use crate::state::{SequencerState, WaitingReason};

/// 执行结果
pub struct ExecuteResult {
    /// 产生的指令
    pub commands: Vec<RenderCommand>,
    /// 新的等待原因（`None` 表示维持原状；
    /// `Some(WaitingReason::None)` 表示明确解除等待）
    pub waiting: Option<WaitingReason>,
}

impl ExecuteResult {
    /// 创建空结果
    pub(crate) fn empty() -> Self {
        Self {
            commands: Vec::new(),
            waiting: None,
        }
    }

    /// 创建带指令的结果
    pub(crate) fn with_commands(commands: Vec<RenderCommand>) -> Self {
        Self {
            commands,
            waiting: None,
        }
    }

    /// 创建带等待的结果
    pub(crate) fn with_wait(commands: Vec<RenderCommand>, waiting: WaitingReason) -> Self {
        Self {
            commands,
            waiting: Some(waiting),
        }
    }
}

/// 编排执行器
///
/// 无自有状态，所有写入都落在传入的 [`SequencerState`] 上。
pub struct Executor {}

impl Executor {
    /// 创建新的执行器
    pub fn new() -> Self {
        Self {}
    }

    /// 起手：点赞序列从图标淡出开始
    pub fn begin_like_sequence(
        &self,
        config: &SequenceConfig,
        _state: &mut SequencerState,
    ) -> ExecuteResult {
        let stage = StageId::IconFadeOut;
        ExecuteResult::with_wait(
            vec![RenderCommand::PlayStage {
                spec: config.stage_spec(stage),
            }],
            WaitingReason::stage(stage, config.stage_timeout(stage)),
        )
    }

    /// 取消点赞：立即翻转，不播放任何阶段
    ///
    /// 原型中只有"变为点赞"的方向有装饰动画，
    /// 反方向是同步完成的单步操作。
    pub fn toggle_unliked(&self, state: &mut SequencerState) -> ExecuteResult {
        state.like = state.like.toggled();
        ExecuteResult::with_commands(vec![RenderCommand::SwapIcon {
            asset: IconAsset::for_state(state.like),
        }])
    }

    /// 阶段开始的即时效果
    ///
    /// 对应原型 `animationDidStart` 的分支：揭示类阶段在开始瞬间
    /// 取消隐藏自己的图层；图标淡入开始时同时翻转点赞状态并换图。
    /// 烟花粒子共享容器层，只有第一个粒子的开始会真正下发指令。
    pub fn apply_start_effects(&self, stage: StageId, state: &mut SequencerState) -> ExecuteResult {
        let mut commands = Vec::new();

        match stage {
            // 图标本来就可见，淡出的开始没有额外效果
            StageId::IconFadeOut => {}
            StageId::RedCircleReveal => {
                set_layer_hidden(state, LayerId::RedCircle, false, &mut commands);
            }
            StageId::WhiteCircleReveal => {
                set_layer_hidden(state, LayerId::WhiteCircle, false, &mut commands);
            }
            StageId::IconFadeIn => {
                set_layer_hidden(state, LayerId::Icon, false, &mut commands);
                state.like = state.like.toggled();
                commands.push(RenderCommand::SwapIcon {
                    asset: IconAsset::for_state(state.like),
                });
            }
            StageId::FireworkDot { .. } => {
                set_layer_hidden(state, LayerId::Fireworks, false, &mut commands);
            }
        }

        ExecuteResult::with_commands(commands)
    }

    /// 某个线性阶段停止后的收尾与下一步派发
    ///
    /// 对应原型 `animationDidStop` 的分支。烟花粒子的停止不走这里，
    /// 由倒数计数归零后的 [`complete_burst`](Self::complete_burst) 收尾。
    pub fn advance_after(
        &self,
        stage: StageId,
        config: &SequenceConfig,
        state: &mut SequencerState,
    ) -> ExecuteResult {
        let mut commands = Vec::new();

        match stage {
            StageId::IconFadeOut => {
                // 图标藏起来等待淡入，顺手把透明度复位
                set_layer_hidden(state, LayerId::Icon, true, &mut commands);
                commands.push(RenderCommand::SetProperty {
                    layer: LayerId::Icon,
                    property: LayerProperty::Opacity,
                    value: 1.0,
                });
                self.dispatch(StageId::RedCircleReveal, config, commands)
            }
            StageId::RedCircleReveal => self.dispatch(StageId::WhiteCircleReveal, config, commands),
            StageId::WhiteCircleReveal => {
                set_layer_hidden(state, LayerId::RedCircle, true, &mut commands);
                set_layer_hidden(state, LayerId::WhiteCircle, true, &mut commands);
                self.dispatch(StageId::IconFadeIn, config, commands)
            }
            StageId::IconFadeIn => {
                // 全部粒子一起开播
                for spec in config.firework_specs() {
                    commands.push(RenderCommand::PlayStage { spec });
                }
                ExecuteResult::with_wait(
                    commands,
                    WaitingReason::fireworks(config.dot_count, config.burst_timeout()),
                )
            }
            StageId::FireworkDot { .. } => ExecuteResult::empty(),
        }
    }

    /// 烟花推进：还有粒子在飞，只刷新等待中的剩余数
    pub fn burst_progress(&self, remaining: u8, config: &SequenceConfig) -> ExecuteResult {
        ExecuteResult::with_wait(
            Vec::new(),
            WaitingReason::fireworks(remaining, config.burst_timeout()),
        )
    }

    /// 最后一个粒子停止后的终态清理
    ///
    /// 隐藏烟花层并把每个粒子的属性复位，对应原型的
    /// `removeAllAnimations`（动画移除后图层回到模型值）。
    pub fn complete_burst(
        &self,
        config: &SequenceConfig,
        state: &mut SequencerState,
    ) -> ExecuteResult {
        let mut commands = Vec::new();
        set_layer_hidden(state, LayerId::Fireworks, true, &mut commands);
        reset_dots(config, &mut commands);
        ExecuteResult::with_wait(commands, WaitingReason::None)
    }

    /// 看门狗强制复位：回到当前点赞状态的稳态画面
    ///
    /// 无条件复位全部瞬态图层；点赞状态保持序列已推进到的值。
    pub fn force_reset(
        &self,
        config: &SequenceConfig,
        state: &mut SequencerState,
    ) -> ExecuteResult {
        let mut commands = Vec::new();

        set_layer_hidden(state, LayerId::RedCircle, true, &mut commands);
        set_layer_hidden(state, LayerId::WhiteCircle, true, &mut commands);
        set_layer_hidden(state, LayerId::Fireworks, true, &mut commands);

        set_layer_hidden(state, LayerId::Icon, false, &mut commands);
        commands.push(RenderCommand::SetProperty {
            layer: LayerId::Icon,
            property: LayerProperty::Opacity,
            value: 1.0,
        });
        commands.push(RenderCommand::SetProperty {
            layer: LayerId::Icon,
            property: LayerProperty::Scale,
            value: 1.0,
        });
        commands.push(RenderCommand::SwapIcon {
            asset: IconAsset::for_state(state.like),
        });

        reset_dots(config, &mut commands);

        ExecuteResult::with_wait(commands, WaitingReason::None)
    }

    /// 追加一个线性阶段的播放指令并给出等待原因
    fn dispatch(
        &self,
        stage: StageId,
        config: &SequenceConfig,
        mut commands: Vec<RenderCommand>,
    ) -> ExecuteResult {
        commands.push(RenderCommand::PlayStage {
            spec: config.stage_spec(stage),
        });
        ExecuteResult::with_wait(
            commands,
            WaitingReason::stage(stage, config.stage_timeout(stage)),
        )
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

/// 更新影子拷贝，真正变化时才下发可见性指令
fn set_layer_hidden(
    state: &mut SequencerState,
    layer: LayerId,
    hidden: bool,
    commands: &mut Vec<RenderCommand>,
) {
    if state.layers.set_hidden(layer, hidden) {
        commands.push(RenderCommand::SetVisibility { layer, hidden });
    }
}

/// 把每个粒子的全部属性复位到静止值
fn reset_dots(config: &SequenceConfig, commands: &mut Vec<RenderCommand>) {
    for index in 0..config.dot_count {
        let layer = LayerId::Dot(index);
        for (property, value) in [
            (LayerProperty::Opacity, 1.0),
            (LayerProperty::Scale, 1.0),
            (LayerProperty::PositionX, 0.0),
            (LayerProperty::PositionY, 0.0),
        ] {
            commands.push(RenderCommand::SetProperty {
                layer,
                property,
                value,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LikeState;

    fn setup() -> (Executor, SequenceConfig, SequencerState) {
        (
            Executor::new(),
            SequenceConfig::default(),
            SequencerState::new(),
        )
    }

    #[test]
    fn test_begin_plays_fade_out() {
        let (executor, config, mut state) = setup();

        let result = executor.begin_like_sequence(&config, &mut state);

        assert_eq!(result.commands.len(), 1);
        assert!(matches!(
            &result.commands[0],
            RenderCommand::PlayStage { spec } if spec.stage == StageId::IconFadeOut
        ));
        assert!(matches!(
            result.waiting,
            Some(WaitingReason::WaitForStage {
                stage: StageId::IconFadeOut,
                ..
            })
        ));
    }

    #[test]
    fn test_toggle_unliked_swaps_icon_only() {
        let (executor, _config, mut state) = setup();
        state.like = LikeState::Liked;

        let result = executor.toggle_unliked(&mut state);

        assert_eq!(state.like, LikeState::Unliked);
        assert_eq!(
            result.commands,
            vec![RenderCommand::SwapIcon {
                asset: IconAsset::Outline
            }]
        );
        assert!(result.waiting.is_none());
    }

    #[test]
    fn test_start_effects_reveal_circle_once() {
        let (executor, _config, mut state) = setup();

        let result = executor.apply_start_effects(StageId::RedCircleReveal, &mut state);
        assert_eq!(
            result.commands,
            vec![RenderCommand::SetVisibility {
                layer: LayerId::RedCircle,
                hidden: false
            }]
        );

        // 影子拷贝已更新，重复开始不再产生指令
        let result = executor.apply_start_effects(StageId::RedCircleReveal, &mut state);
        assert!(result.commands.is_empty());
    }

    #[test]
    fn test_start_effects_fade_in_toggles_like() {
        let (executor, _config, mut state) = setup();
        state.layers.set_hidden(LayerId::Icon, true);

        let result = executor.apply_start_effects(StageId::IconFadeIn, &mut state);

        assert_eq!(state.like, LikeState::Liked);
        assert_eq!(
            result.commands,
            vec![
                RenderCommand::SetVisibility {
                    layer: LayerId::Icon,
                    hidden: false
                },
                RenderCommand::SwapIcon {
                    asset: IconAsset::Filled
                },
            ]
        );
    }

    #[test]
    fn test_only_first_dot_reveals_fireworks() {
        let (executor, _config, mut state) = setup();

        let result = executor.apply_start_effects(StageId::FireworkDot { index: 0 }, &mut state);
        assert_eq!(
            result.commands,
            vec![RenderCommand::SetVisibility {
                layer: LayerId::Fireworks,
                hidden: false
            }]
        );

        let result = executor.apply_start_effects(StageId::FireworkDot { index: 1 }, &mut state);
        assert!(result.commands.is_empty());
    }

    #[test]
    fn test_advance_after_fade_out() {
        let (executor, config, mut state) = setup();

        let result = executor.advance_after(StageId::IconFadeOut, &config, &mut state);

        // 藏图标、复位透明度、派发红圆
        assert_eq!(
            result.commands[0],
            RenderCommand::SetVisibility {
                layer: LayerId::Icon,
                hidden: true
            }
        );
        assert_eq!(
            result.commands[1],
            RenderCommand::SetProperty {
                layer: LayerId::Icon,
                property: LayerProperty::Opacity,
                value: 1.0
            }
        );
        assert!(matches!(
            &result.commands[2],
            RenderCommand::PlayStage { spec } if spec.stage == StageId::RedCircleReveal
        ));
        assert!(matches!(
            result.waiting,
            Some(WaitingReason::WaitForStage {
                stage: StageId::RedCircleReveal,
                ..
            })
        ));
    }

    #[test]
    fn test_advance_after_white_circle_hides_both() {
        let (executor, config, mut state) = setup();
        state.layers.set_hidden(LayerId::RedCircle, false);
        state.layers.set_hidden(LayerId::WhiteCircle, false);

        let result = executor.advance_after(StageId::WhiteCircleReveal, &config, &mut state);

        assert!(state.layers.red_circle_hidden);
        assert!(state.layers.white_circle_hidden);
        assert!(matches!(
            result.commands.last(),
            Some(RenderCommand::PlayStage { spec }) if spec.stage == StageId::IconFadeIn
        ));
    }

    #[test]
    fn test_advance_after_fade_in_starts_all_dots() {
        let (executor, config, mut state) = setup();

        let result = executor.advance_after(StageId::IconFadeIn, &config, &mut state);

        let plays: Vec<_> = result
            .commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::PlayStage { spec } => Some(spec.stage),
                _ => None,
            })
            .collect();
        assert_eq!(plays.len(), usize::from(config.dot_count));
        assert_eq!(plays[0], StageId::FireworkDot { index: 0 });
        assert_eq!(plays[7], StageId::FireworkDot { index: 7 });

        assert!(matches!(
            result.waiting,
            Some(WaitingReason::WaitForFireworks { remaining: 8, .. })
        ));
    }

    #[test]
    fn test_complete_burst_hides_and_resets() {
        let (executor, config, mut state) = setup();
        state.layers.set_hidden(LayerId::Fireworks, false);

        let result = executor.complete_burst(&config, &mut state);

        assert!(state.layers.fireworks_hidden);
        assert_eq!(
            result.commands[0],
            RenderCommand::SetVisibility {
                layer: LayerId::Fireworks,
                hidden: true
            }
        );
        // 每个粒子四条属性复位
        let resets = result
            .commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::SetProperty { .. }))
            .count();
        assert_eq!(resets, usize::from(config.dot_count) * 4);
        assert_eq!(result.waiting, Some(WaitingReason::None));
    }

    #[test]
    fn test_force_reset_restores_steady_view() {
        let (executor, config, mut state) = setup();
        state.like = LikeState::Liked;
        state.layers.set_hidden(LayerId::Icon, true);
        state.layers.set_hidden(LayerId::RedCircle, false);

        let result = executor.force_reset(&config, &mut state);

        assert_eq!(state.layers, crate::state::LayerVisibility::default());
        assert!(result.commands.contains(&RenderCommand::SwapIcon {
            asset: IconAsset::Filled
        }));
        assert!(result.commands.contains(&RenderCommand::SetVisibility {
            layer: LayerId::Icon,
            hidden: false
        }));
        assert_eq!(result.waiting, Some(WaitingReason::None));
    }
}
