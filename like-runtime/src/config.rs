//! # Config 模块
//!
//! 序列参数配置。
//!
//! 默认值取自原型的观感：四个主阶段各 0.15 秒，
//! 烟花时长翻倍，8 个粒子，位移基准 5 个单位。
//! 所有参数都可以通过 JSON 配置档调整，缺省字段回落到默认值。

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::LayerProperty;
use crate::error::ConfigError;
use crate::stage::{PropertyTrack, StageId, StageSpec, dot_offset};

/// 主阶段默认时长（秒）
pub const DEFAULT_STAGE_DURATION: f32 = 0.15;

/// 默认粒子数
pub const DEFAULT_DOT_COUNT: u8 = 8;

/// 序列配置
///
/// 时长与几何参数的集合。Runtime 在构造时校验一次，
/// 之后按值使用，播放过程中不再产生配置错误。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// 四个主阶段共用的时长（秒）
    pub stage_duration: f32,
    /// 烟花粒子时长（秒），原型为主阶段的两倍
    pub firework_duration: f32,
    /// 烟花粒子数
    pub dot_count: u8,
    /// 粒子位移基准（第 0 个粒子的位移为 `(-dot_travel, -dot_travel)`）
    pub dot_travel: f32,
    /// 粒子终点缩放
    pub dot_end_scale: f32,
    /// 看门狗系数：阶段时限 = 阶段时长 × 系数
    pub watchdog_factor: u32,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            stage_duration: DEFAULT_STAGE_DURATION,
            firework_duration: DEFAULT_STAGE_DURATION * 2.0,
            dot_count: DEFAULT_DOT_COUNT,
            dot_travel: 5.0,
            dot_end_scale: 1.5,
            watchdog_factor: 4,
        }
    }
}

impl SequenceConfig {
    /// 设置主阶段时长
    pub fn with_stage_duration(mut self, seconds: f32) -> Self {
        self.stage_duration = seconds;
        self
    }

    /// 设置烟花时长
    pub fn with_firework_duration(mut self, seconds: f32) -> Self {
        self.firework_duration = seconds;
        self
    }

    /// 设置粒子数
    pub fn with_dot_count(mut self, count: u8) -> Self {
        self.dot_count = count;
        self
    }

    /// 设置看门狗系数
    pub fn with_watchdog_factor(mut self, factor: u32) -> Self {
        self.watchdog_factor = factor;
        self
    }

    /// 校验配置
    ///
    /// 返回第一个发现的错误。完整的分级检查见
    /// [`crate::diagnostic::analyze_config`]。
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("stage_duration", self.stage_duration),
            ("firework_duration", self.firework_duration),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteValue { field, value });
            }
            if value <= 0.0 {
                return Err(ConfigError::NonPositiveDuration { field, value });
            }
        }

        for (field, value) in [
            ("dot_travel", self.dot_travel),
            ("dot_end_scale", self.dot_end_scale),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteValue { field, value });
            }
        }

        if self.dot_count == 0 {
            return Err(ConfigError::ZeroDotCount);
        }
        if self.watchdog_factor == 0 {
            return Err(ConfigError::ZeroWatchdogFactor);
        }

        Ok(())
    }

    /// 从 JSON 字符串加载并校验
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SequenceConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 阶段时长（秒）
    pub fn duration_of(&self, stage: StageId) -> f32 {
        if stage.is_firework() {
            self.firework_duration
        } else {
            self.stage_duration
        }
    }

    /// 阶段的看门狗时限
    ///
    /// 时长与系数的乘积超出 [`Duration`] 表示范围时饱和到最大时限。
    pub fn stage_timeout(&self, stage: StageId) -> Duration {
        Duration::try_from_secs_f32(self.duration_of(stage) * self.watchdog_factor as f32)
            .unwrap_or(Duration::MAX)
    }

    /// 整场烟花的看门狗时限（超界同样饱和）
    pub fn burst_timeout(&self) -> Duration {
        Duration::try_from_secs_f32(self.firework_duration * self.watchdog_factor as f32)
            .unwrap_or(Duration::MAX)
    }

    /// 构造阶段描述
    pub fn stage_spec(&self, stage: StageId) -> StageSpec {
        let tracks = match stage {
            StageId::IconFadeOut => {
                vec![PropertyTrack::new(LayerProperty::Opacity, 1.0, 0.0)]
            }
            StageId::RedCircleReveal | StageId::WhiteCircleReveal => {
                vec![PropertyTrack::new(LayerProperty::Scale, 0.0, 1.0)]
            }
            StageId::IconFadeIn => {
                vec![PropertyTrack::new(LayerProperty::Scale, 0.0, 1.0)]
            }
            StageId::FireworkDot { index } => {
                let (dx, dy) = dot_offset(index, self.dot_count, self.dot_travel);
                vec![
                    PropertyTrack::new(LayerProperty::Opacity, 1.0, 0.0),
                    PropertyTrack::new(LayerProperty::Scale, 0.0, self.dot_end_scale),
                    PropertyTrack::new(LayerProperty::PositionX, 0.0, dx),
                    PropertyTrack::new(LayerProperty::PositionY, 0.0, dy),
                ]
            }
        };

        StageSpec {
            stage,
            layer: stage.layer(),
            duration: self.duration_of(stage),
            tracks,
        }
    }

    /// 构造整场烟花的全部阶段描述（按粒子索引排序）
    pub fn firework_specs(&self) -> Vec<StageSpec> {
        (0..self.dot_count)
            .map(|index| self.stage_spec(StageId::FireworkDot { index }))
            .collect()
    }
}
