//! # Stage 模块
//!
//! 定义动画阶段的标识与描述。
//!
//! 点赞动画是一条固定编排：
//!
//! ```text
//! icon-fade-out → red-circle-reveal → white-circle-reveal → icon-fade-in → firework-dot × N
//! ```
//!
//! 前四个阶段串行推进，N 个烟花粒子在最后并行收尾。
//! 每个阶段由一个 [`StageSpec`] 完整描述：目标图层、时长、
//! 若干条同步推进的属性轨道（对应原型中的动画组）。

use serde::{Deserialize, Serialize};

use crate::command::{LayerId, LayerProperty};

/// 动画阶段标识
///
/// 带类型的阶段标签，取代原型中易拼错的字符串动画键。
/// 烟花粒子按索引区分，索引范围由配置的粒子数决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageId {
    /// 图标淡出
    IconFadeOut,
    /// 红圆揭示
    RedCircleReveal,
    /// 白圆揭示
    WhiteCircleReveal,
    /// 图标淡入
    IconFadeIn,
    /// 烟花粒子（索引从 0 开始）
    FireworkDot {
        /// 粒子索引
        index: u8,
    },
}

impl StageId {
    /// 阶段作用的图层
    pub fn layer(&self) -> LayerId {
        match self {
            StageId::IconFadeOut | StageId::IconFadeIn => LayerId::Icon,
            StageId::RedCircleReveal => LayerId::RedCircle,
            StageId::WhiteCircleReveal => LayerId::WhiteCircle,
            StageId::FireworkDot { index } => LayerId::Dot(*index),
        }
    }

    /// 是否为烟花粒子阶段
    pub fn is_firework(&self) -> bool {
        matches!(self, StageId::FireworkDot { .. })
    }

    /// 从稳定名称解析阶段标识
    ///
    /// 接受 [`std::fmt::Display`] 输出的格式，
    /// 如 `icon-fade-out`、`firework-dot#3`。
    /// 无法识别时返回 `None`。
    pub fn parse(text: &str) -> Option<StageId> {
        match text {
            "icon-fade-out" => Some(StageId::IconFadeOut),
            "red-circle-reveal" => Some(StageId::RedCircleReveal),
            "white-circle-reveal" => Some(StageId::WhiteCircleReveal),
            "icon-fade-in" => Some(StageId::IconFadeIn),
            other => {
                let index = other.strip_prefix("firework-dot#")?;
                let index = index.parse::<u8>().ok()?;
                Some(StageId::FireworkDot { index })
            }
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageId::IconFadeOut => write!(f, "icon-fade-out"),
            StageId::RedCircleReveal => write!(f, "red-circle-reveal"),
            StageId::WhiteCircleReveal => write!(f, "white-circle-reveal"),
            StageId::IconFadeIn => write!(f, "icon-fade-in"),
            StageId::FireworkDot { index } => write!(f, "firework-dot#{}", index),
        }
    }
}

/// 属性轨道
///
/// 阶段播放期间，属性从 `from` 匀速推进到 `to`。
/// 插值方式由 Host 决定，Runtime 只约定端点。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyTrack {
    /// 目标属性
    pub property: LayerProperty,
    /// 起始值
    pub from: f32,
    /// 结束值
    pub to: f32,
}

impl PropertyTrack {
    /// 创建属性轨道
    pub fn new(property: LayerProperty, from: f32, to: f32) -> Self {
        Self { property, from, to }
    }
}

/// 阶段描述
///
/// `PlayStage` 指令的载荷：一个阶段的全部播放参数。
/// 同一阶段的多条轨道共享时长、同时起止（对应原型中的动画组）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    /// 阶段标识
    pub stage: StageId,
    /// 目标图层
    pub layer: LayerId,
    /// 时长（秒）
    pub duration: f32,
    /// 属性轨道
    pub tracks: Vec<PropertyTrack>,
}

/// 计算粒子位移终点
///
/// 基准位移为 `(-travel, -travel)`，第 `index` 个粒子绕静止位置
/// 旋转 `index * 2π / count` 得到自己的位移向量。
/// 原型中由复制层完成这次旋转，这里把每个粒子的轨迹算成显式值。
pub fn dot_offset(index: u8, count: u8, travel: f32) -> (f32, f32) {
    let count = count.max(1);
    let theta = index as f32 * std::f32::consts::TAU / count as f32;
    let (sin, cos) = theta.sin_cos();
    let (x, y) = (-travel, -travel);
    (x * cos - y * sin, x * sin + y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "期望 {expected}，实际 {actual}"
        );
    }

    #[test]
    fn test_stage_layer_mapping() {
        assert_eq!(StageId::IconFadeOut.layer(), LayerId::Icon);
        assert_eq!(StageId::RedCircleReveal.layer(), LayerId::RedCircle);
        assert_eq!(StageId::WhiteCircleReveal.layer(), LayerId::WhiteCircle);
        assert_eq!(StageId::IconFadeIn.layer(), LayerId::Icon);
        assert_eq!(StageId::FireworkDot { index: 5 }.layer(), LayerId::Dot(5));
    }

    #[test]
    fn test_stage_display_parse_round_trip() {
        let stages = [
            StageId::IconFadeOut,
            StageId::RedCircleReveal,
            StageId::WhiteCircleReveal,
            StageId::IconFadeIn,
            StageId::FireworkDot { index: 7 },
        ];

        for stage in stages {
            let name = stage.to_string();
            assert_eq!(StageId::parse(&name), Some(stage), "解析失败: {name}");
        }
    }

    #[test]
    fn test_stage_parse_rejects_unknown() {
        assert_eq!(StageId::parse("explode"), None);
        assert_eq!(StageId::parse("firework-dot#"), None);
        assert_eq!(StageId::parse("firework-dot#abc"), None);
        assert_eq!(StageId::parse("firework-dot#999"), None);
    }

    #[test]
    fn test_dot_offset_first_dot() {
        // 第 0 个粒子不旋转，位移就是基准向量
        let (x, y) = dot_offset(0, 8, 5.0);
        assert_close(x, -5.0);
        assert_close(y, -5.0);
    }

    #[test]
    fn test_dot_offset_opposite_dot() {
        // 转半圈的粒子位移与基准向量相反
        let (x, y) = dot_offset(4, 8, 5.0);
        assert_close(x, 5.0);
        assert_close(y, 5.0);
    }

    #[test]
    fn test_dot_offset_preserves_radius() {
        // 旋转不改变位移长度
        let radius = (2.0_f32).sqrt() * 5.0;
        for index in 0..8 {
            let (x, y) = dot_offset(index, 8, 5.0);
            assert_close((x * x + y * y).sqrt(), radius);
        }
    }

    #[test]
    fn test_dot_offset_zero_count_does_not_panic() {
        // count 为 0 时按 1 处理，避免除零
        let (x, y) = dot_offset(0, 0, 5.0);
        assert_close(x, -5.0);
        assert_close(y, -5.0);
    }
}
