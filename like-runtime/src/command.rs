//! # Command 模块
//!
//! 定义 Runtime → Host 的渲染指令流。
//!
//! ## 设计原则
//!
//! - Command 是 Runtime 影响外界的唯一通道
//! - 声明式：描述"要发生什么"，不预设任何绘制技术
//! - 渲染无关：终端、GPU、测试桩都能消费同一条指令流
//! - 可序列化：支持录制 / 回放

use serde::{Deserialize, Serialize};

use crate::stage::StageSpec;
use crate::state::LikeState;

/// 渲染图层标识
///
/// 点赞控件由四个固定图层组成。烟花层下再细分出 N 个粒子子层，
/// 粒子的可见性始终跟随整个烟花层（对应原型中的复制层结构，
/// 粒子只在属性动画上彼此独立）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerId {
    /// 图标层（空心 / 实心爱心）
    Icon,
    /// 红色圆层
    RedCircle,
    /// 白色圆层
    WhiteCircle,
    /// 烟花容器层
    Fireworks,
    /// 烟花粒子子层（索引从 0 开始）
    Dot(u8),
}

impl LayerId {
    /// 可见性归属的图层
    ///
    /// 粒子子层没有独立的可见性开关，统一由烟花容器层控制。
    pub fn visibility_group(&self) -> LayerId {
        match self {
            LayerId::Dot(_) => LayerId::Fireworks,
            other => *other,
        }
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerId::Icon => write!(f, "icon"),
            LayerId::RedCircle => write!(f, "red-circle"),
            LayerId::WhiteCircle => write!(f, "white-circle"),
            LayerId::Fireworks => write!(f, "fireworks"),
            LayerId::Dot(index) => write!(f, "dot#{}", index),
        }
    }
}

/// 可动画的图层属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerProperty {
    /// 不透明度（0.0 ~ 1.0）
    Opacity,
    /// 缩放比例（1.0 为原始大小）
    Scale,
    /// 水平位移（相对静止位置的偏移）
    PositionX,
    /// 垂直位移（相对静止位置的偏移）
    PositionY,
}

impl std::fmt::Display for LayerProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerProperty::Opacity => write!(f, "opacity"),
            LayerProperty::Scale => write!(f, "scale"),
            LayerProperty::PositionX => write!(f, "position_x"),
            LayerProperty::PositionY => write!(f, "position_y"),
        }
    }
}

/// 图标素材
///
/// 素材名是跨 Host 的逻辑标识，Host 自行映射到实际资源
/// （位图、字形、SVG 等）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconAsset {
    /// 空心爱心（未点赞）
    Outline,
    /// 实心爱心（已点赞）
    Filled,
}

impl IconAsset {
    /// 逻辑素材名
    pub fn name(&self) -> &'static str {
        match self {
            IconAsset::Outline => "like",
            IconAsset::Filled => "like.fill",
        }
    }

    /// 点赞状态对应的素材
    pub fn for_state(state: LikeState) -> Self {
        match state {
            LikeState::Unliked => IconAsset::Outline,
            LikeState::Liked => IconAsset::Filled,
        }
    }
}

/// 渲染指令
///
/// Runtime 每次 tick 产出一组指令，Host 按顺序执行。
/// 指令之间没有隐式依赖，顺序执行即可得到正确画面。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// 播放一个动画阶段
    ///
    /// Host 必须在真正开始播放时回报 `StageStarted`，
    /// 在播放停止（无论完成还是中断）时回报 `StageStopped`。
    /// 开始播放时 Host 应把各轨道属性置为 `from` 值。
    PlayStage {
        /// 阶段描述（图层、时长、属性轨道）
        spec: StageSpec,
    },

    /// 设置图层可见性
    SetVisibility {
        /// 目标图层
        layer: LayerId,
        /// 是否隐藏
        hidden: bool,
    },

    /// 直接设置图层属性（非动画，立即生效）
    SetProperty {
        /// 目标图层
        layer: LayerId,
        /// 属性
        property: LayerProperty,
        /// 属性值
        value: f32,
    },

    /// 切换图标素材
    SwapIcon {
        /// 新素材
        asset: IconAsset,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageId;

    #[test]
    fn test_icon_asset_names() {
        assert_eq!(IconAsset::Outline.name(), "like");
        assert_eq!(IconAsset::Filled.name(), "like.fill");

        assert_eq!(IconAsset::for_state(LikeState::Unliked), IconAsset::Outline);
        assert_eq!(IconAsset::for_state(LikeState::Liked), IconAsset::Filled);
    }

    #[test]
    fn test_visibility_group() {
        // 粒子子层归属烟花容器层
        assert_eq!(LayerId::Dot(0).visibility_group(), LayerId::Fireworks);
        assert_eq!(LayerId::Dot(7).visibility_group(), LayerId::Fireworks);

        // 其余图层归属自身
        assert_eq!(LayerId::Icon.visibility_group(), LayerId::Icon);
        assert_eq!(LayerId::RedCircle.visibility_group(), LayerId::RedCircle);
    }

    #[test]
    fn test_layer_display() {
        assert_eq!(LayerId::Icon.to_string(), "icon");
        assert_eq!(LayerId::Dot(3).to_string(), "dot#3");
        assert_eq!(LayerProperty::PositionX.to_string(), "position_x");
    }

    #[test]
    fn test_command_serialization() {
        let command = RenderCommand::SetProperty {
            layer: LayerId::Icon,
            property: LayerProperty::Opacity,
            value: 1.0,
        };

        let json = serde_json::to_string(&command).unwrap();
        let loaded: RenderCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, command);
    }

    #[test]
    fn test_play_stage_serialization() {
        let spec = crate::config::SequenceConfig::default().stage_spec(StageId::IconFadeOut);
        let command = RenderCommand::PlayStage { spec };

        let json = serde_json::to_string(&command).unwrap();
        let loaded: RenderCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, command);
    }
}
