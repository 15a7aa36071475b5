//! # Player 模块
//!
//! 终端播放器的动画执行部分。
//!
//! 把 Runtime 下发的 `PlayStage` 变成逐帧推进的属性变化，并在阶段
//! 真正开始与结束的那一帧产出回报事件，由主循环送回 Runtime。
//! 职责切分与真实渲染器一致：时间轴归 [`StagePlayer`]，
//! 画面状态归 [`LayerBoard`]。

use std::collections::HashMap;

use like_runtime::{IconAsset, LayerId, LayerProperty, RenderCommand, StageId, StageSpec};

/// 播放事件
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// 阶段开始播放
    Started(StageId),
    /// 阶段停止播放（`finished` 为 false 表示被中断）
    Stopped {
        /// 停止的阶段
        stage: StageId,
        /// 是否自然播完
        finished: bool,
    },
}

/// 单个阶段的播放实例
#[derive(Debug, Clone)]
struct StagePlayback {
    /// 阶段规格
    spec: StageSpec,
    /// 已经过时间（秒）
    elapsed: f32,
    /// 是否已发出开始事件
    started: bool,
}

impl StagePlayback {
    fn new(spec: StageSpec) -> Self {
        Self {
            spec,
            elapsed: 0.0,
            started: false,
        }
    }

    /// 线性进度（0.0 - 1.0）
    fn progress(&self) -> f32 {
        if self.spec.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.spec.duration).min(1.0)
        }
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.spec.duration
    }
}

/// 阶段播放器
///
/// 管理所有进行中的阶段播放，按帧推进并产出回报事件。
/// 烟花阶段会有多个播放实例并行推进。
#[derive(Debug, Default)]
pub struct StagePlayer {
    /// 进行中的播放
    active: Vec<StagePlayback>,
}

impl StagePlayer {
    /// 创建空播放器
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始播放一个阶段
    ///
    /// 开始事件要到下一次 [`update`](Self::update) 才发出，
    /// 与真实渲染器"提交后下一帧才起播"的时序一致。
    pub fn play(&mut self, spec: StageSpec) {
        self.active.push(StagePlayback::new(spec));
    }

    /// 推进一帧，返回本帧产生的事件
    pub fn update(&mut self, dt: f32) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();

        for playback in &mut self.active {
            if !playback.started {
                playback.started = true;
                events.push(PlaybackEvent::Started(playback.spec.stage));
            }
            playback.elapsed += dt;
            if playback.is_finished() {
                events.push(PlaybackEvent::Stopped {
                    stage: playback.spec.stage,
                    finished: true,
                });
            }
        }

        self.active.retain(|p| !p.is_finished());
        events
    }

    /// 采样所有活跃播放的当前属性值
    ///
    /// 主循环把采样结果铺到 [`LayerBoard`] 上，再做逐帧渲染。
    pub fn sampled_values(&self) -> Vec<(LayerId, LayerProperty, f32)> {
        let mut values = Vec::new();
        for playback in &self.active {
            let progress = playback.progress();
            for track in &playback.spec.tracks {
                let value = track.from + (track.to - track.from) * progress;
                values.push((playback.spec.layer, track.property, value));
            }
        }
        values
    }

    /// 是否没有进行中的播放
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }
}

/// 图层画板
///
/// 播放器之外的全部画面状态：可见性、属性值、图标素材。
/// 对应真实渲染器里的图层树，消费除 `PlayStage` 外的全部指令。
#[derive(Debug, Clone)]
pub struct LayerBoard {
    /// 图标层是否隐藏
    icon_hidden: bool,
    /// 红圆层是否隐藏
    red_circle_hidden: bool,
    /// 白圆层是否隐藏
    white_circle_hidden: bool,
    /// 烟花层是否隐藏
    fireworks_hidden: bool,
    /// 属性值（未写入过的属性见 [`Self::property`] 的静止值）
    properties: HashMap<(LayerId, LayerProperty), f32>,
    /// 当前图标素材
    icon: IconAsset,
}

impl Default for LayerBoard {
    /// 静止状态：只有图标可见，素材为空心轮廓
    fn default() -> Self {
        Self {
            icon_hidden: false,
            red_circle_hidden: true,
            white_circle_hidden: true,
            fireworks_hidden: true,
            properties: HashMap::new(),
            icon: IconAsset::Outline,
        }
    }
}

impl LayerBoard {
    /// 创建静止状态的画板
    pub fn new() -> Self {
        Self::default()
    }

    /// 应用一条渲染指令
    ///
    /// `PlayStage` 归播放器管，这里静默忽略。
    pub fn apply(&mut self, command: &RenderCommand) {
        match command {
            RenderCommand::PlayStage { .. } => {}
            RenderCommand::SetVisibility { layer, hidden } => self.set_hidden(*layer, *hidden),
            RenderCommand::SetProperty {
                layer,
                property,
                value,
            } => self.set_property(*layer, *property, *value),
            RenderCommand::SwapIcon { asset } => self.icon = *asset,
        }
    }

    /// 设置图层可见性（粒子子层跟随烟花容器层）
    fn set_hidden(&mut self, layer: LayerId, hidden: bool) {
        match layer.visibility_group() {
            LayerId::Icon => self.icon_hidden = hidden,
            LayerId::RedCircle => self.red_circle_hidden = hidden,
            LayerId::WhiteCircle => self.white_circle_hidden = hidden,
            LayerId::Fireworks | LayerId::Dot(_) => self.fireworks_hidden = hidden,
        }
    }

    /// 写入属性值（播放器的逐帧采样也走这里）
    pub fn set_property(&mut self, layer: LayerId, property: LayerProperty, value: f32) {
        self.properties.insert((layer, property), value);
    }

    /// 查询属性值，未写入过时返回静止值
    pub fn property(&self, layer: LayerId, property: LayerProperty) -> f32 {
        self.properties
            .get(&(layer, property))
            .copied()
            .unwrap_or(match property {
                LayerProperty::Opacity | LayerProperty::Scale => 1.0,
                LayerProperty::PositionX | LayerProperty::PositionY => 0.0,
            })
    }

    /// 当前图标素材
    pub fn icon(&self) -> IconAsset {
        self.icon
    }

    /// 图标字形（隐藏时为 `·`）
    fn icon_glyph(&self) -> char {
        if self.icon_hidden {
            '·'
        } else {
            match self.icon {
                IconAsset::Outline => '♡',
                IconAsset::Filled => '♥',
            }
        }
    }

    /// 单行画面渲染
    pub fn render_line(&self) -> String {
        let red = if self.red_circle_hidden { '·' } else { '●' };
        let white = if self.white_circle_hidden { '·' } else { '○' };
        let burst = if self.fireworks_hidden { '·' } else { '✦' };
        format!(
            "{} op={:.2} sc={:.2}  red:{red} white:{white} burst:{burst}",
            self.icon_glyph(),
            self.property(LayerId::Icon, LayerProperty::Opacity),
            self.property(LayerId::Icon, LayerProperty::Scale),
        )
    }
}
