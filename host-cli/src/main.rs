//! # Like Player
//!
//! 终端播放器 - 驱动 like-runtime 播放点赞编排，逐帧打印图层状态。
//!
//! ## 用法
//!
//! ```bash
//! # 在项目根目录使用 cargo 运行
//! cargo run -p host-cli
//! cargo run -p host-cli -- --taps 2 --fps 30
//! cargo run -p host-cli -- --profile profiles/showy.json
//! cargo run -p host-cli -- --lose red-circle-reveal   # 丢一个回报，演示看门狗
//! cargo run -p host-cli -- trace
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use like_runtime::{LikeRuntime, RenderCommand, SequencerInput, StageId};

mod player;

use player::{LayerBoard, PlaybackEvent, StagePlayer};

#[derive(Parser)]
#[command(name = "like-player")]
#[command(about = "点赞动画终端播放器 - 在终端里播放完整的点赞编排")]
#[command(version, author)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// 配置档 JSON 文件（缺省使用内置默认值）
    #[arg(short, long, global = true)]
    profile: Option<PathBuf>,

    /// 点击次数（默认 2：点赞一次再取消一次）
    #[arg(short, long, default_value = "2", global = true)]
    taps: u32,

    /// 帧率
    #[arg(long, default_value = "60", global = true)]
    fps: u32,

    /// 丢弃指定阶段的停止回报（演示看门狗接管）
    #[arg(long, value_name = "STAGE", global = true)]
    lose: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 播放序列并逐帧打印图层状态（默认行为）
    Play,

    /// 跑完整个序列后打印机器可读的事件轨迹（不按真实时间等待）
    Trace,
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    anyhow::ensure!(cli.fps > 0, "fps 必须大于 0");

    let mut runtime = build_runtime(cli.profile.as_deref())?;
    let options = PlayOptions {
        taps: cli.taps,
        fps: cli.fps,
        lose: parse_lose(cli.lose.as_deref())?,
        realtime: !matches!(cli.command, Some(Commands::Trace)),
    };

    play(&mut runtime, &options)?;

    if matches!(cli.command, Some(Commands::Trace)) {
        println!("{}", runtime.trace().render());
    }

    Ok(())
}

/// 加载配置档并创建 Runtime
fn build_runtime(profile: Option<&Path>) -> anyhow::Result<LikeRuntime> {
    match profile {
        None => Ok(LikeRuntime::new()),
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("读取配置档 {} 失败: {e}", path.display()))?;
            let runtime = LikeRuntime::from_profile_json(&json)
                .map_err(|e| anyhow::anyhow!("配置档 {} 不可用: {e}", path.display()))?;
            info!(profile = %path.display(), "配置档已加载");
            Ok(runtime)
        }
    }
}

/// 解析 `--lose` 的阶段名
fn parse_lose(text: Option<&str>) -> anyhow::Result<Option<StageId>> {
    match text {
        None => Ok(None),
        Some(text) => match StageId::parse(text) {
            Some(stage) => Ok(Some(stage)),
            None => anyhow::bail!("无法识别的阶段名: {text}（示例: icon-fade-out、firework-dot#3）"),
        },
    }
}

/// 播放选项
struct PlayOptions {
    /// 点击次数
    taps: u32,
    /// 帧率
    fps: u32,
    /// 被丢弃停止回报的阶段
    lose: Option<StageId>,
    /// 逐帧打印并按真实时间睡眠
    realtime: bool,
}

/// 主帧循环
///
/// 每帧依次：推进播放器并回报起止、在空闲时发起点击、
/// 按等待时限投递看门狗、渲染一行画面。
fn play(runtime: &mut LikeRuntime, options: &PlayOptions) -> anyhow::Result<()> {
    let dt = 1.0 / options.fps as f32;
    let frame = Duration::from_secs_f32(dt);

    let mut player = StagePlayer::new();
    let mut board = LayerBoard::new();

    // 开场把画面对齐到稳态
    dispatch(runtime.sync_commands(), &mut player, &mut board);

    let mut taps_left = options.taps;
    let mut waited = Duration::ZERO;
    let mut frame_no = 0u64;

    loop {
        frame_no += 1;

        // 1. 推进播放器，把起止回报送回 Runtime
        let mut progressed = false;
        for event in player.update(dt) {
            let input = match event {
                PlaybackEvent::Started(stage) => SequencerInput::started(stage),
                PlaybackEvent::Stopped { stage, finished } => {
                    if options.lose == Some(stage) {
                        warn!(stage = %stage, "停止回报被丢弃，等待看门狗接管");
                        continue;
                    }
                    SequencerInput::stopped(stage, finished)
                }
            };
            let (commands, _) = runtime.tick(input);
            dispatch(commands, &mut player, &mut board);
            progressed = true;
        }

        // 2. 空闲且还有点击额度时发起点击
        if !runtime.is_animating() && taps_left > 0 {
            taps_left -= 1;
            info!(like = %runtime.like(), remaining = taps_left, "点击");
            let (commands, _) = runtime.tick(SequencerInput::tap());
            dispatch(commands, &mut player, &mut board);
            progressed = true;
        }

        // 3. 看门狗计时：等待无进展时累计，越过时限则投递
        if progressed {
            waited = Duration::ZERO;
        } else if let Some(timeout) = runtime.waiting().timeout() {
            waited += frame;
            if waited >= timeout {
                warn!(waited = ?waited, "看门狗超时，强制复位");
                let (commands, _) = runtime.tick(SequencerInput::watchdog());
                dispatch(commands, &mut player, &mut board);
                waited = Duration::ZERO;
            }
        }

        // 4. 把播放器的采样值铺到画板上，再渲染一行
        for (layer, property, value) in player.sampled_values() {
            board.set_property(layer, property, value);
        }
        if options.realtime {
            println!("{:>4} │ {}", frame_no, board.render_line());
            std::thread::sleep(frame);
        }

        // 5. 点击额度用尽、Runtime 与播放器都安静后退出
        if taps_left == 0 && !runtime.is_animating() && player.is_idle() {
            break;
        }
    }

    info!(
        frames = frame_no,
        like = %runtime.like(),
        "播放结束"
    );
    Ok(())
}

/// 把指令分发到播放器与画板
fn dispatch(commands: Vec<RenderCommand>, player: &mut StagePlayer, board: &mut LayerBoard) {
    for command in commands {
        match command {
            RenderCommand::PlayStage { spec } => {
                debug!(stage = %spec.stage, duration = spec.duration, "播放阶段");
                player.play(spec);
            }
            other => board.apply(&other),
        }
    }
}
