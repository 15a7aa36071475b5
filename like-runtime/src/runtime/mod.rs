//! # Runtime 模块
//!
//! 点赞编排引擎核心，负责序列推进和状态管理。
//!
//! ## 模块结构
//!
//! - [`engine`]：核心编排引擎（输入匹配、阶段推进、看门狗）
//! - [`executor`]：编排节点到 RenderCommand 的转换

pub mod engine;
pub mod executor;

pub use engine::LikeRuntime;
