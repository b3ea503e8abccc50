//! ForgeFlow リリースフィードクライアント
//!
//! アプリケーションの上流リポジトリから最新リリースを取得して
//! [`forgeflow_core::Release`] に正規化する。

pub mod client;
pub mod error;

pub use client::*;
pub use error::*;
