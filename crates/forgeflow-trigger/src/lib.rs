//! ForgeFlow リモートビルドトリガ
//!
//! ビルドリストの各エントリについて、Jenkins の buildWithParameters に
//! パラメータ付きリクエストを送信する。

pub mod client;
pub mod error;

pub use client::*;
pub use error::*;
