//! ForgeFlow レジストリ検査
//!
//! コンテナレジストリのカタログ／タグ一覧を照会してイメージの存在を
//! 判定し、上流の最新リリースとの差分からビルドリストを計算する。

pub mod client;
pub mod differ;
pub mod error;

pub use client::*;
pub use differ::*;
pub use error::*;
