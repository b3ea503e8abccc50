//! ForgeFlow イメージビルド機能
//!
//! ビルドプランをDockerの build / tag / push / prune 操作に展開して
//! 実行する。実際のDocker呼び出しは [`ImageExecutor`] の実装に
//! 委譲されるため、判断ロジックはDockerなしでテストできる。

pub mod action;
pub mod auth;
pub mod context;
pub mod docker;
pub mod error;
pub mod executor;

pub use action::*;
pub use auth::*;
pub use context::*;
pub use docker::*;
pub use error::*;
pub use executor::*;
