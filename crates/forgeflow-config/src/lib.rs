//! ForgeFlow 設定管理
//!
//! forge.kdl の発見とパース。ロードした [`Config`] はプロセス起動時に
//! 一度だけ生成し、グローバル状態ではなく明示的な値として各コンポーネント
//! に渡す。

pub mod error;
pub mod model;
pub mod parser;

pub use error::*;
pub use model::*;
pub use parser::*;

use std::path::PathBuf;
use tracing::debug;

/// 設定ファイルの環境変数
pub const CONFIG_PATH_ENV: &str = "FORGE_CONFIG_PATH";

/// プロジェクトの forge.kdl ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 FORGE_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: forge.local.kdl, .forge.local.kdl, forge.kdl, .forge.kdl
/// 3. ./.forgeflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/forgeflow/forge.kdl (グローバル設定)
pub fn find_config_file() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            debug!(path = %path.display(), "Found config from environment variable");
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    let candidates = [
        "forge.local.kdl",
        ".forge.local.kdl",
        "forge.kdl",
        ".forge.kdl",
    ];

    // 2. カレントディレクトリで検索
    for filename in &candidates {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    // 3. ./.forgeflow/ ディレクトリで検索
    let forge_dir = current_dir.join(".forgeflow");
    if forge_dir.is_dir() {
        for filename in &candidates {
            let path = forge_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    // 4. グローバル設定ファイル (~/.config/forgeflow/forge.kdl)
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("forgeflow").join("forge.kdl");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// 設定ファイルを発見してロードする
pub fn load_config() -> Result<Config> {
    let path = find_config_file()?;
    debug!(path = %path.display(), "Loading configuration");
    parse_config_file(&path)
}
