//! ForgeFlow 設定モデル

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// ネットワーク呼び出しのデフォルトタイムアウト（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// レジストリ上のデフォルト名前空間
pub const DEFAULT_NAMESPACE: &str = "ethereum";

/// ForgeFlow 設定
///
/// プロセス起動時に一度だけロードし、各コンポーネントへ明示的に渡す。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// コンテナレジストリのホスト名（例: registry.example.com）
    pub registry: String,

    /// イメージリポジトリの名前空間
    pub namespace: String,

    /// ビルド定義（Dockerfile.<app>）ディレクトリ
    pub dockerfiles_dir: PathBuf,

    /// TLS証明書検証をスキップする（セキュリティ上のトレードオフ）
    pub insecure_skip_tls_verify: bool,

    /// ネットワーク呼び出しのタイムアウト（秒）
    pub timeout_secs: u64,

    /// アプリケーション名 → 上流リポジトリURL
    pub sources: HashMap<String, String>,

    /// Jenkins リモートビルド設定（sync コマンドでのみ必要）
    pub jenkins: Option<JenkinsConfig>,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Jenkins の buildWithParameters トリガ設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JenkinsConfig {
    /// JenkinsのベースURL（例: https://jenkins.example.com）
    pub url: String,

    /// ジョブ名
    pub job: String,

    /// Basic認証ユーザー
    pub user: String,

    /// Basic認証APIトークン
    pub api_token: String,

    /// ジョブのリモートトリガトークン
    pub trigger_token: String,

    /// ビルド通知先メールアドレス
    pub email: String,
}

/// 組み込みの上流ソース定義
///
/// 設定ファイルの `source` ノードで上書き・追加できる。
pub fn default_sources() -> HashMap<String, String> {
    [
        ("deposit_cli", "https://github.com/ethereum/eth2.0-deposit-cli"),
        ("go_ethereum", "https://github.com/ethereum/go-ethereum"),
        ("lighthouse", "https://github.com/sigp/lighthouse"),
        ("prysm", "https://github.com/prysmaticlabs/prysm"),
        ("teku", "https://github.com/PegaSysEng/teku"),
        ("utility", "https://github.com/wealdtech/ethdo"),
    ]
    .into_iter()
    .map(|(name, repo)| (name.to_string(), repo.to_string()))
    .collect()
}
