use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("ビルド定義が見つかりません: {0}")]
    DockerfileNotFound(PathBuf),

    #[error("Docker接続エラー: {0}")]
    DockerConnection(#[from] bollard::errors::Error),

    #[error("ビルドに失敗しました: {0}")]
    BuildFailed(String),

    #[error("プッシュに失敗しました: {0}")]
    PushFailed(String),

    #[error("不正なイメージタグ: {0}")]
    InvalidTag(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BuildError>;
