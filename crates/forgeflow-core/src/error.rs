use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(
        "ビルド定義ディレクトリが見つかりません: {0}\nヒント: forge.kdl の dockerfiles 設定を確認してください"
    )]
    CatalogUnavailable(PathBuf),

    #[error("アプリケーション '{0}' のリリースが見つかりません")]
    NoReleasesFound(String),

    #[error("アプリケーション '{0}' の上流ソースが設定されていません")]
    UnknownSource(String),

    #[error("不正なビルドプラン: {0}")]
    InvalidPlan(String),

    #[error("入力ストリームが閉じられました")]
    InputClosed,

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
