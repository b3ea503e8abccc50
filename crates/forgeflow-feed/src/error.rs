use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("リリースフィードに接続できません: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("リリースフィードが HTTP {status} を返しました: {url}")]
    Status { status: u16, url: String },

    #[error("リリースフィードの内容が不正です: {0}")]
    Malformed(String),

    #[error("サポートされない上流ソースURL: {0}")]
    UnsupportedSource(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;
