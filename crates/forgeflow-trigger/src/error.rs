use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("CIトリガに接続できません: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("CIトリガが HTTP {status} を返しました（期待値: 201）")]
    Rejected { status: u16 },

    #[error("不正なトリガURL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, TriggerError>;
