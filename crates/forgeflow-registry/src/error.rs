use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("レジストリに接続できません: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("レジストリクエリが HTTP {status} を返しました: {url}")]
    QueryFailed { status: u16, url: String },

    #[error("レジストリのレスポンスが不正です: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
