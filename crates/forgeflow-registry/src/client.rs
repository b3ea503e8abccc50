//! コンテナレジストリHTTPクライアント
//!
//! Docker Registry HTTP API v2 のカタログ／タグ一覧エンドポイントを照会する。
//! 結果はキャッシュせず、照会のたびにレジストリの現在の状態を読む。

use crate::error::{RegistryError, Result};
use async_trait::async_trait;
use forgeflow_core::normalize_release_tag;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// イメージ存在判定の能力インタフェース
#[async_trait]
pub trait ImageIndex: Send + Sync {
    /// 正規化済みリリースタグのイメージがレジストリに存在するか
    async fn image_exists(&self, app_name: &str, release_id: &str) -> Result<bool>;
}

/// レジストリクライアント
pub struct RegistryClient {
    client: reqwest::Client,
    registry: String,
    namespace: String,
}

/// `/v2/_catalog` のレスポンス
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    repositories: Vec<String>,
}

/// `/v2/{repository}/tags/list` のレスポンス
#[derive(Debug, Deserialize)]
struct TagListResponse {
    /// 全タグが削除されたリポジトリでは null が返る
    #[serde(default)]
    tags: Option<Vec<String>>,
}

impl RegistryClient {
    /// 新しいレジストリクライアントを作成する
    ///
    /// `insecure_skip_tls_verify` は証明書検証を無効にする。
    /// セキュリティ上のトレードオフなので使用時は警告を出す。
    pub fn new(
        registry: impl Into<String>,
        namespace: impl Into<String>,
        timeout: Duration,
        insecure_skip_tls_verify: bool,
    ) -> Result<Self> {
        if insecure_skip_tls_verify {
            warn!("TLS certificate verification is disabled for registry queries");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure_skip_tls_verify)
            .build()?;

        Ok(Self {
            client,
            registry: registry.into(),
            namespace: namespace.into(),
        })
    }

    /// アプリケーションの修飾リポジトリ名（`{namespace}/{app}`）
    pub fn repository_for(&self, app_name: &str) -> String {
        format!("{}/{}", self.namespace, app_name)
    }

    /// レジストリの全リポジトリ一覧を取得する
    pub async fn catalog(&self) -> Result<Vec<String>> {
        let url = format!("https://{}/v2/_catalog", self.registry);
        let response: CatalogResponse = self.get_json(url).await?;
        Ok(response.repositories)
    }

    /// リポジトリのタグ一覧を取得する
    pub async fn tags(&self, repository: &str) -> Result<Vec<String>> {
        let url = format!("https://{}/v2/{}/tags/list", self.registry, repository);
        let response: TagListResponse = self.get_json(url).await?;
        Ok(response.tags.unwrap_or_default())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        debug!(url = %url, "Querying registry");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::QueryFailed {
                status: status.as_u16(),
                url,
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RegistryError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ImageIndex for RegistryClient {
    async fn image_exists(&self, app_name: &str, release_id: &str) -> Result<bool> {
        let repository = self.repository_for(app_name);

        // リポジトリ自体がなければタグ一覧は取得しない
        let repositories = self.catalog().await?;
        if !repositories.contains(&repository) {
            debug!(repository = %repository, "Repository not in catalog");
            return Ok(false);
        }

        let tags = self.tags(&repository).await?;
        Ok(tag_present(&tags, release_id))
    }
}

/// 正規化済みリリースタグがタグ一覧に含まれるか
fn tag_present(tags: &[String], release_id: &str) -> bool {
    let normalized = normalize_release_tag(release_id);
    tags.iter().any(|tag| *tag == normalized)
}
