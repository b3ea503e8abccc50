//! リリースフィードの取得と正規化
//!
//! GitHub のリリースフィードAPIから最新リリースを取得する。
//! 取得は1回のみ（リトライなし）、タイムアウトは設定値で制限する。

use crate::error::{FeedError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forgeflow_core::{Application, Release};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const GITHUB_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "forgeflow";

/// リリースフィードの能力インタフェース
///
/// 差分計算やテストで実装を注入できるようにする。
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// 最新リリースを新しい順に最大 `limit` 件返す
    ///
    /// フィードにエントリがない場合は空のVecを返す。
    async fn latest_releases(&self, app: &Application, limit: usize) -> Result<Vec<Release>>;
}

/// GitHub リリースフィードクライアント
pub struct FeedClient {
    client: reqwest::Client,
    api_base: String,
}

impl FeedClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_base: GITHUB_API_BASE.to_string(),
        })
    }

    /// APIベースURLを差し替える（GitHub Enterprise等）
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl ReleaseSource for FeedClient {
    async fn latest_releases(&self, app: &Application, limit: usize) -> Result<Vec<Release>> {
        let slug = repo_slug(&app.repo)?;
        let url = format!(
            "{}/repos/{}/releases?per_page={}",
            self.api_base, slug, limit
        );
        debug!(app = %app.name, url = %url, "Fetching latest releases");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        parse_releases(&body, limit)
    }
}

/// フィードAPIのレスポンスボディをパースする
///
/// パース処理はネットワークと分離した純関数。
pub fn parse_releases(body: &str, limit: usize) -> Result<Vec<Release>> {
    let entries: Vec<FeedEntry> =
        serde_json::from_str(body).map_err(|e| FeedError::Malformed(e.to_string()))?;

    Ok(entries
        .into_iter()
        .take(limit)
        .map(FeedEntry::into_release)
        .collect())
}

/// 上流リポジトリURLから `owner/repo` スラグを取り出す
pub fn repo_slug(repo_url: &str) -> Result<String> {
    let slug = repo_url
        .strip_prefix("https://github.com/")
        .ok_or_else(|| FeedError::UnsupportedSource(repo_url.to_string()))?
        .trim_end_matches('/')
        .trim_end_matches(".git");

    let mut parts = slug.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
            Ok(format!("{}/{}", owner, repo))
        }
        _ => Err(FeedError::UnsupportedSource(repo_url.to_string())),
    }
}

/// フィードの1エントリ
#[derive(Debug, Deserialize)]
struct FeedEntry {
    /// リリースタグ（識別子として使用）
    tag_name: String,
    /// 表示タイトル。未設定のリリースでは null
    name: Option<String>,
    /// リリースページURL
    html_url: String,
    /// 公開日時。ドラフトでは null
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl FeedEntry {
    fn into_release(self) -> Release {
        let title = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => self.tag_name.clone(),
        };
        Release {
            id: self.tag_name,
            title,
            link: self.html_url,
            published: self.published_at.or(self.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_json(tag: &str, name: Option<&str>, published: &str) -> String {
        let name = match name {
            Some(n) => format!("\"{}\"", n),
            None => "null".to_string(),
        };
        format!(
            r#"{{"tag_name": "{tag}", "name": {name},
                "html_url": "https://github.com/sigp/lighthouse/releases/tag/{tag}",
                "published_at": "{published}", "created_at": "{published}"}}"#
        )
    }

    #[test]
    fn test_parse_releases() {
        let body = format!(
            "[{},{}]",
            entry_json("v4.5.0", Some("Pioneer"), "2026-01-04T09:30:00Z"),
            entry_json("v4.4.1", None, "2025-12-01T12:00:00Z"),
        );

        let releases = parse_releases(&body, 5).unwrap();
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].id, "v4.5.0");
        assert_eq!(releases[0].title, "Pioneer");
        assert_eq!(
            releases[0].link,
            "https://github.com/sigp/lighthouse/releases/tag/v4.5.0"
        );
        assert_eq!(releases[0].published_display(), "Sun, 04 Jan 2026 09:30");

        // name が null の場合はタグ名にフォールバック
        assert_eq!(releases[1].title, "v4.4.1");
    }

    #[test]
    fn test_parse_releases_caps_at_limit() {
        // 7件のフィードでも上限の5件しか返さない
        let entries: Vec<String> = (0..7)
            .map(|i| entry_json(&format!("v1.{}.0", 7 - i), None, "2025-11-01T00:00:00Z"))
            .collect();
        let body = format!("[{}]", entries.join(","));

        let releases = parse_releases(&body, 5).unwrap();
        assert_eq!(releases.len(), 5);
        assert_eq!(releases[0].id, "v1.7.0");
        assert_eq!(releases[4].id, "v1.3.0");
    }

    #[test]
    fn test_parse_releases_empty_feed() {
        let releases = parse_releases("[]", 5).unwrap();
        assert!(releases.is_empty());
    }

    #[test]
    fn test_parse_releases_malformed() {
        let result = parse_releases("<html>rate limited</html>", 5);
        assert!(matches!(result, Err(FeedError::Malformed(_))));
    }

    #[test]
    fn test_parse_releases_keeps_plus_in_id() {
        let body = format!("[{}]", entry_json("v1.13.0+abc", None, "2025-11-01T00:00:00Z"));
        let releases = parse_releases(&body, 5).unwrap();
        // 正規化はタグとして使用する側の責務。フィードは生のIDを保持する。
        assert_eq!(releases[0].id, "v1.13.0+abc");
    }

    #[test]
    fn test_repo_slug() {
        assert_eq!(
            repo_slug("https://github.com/sigp/lighthouse").unwrap(),
            "sigp/lighthouse"
        );
        assert_eq!(
            repo_slug("https://github.com/ethereum/go-ethereum/").unwrap(),
            "ethereum/go-ethereum"
        );
        assert_eq!(
            repo_slug("https://github.com/wealdtech/ethdo.git").unwrap(),
            "wealdtech/ethdo"
        );
    }

    #[test]
    fn test_repo_slug_rejects_non_github() {
        assert!(matches!(
            repo_slug("https://gitlab.com/org/repo"),
            Err(FeedError::UnsupportedSource(_))
        ));
        assert!(matches!(
            repo_slug("https://github.com/only-owner"),
            Err(FeedError::UnsupportedSource(_))
        ));
    }
}
