//! ForgeFlow データモデル

use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 「特定リリースなし」を表すセンチネル。リポジトリの head をビルドする。
pub const HEAD_RELEASE: &str = "master";

/// フィードから取得するリリースの最大件数
pub const DEFAULT_RELEASE_LIMIT: usize = 5;

/// リリース日時の表示フォーマット
pub const RELEASE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M";

/// ビルド可能なアプリケーション
///
/// カタログ列挙時に生成され、プロセスの生存期間中は不変。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// カタログ上の識別子（`Dockerfile.<name>` の `<name>`）
    pub name: String,

    /// 上流リポジトリURL（リリースフィードの取得元）
    pub repo: String,
}

impl Application {
    pub fn new(name: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repo: repo.into(),
        }
    }
}

/// 上流リリース
///
/// フィードクエリごとに生成される一時データで、永続化しない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// リリース識別子（タグ名）。`+` を含む場合はイメージタグとして
    /// 使用する前に [`normalize_release_tag`] で正規化する。
    pub id: String,

    /// 表示タイトル
    pub title: String,

    /// リリースページへのリンク
    pub link: String,

    /// 公開日時。head センチネルでは None。
    pub published: Option<DateTime<Utc>>,
}

impl Release {
    /// head ビルドを表すリリース。id 以外のフィールドは空。
    pub fn head() -> Self {
        Self {
            id: HEAD_RELEASE.to_string(),
            ..Default::default()
        }
    }

    pub fn is_head(&self) -> bool {
        self.id == HEAD_RELEASE
    }

    /// 公開日時を固定フォーマットで表示する
    pub fn published_display(&self) -> String {
        match &self.published {
            Some(dt) => dt.format(RELEASE_DATE_FORMAT).to_string(),
            None => "-".to_string(),
        }
    }
}

/// リリースIDをイメージタグとして使用可能な形に正規化する
///
/// Dockerタグに使えない `+` をすべて `_` に置換する。冪等。
pub fn normalize_release_tag(id: &str) -> String {
    id.replace('+', "_")
}

/// 修飾リポジトリ名 `{registry}/{namespace}/{app}` を組み立てる
pub fn image_repository(registry: &str, namespace: &str, app_name: &str) -> String {
    format!("{}/{}/{}", registry, namespace, app_name)
}

/// ビルドプラン
///
/// 一度構築したら変更しない。実行ステップには参照で渡す。
/// release_id は実在する上流リリースの識別子か [`HEAD_RELEASE`] センチネル。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub app_name: String,
    pub release_id: String,
    pub tag_latest: bool,
    pub push: bool,
    pub prune: bool,
    pub dry_run: bool,
}

impl BuildPlan {
    /// ビルドプランを構築する
    ///
    /// アプリケーションIDとリリースIDが空でないことのみ検証する。
    /// 副作用はない。
    pub fn new(
        app_name: impl Into<String>,
        release_id: impl Into<String>,
        tag_latest: bool,
        push: bool,
        prune: bool,
        dry_run: bool,
    ) -> Result<Self> {
        let app_name = app_name.into();
        let release_id = release_id.into();

        if app_name.is_empty() {
            return Err(CoreError::InvalidPlan(
                "アプリケーションIDが空です".to_string(),
            ));
        }
        if release_id.is_empty() {
            return Err(CoreError::InvalidPlan("リリースIDが空です".to_string()));
        }

        Ok(Self {
            app_name,
            release_id,
            tag_latest,
            push,
            prune,
            dry_run,
        })
    }

    /// 正規化済みのイメージタグ
    pub fn release_tag(&self) -> String {
        normalize_release_tag(&self.release_id)
    }
}

/// ビルド差分の1行: このアプリをこのリリースでビルドする必要がある
///
/// release_id は正規化前の生の識別子を保持する。
/// 正規化はタグとして使用する側（ビルド／トリガ）が行う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub app_name: String,
    pub release_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_normalize_release_tag() {
        assert_eq!(normalize_release_tag("v1.13.0+abc"), "v1.13.0_abc");
        assert_eq!(normalize_release_tag("v1.0.0+a+b"), "v1.0.0_a_b");
        assert_eq!(normalize_release_tag("v1.12.0"), "v1.12.0");
    }

    #[test]
    fn test_normalize_release_tag_idempotent() {
        let once = normalize_release_tag("v1.13.0+abc");
        assert_eq!(normalize_release_tag(&once), once);
    }

    #[test]
    fn test_image_repository() {
        assert_eq!(
            image_repository("registry.example.com", "ethereum", "go_ethereum"),
            "registry.example.com/ethereum/go_ethereum"
        );
    }

    #[test]
    fn test_build_plan_new() {
        let plan = BuildPlan::new("go_ethereum", "v1.13.0+abc", true, true, false, false).unwrap();
        assert_eq!(plan.app_name, "go_ethereum");
        assert_eq!(plan.release_id, "v1.13.0+abc");
        assert_eq!(plan.release_tag(), "v1.13.0_abc");
        assert!(plan.tag_latest);
        assert!(!plan.prune);
    }

    #[test]
    fn test_build_plan_rejects_empty_app() {
        let result = BuildPlan::new("", "v1.0.0", false, true, false, false);
        assert!(matches!(result, Err(CoreError::InvalidPlan(_))));
    }

    #[test]
    fn test_build_plan_rejects_empty_release() {
        let result = BuildPlan::new("teku", "", false, true, false, false);
        assert!(matches!(result, Err(CoreError::InvalidPlan(_))));
    }

    #[test]
    fn test_head_release() {
        let head = Release::head();
        assert_eq!(head.id, HEAD_RELEASE);
        assert!(head.is_head());
        assert!(head.title.is_empty());
        assert!(head.link.is_empty());
        assert!(head.published.is_none());
        assert_eq!(head.published_display(), "-");
    }

    #[test]
    fn test_published_display_format() {
        let release = Release {
            id: "v1.0.0".to_string(),
            title: "v1.0.0".to_string(),
            link: String::new(),
            published: Some(Utc.with_ymd_and_hms(2026, 1, 4, 9, 30, 0).unwrap()),
        };
        assert_eq!(release.published_display(), "Sun, 04 Jan 2026 09:30");
    }
}
