//! ビルドリスト差分計算
//!
//! カタログの各アプリケーションについて、上流の最新リリースと
//! レジストリの既存タグを突き合わせ、ビルドが必要なものを列挙する。

use crate::client::ImageIndex;
use forgeflow_core::{Application, BuildRequest};
use forgeflow_feed::ReleaseSource;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// 評価できなかったアプリケーションの記録
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedCheck {
    pub app_name: String,
    pub reason: String,
}

/// 差分計算の結果
///
/// `to_build` の順序は入力アプリケーションの順序と一致する。
/// 空の `to_build` は「すべて最新」を意味する正常な結果。
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DiffOutcome {
    pub to_build: Vec<BuildRequest>,
    pub skipped: Vec<SkippedCheck>,
}

impl DiffOutcome {
    pub fn is_up_to_date(&self) -> bool {
        self.to_build.is_empty()
    }
}

/// ビルドが必要なアプリケーションを列挙する
///
/// フィード取得・レジストリ照会の失敗はそのアプリケーションの
/// スキップとして記録し、残りのアプリケーションの評価は続行する。
/// レジストリ照会とその後のビルドは非トランザクショナル（既知の競合、
/// DESIGN.md 参照）。
pub async fn compute_build_list<S, I>(apps: &[Application], source: &S, index: &I) -> DiffOutcome
where
    S: ReleaseSource + ?Sized,
    I: ImageIndex + ?Sized,
{
    let mut outcome = DiffOutcome::default();

    for app in apps {
        info!(app = %app.name, "Checking latest release");
        let releases = match source.latest_releases(app, 1).await {
            Ok(releases) => releases,
            Err(e) => {
                warn!(app = %app.name, error = %e, "Could not fetch latest release, skipping");
                outcome.skipped.push(SkippedCheck {
                    app_name: app.name.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let Some(release) = releases.first() else {
            warn!(app = %app.name, "Upstream has no releases, skipping");
            outcome.skipped.push(SkippedCheck {
                app_name: app.name.clone(),
                reason: "上流にリリースがありません".to_string(),
            });
            continue;
        };

        info!(app = %app.name, release = %release.id, "Checking registry for existing image");
        match index.image_exists(&app.name, &release.id).await {
            Ok(true) => {
                debug!(app = %app.name, release = %release.id, "Image already present");
            }
            Ok(false) => {
                info!(app = %app.name, release = %release.id, "Needs build");
                outcome.to_build.push(BuildRequest {
                    app_name: app.name.clone(),
                    release_id: release.id.clone(),
                });
            }
            Err(e) => {
                warn!(app = %app.name, error = %e, "Registry check failed, skipping");
                outcome.skipped.push(SkippedCheck {
                    app_name: app.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    outcome
}
