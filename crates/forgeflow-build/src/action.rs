//! ビルドプランの操作列展開
//!
//! [`BuildPlan`] をDocker操作の列（build / push / prune）に展開する。
//! 展開は純関数で、ドライラン表示と実行の両方がこの列を使う。

use forgeflow_core::{BuildPlan, image_repository};

/// 1つのDocker操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageAction {
    /// イメージをビルドし、列挙されたタグをすべて付ける
    Build {
        app_name: String,
        image: String,
        tags: Vec<String>,
        release_id: String,
    },
    /// タグ済みイメージをレジストリへプッシュする
    Push { image: String, tag: String },
    /// ダングリングイメージを削除する
    Prune,
}

impl ImageAction {
    /// レポート表示用の短いラベル
    pub fn label(&self) -> String {
        match self {
            ImageAction::Build { image, tags, .. } => {
                format!("build {}:{}", image, tags.first().map(String::as_str).unwrap_or(""))
            }
            ImageAction::Push { image, tag } => format!("push {}:{}", image, tag),
            ImageAction::Prune => "prune".to_string(),
        }
    }
}

/// ビルドプランを操作列に展開する
///
/// タグは常に正規化済みリリースタグ、`tag_latest` 時は加えて `latest`。
/// プッシュはタグごとに1操作。順序は build → push → prune で固定。
pub fn plan_actions(plan: &BuildPlan, registry: &str, namespace: &str) -> Vec<ImageAction> {
    let image = image_repository(registry, namespace, &plan.app_name);

    let mut tags = vec![plan.release_tag()];
    if plan.tag_latest {
        tags.push("latest".to_string());
    }

    let mut actions = vec![ImageAction::Build {
        app_name: plan.app_name.clone(),
        image: image.clone(),
        tags: tags.clone(),
        release_id: plan.release_id.clone(),
    }];

    if plan.push {
        for tag in &tags {
            actions.push(ImageAction::Push {
                image: image.clone(),
                tag: tag.clone(),
            });
        }
    }

    if plan.prune {
        actions.push(ImageAction::Prune);
    }

    actions
}

/// ドライラン表示用に、行う予定の操作を1行ずつ描写する
///
/// build 1行、付けるタグごとに1行、プッシュごとに1行、pruneで1行。
pub fn dry_run_lines(plan: &BuildPlan, registry: &str, namespace: &str) -> Vec<String> {
    let mut lines = Vec::new();

    for action in plan_actions(plan, registry, namespace) {
        match action {
            ImageAction::Build {
                image,
                tags,
                release_id,
                ..
            } => {
                lines.push(format!(
                    "{} イメージを RELEASE={} でビルドします",
                    image, release_id
                ));
                for tag in tags {
                    lines.push(format!("{}:{} としてタグ付けします", image, tag));
                }
            }
            ImageAction::Push { image, tag } => {
                lines.push(format!("{}:{} をレジストリにプッシュします", image, tag));
            }
            ImageAction::Prune => {
                lines.push("ダングリングイメージをすべて削除します".to_string());
            }
        }
    }

    lines
}
