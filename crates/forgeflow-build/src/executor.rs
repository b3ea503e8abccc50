//! ビルドプラン実行
//!
//! 操作列を [`ImageExecutor`] 経由で順に実行する。各操作は
//! fire-and-forget: 失敗は報告するがリトライもロールバックもせず、
//! 残りの操作は続行する（ビルド失敗後のプッシュはそのまま失敗する）。

use crate::action::{ImageAction, dry_run_lines, plan_actions};
use crate::error::Result;
use async_trait::async_trait;
use colored::Colorize;
use forgeflow_core::BuildPlan;
use tracing::error;

/// イメージ操作の能力インタフェース
///
/// 実装は [`crate::DockerExecutor`]。テストでは記録用スタブを注入する。
#[async_trait]
pub trait ImageExecutor: Send + Sync {
    /// イメージをビルドし、列挙されたタグをすべて付ける
    async fn build(
        &self,
        app_name: &str,
        image: &str,
        tags: &[String],
        release_id: &str,
    ) -> Result<()>;

    /// タグ済みイメージをプッシュする
    async fn push(&self, image: &str, tag: &str) -> Result<()>;

    /// ダングリングイメージを削除する
    async fn prune(&self) -> Result<()>;
}

/// 1操作の実行結果
#[derive(Debug)]
pub struct ActionOutcome {
    pub action: ImageAction,
    pub result: std::result::Result<(), String>,
}

/// プラン全体の実行レポート
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub outcomes: Vec<ActionOutcome>,
}

impl ExecutionReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failures(&self) -> Vec<&ActionOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err()).collect()
    }
}

/// ビルドプランを実行する
///
/// ドライランでは行う予定の操作を表示するだけで、executor は一切
/// 呼び出さない。
pub async fn execute_plan<E>(
    plan: &BuildPlan,
    registry: &str,
    namespace: &str,
    executor: &E,
) -> ExecutionReport
where
    E: ImageExecutor + ?Sized,
{
    let mut report = ExecutionReport::default();

    if plan.dry_run {
        println!();
        println!("{}", "-".repeat(30));
        println!("{}", "実行予定の操作:".bold());
        for line in dry_run_lines(plan, registry, namespace) {
            println!("* {}", line);
        }
        println!("{}", "-".repeat(30));
        return report;
    }

    for action in plan_actions(plan, registry, namespace) {
        let result = match &action {
            ImageAction::Build {
                app_name,
                image,
                tags,
                release_id,
            } => executor.build(app_name, image, tags, release_id).await,
            ImageAction::Push { image, tag } => executor.push(image, tag).await,
            ImageAction::Prune => executor.prune().await,
        };

        if let Err(e) = &result {
            error!(error = %e, "Action failed, continuing without rollback");
        }

        report.outcomes.push(ActionOutcome {
            action,
            result: result.map_err(|e| e.to_string()),
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use std::sync::Mutex;

    /// 呼び出しを記録するだけのスタブ
    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<String>>,
        fail_push: bool,
    }

    impl RecordingExecutor {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageExecutor for RecordingExecutor {
        async fn build(
            &self,
            app_name: &str,
            _image: &str,
            tags: &[String],
            release_id: &str,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("build {} {} [{}]", app_name, release_id, tags.join(",")));
            Ok(())
        }

        async fn push(&self, image: &str, tag: &str) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("push {}:{}", image, tag));
            if self.fail_push {
                return Err(BuildError::PushFailed("denied".to_string()));
            }
            Ok(())
        }

        async fn prune(&self) -> Result<()> {
            self.calls.lock().unwrap().push("prune".to_string());
            Ok(())
        }
    }

    fn plan(tag_latest: bool, push: bool, prune: bool, dry_run: bool) -> BuildPlan {
        BuildPlan::new("teku", "23.10.0", tag_latest, push, prune, dry_run).unwrap()
    }

    #[tokio::test]
    async fn test_dry_run_invokes_nothing() {
        let executor = RecordingExecutor::default();
        let report = execute_plan(&plan(true, true, true, true), "reg", "ethereum", &executor).await;

        assert!(executor.calls().is_empty());
        assert!(report.outcomes.is_empty());
        assert!(report.all_succeeded());
    }

    #[tokio::test]
    async fn test_execute_plan_sequence() {
        let executor = RecordingExecutor::default();
        let report =
            execute_plan(&plan(true, true, true, false), "reg", "ethereum", &executor).await;

        assert_eq!(
            executor.calls(),
            vec![
                "build teku 23.10.0 [23.10.0,latest]",
                "push reg/ethereum/teku:23.10.0",
                "push reg/ethereum/teku:latest",
                "prune",
            ]
        );
        assert!(report.all_succeeded());
    }

    #[tokio::test]
    async fn test_execute_plan_without_push() {
        let executor = RecordingExecutor::default();
        let report =
            execute_plan(&plan(false, false, false, false), "reg", "ethereum", &executor).await;

        assert_eq!(executor.calls(), vec!["build teku 23.10.0 [23.10.0]"]);
        assert_eq!(report.outcomes.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_plan_failure_continues() {
        // プッシュが失敗しても prune まで実行し、失敗はレポートに残る
        let executor = RecordingExecutor {
            fail_push: true,
            ..Default::default()
        };
        let report =
            execute_plan(&plan(false, true, true, false), "reg", "ethereum", &executor).await;

        assert_eq!(executor.calls().len(), 3);
        assert!(!report.all_succeeded());
        assert_eq!(report.failures().len(), 1);
        assert!(matches!(
            report.failures()[0].action,
            ImageAction::Push { .. }
        ));
    }
}
