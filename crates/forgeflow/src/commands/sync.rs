//! sync コマンド
//!
//! カタログの全アプリについて上流の最新リリースとレジストリの差分を
//! 取り、不足しているイメージのリモートビルドを起動する。

use colored::Colorize;
use forgeflow_config::Config;
use forgeflow_core::catalog;
use forgeflow_feed::FeedClient;
use forgeflow_registry::{RegistryClient, compute_build_list};
use forgeflow_trigger::{BuildTrigger, JenkinsTrigger};
use tracing::{error, warn};

pub async fn handle(config: &Config, dry_run: bool) -> anyhow::Result<()> {
    let ids = catalog::list_applications(&config.dockerfiles_dir)?;

    // 上流ソース未設定のアプリは評価できないのでスキップ
    let mut apps = Vec::new();
    for id in &ids {
        match catalog::resolve_application(id, &config.sources) {
            Ok(app) => apps.push(app),
            Err(e) => warn!(app = %id, error = %e, "Skipping application without source"),
        }
    }

    let feed = FeedClient::new(config.timeout())?;
    let registry = RegistryClient::new(
        &config.registry,
        &config.namespace,
        config.timeout(),
        config.insecure_skip_tls_verify,
    )?;

    let outcome = compute_build_list(&apps, &feed, &registry).await;

    for skipped in &outcome.skipped {
        println!(
            "  ⚠ {} を評価できませんでした: {}",
            skipped.app_name.yellow(),
            skipped.reason
        );
    }

    if outcome.is_up_to_date() {
        println!(
            "{}",
            "ビルドが必要なアプリはありません。すべて最新です。".green()
        );
        return Ok(());
    }

    println!();
    println!(
        "{}",
        format!("ビルドが必要 ({} 件):", outcome.to_build.len()).bold()
    );
    for request in &outcome.to_build {
        println!("  • {}:{}", request.app_name.cyan(), request.release_id);
    }

    if dry_run {
        return Ok(());
    }

    let jenkins = config.jenkins.clone().ok_or_else(|| {
        anyhow::anyhow!("jenkins 設定がありません。forge.kdl に jenkins ブロックを追加してください")
    })?;
    let trigger = JenkinsTrigger::new(
        jenkins,
        &config.registry,
        config.timeout(),
        config.insecure_skip_tls_verify,
    )?;

    println!();
    let mut failed = 0;
    for request in &outcome.to_build {
        println!(
            "{}:{} のリモートビルドを起動中...",
            request.app_name.cyan(),
            request.release_id
        );
        match trigger.trigger(request).await {
            Ok(()) => println!("  ✓ 起動しました"),
            Err(e) => {
                // 個々のトリガ失敗では止めず、最後にまとめて報告する
                error!(app = %request.app_name, error = %e, "Trigger failed");
                println!("  ✗ {}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(anyhow::anyhow!("{} 件のトリガが失敗しました", failed));
    }
    Ok(())
}
