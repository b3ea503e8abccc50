//! build コマンド
//!
//! アプリとリリースを決定してビルドプランを作り、サマリ確認を経て
//! Docker操作を実行する。

use colored::Colorize;
use forgeflow_build::DockerExecutor;
use forgeflow_config::Config;
use forgeflow_core::{
    BuildPlan, DEFAULT_RELEASE_LIMIT, Selector, catalog, latest_release,
};
use forgeflow_feed::{FeedClient, ReleaseSource};

pub struct BuildArgs {
    pub app_name: Option<String>,
    pub build_latest: bool,
    pub tag_latest: bool,
    pub no_summary: bool,
    pub prune: bool,
    pub do_not_push: bool,
    pub dry_run: bool,
}

pub async fn handle(config: &Config, args: BuildArgs) -> anyhow::Result<()> {
    let apps = catalog::list_applications(&config.dockerfiles_dir)?;
    if apps.is_empty() {
        return Err(anyhow::anyhow!(
            "ビルド可能なアプリケーションがありません: {}",
            config.dockerfiles_dir.display()
        ));
    }

    let mut selector = Selector::from_stdin();

    // アプリの決定。不正な指定は対話選択にフォールバックする
    let app_name = match args.app_name {
        Some(name) if apps.contains(&name) => name,
        Some(name) => {
            println!(
                "{}",
                format!("'{}' はビルド可能なアプリではありません。", name).yellow()
            );
            selector.pick_application(&apps)?
        }
        None => {
            println!("{}", "ビルド可能なアプリを取得中...".blue());
            selector.pick_application(&apps)?
        }
    };

    let app = catalog::resolve_application(&app_name, &config.sources)?;

    // リリースの決定
    let feed = FeedClient::new(config.timeout())?;
    let release = if args.build_latest {
        let releases = feed.latest_releases(&app, 1).await?;
        latest_release(&app.name, &releases)?.clone()
    } else {
        println!("{} のリリースを取得中...", app.name.cyan());
        let releases = feed.latest_releases(&app, DEFAULT_RELEASE_LIMIT).await?;
        selector.pick_release(&releases)?
    };

    let plan = BuildPlan::new(
        app.name,
        release.id,
        args.tag_latest,
        !args.do_not_push,
        args.prune,
        args.dry_run,
    )?;

    // サマリ確認（-n で省略可能）
    if !args.no_summary {
        print_summary(&plan, &config.registry);
        if !selector.confirm("この内容でよろしいですか？", true)? {
            println!("{}", "中止しました。".yellow());
            std::process::exit(1);
        }
    }

    // ドライランでは Docker に接続しない
    if plan.dry_run {
        println!();
        println!("{}", "-".repeat(30));
        println!("{}", "実行予定の操作:".bold());
        for line in forgeflow_build::dry_run_lines(&plan, &config.registry, &config.namespace) {
            println!("* {}", line);
        }
        println!("{}", "-".repeat(30));
        return Ok(());
    }

    println!();
    println!("{}", "Dockerに接続中...".blue());
    let executor = DockerExecutor::connect(config.dockerfiles_dir.clone())
        .await
        .map_err(|e| {
            anyhow::anyhow!(
                "{}\nヒント: Dockerが起動しているか、docker ps が動作するか確認してください",
                e
            )
        })?;

    let report =
        forgeflow_build::execute_plan(&plan, &config.registry, &config.namespace, &executor).await;

    if report.all_succeeded() {
        println!();
        println!(
            "{}",
            format!("✓ {}:{} の処理が完了しました", plan.app_name, plan.release_tag())
                .green()
                .bold()
        );
        Ok(())
    } else {
        println!();
        for failure in report.failures() {
            eprintln!(
                "  ✗ {}: {}",
                failure.action.label(),
                failure.result.as_ref().unwrap_err()
            );
        }
        Err(anyhow::anyhow!(
            "{} 件の操作が失敗しました（リトライ・ロールバックは行いません）",
            report.failures().len()
        ))
    }
}

/// 実行前サマリの表示
fn print_summary(plan: &BuildPlan, registry: &str) {
    println!("{}", "*".repeat(30));
    println!("{}", "サマリ".bold());
    println!("------");
    println!("アプリ:          {}", plan.app_name.cyan());
    println!("リリース:        {}", plan.release_id.cyan());
    println!("latest タグ付け: {}", plan.tag_latest);
    println!("プッシュ:        {}", plan.push);
    println!("プルーン:        {}", plan.prune);
    println!("レジストリ:      {}", registry.cyan());
    println!("{}", "*".repeat(30));
}
