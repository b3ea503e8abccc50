//! releases コマンド

use colored::Colorize;
use forgeflow_config::Config;
use forgeflow_core::{DEFAULT_RELEASE_LIMIT, catalog};
use forgeflow_feed::{FeedClient, ReleaseSource};

pub async fn handle(config: &Config, app_name: &str) -> anyhow::Result<()> {
    let apps = catalog::list_applications(&config.dockerfiles_dir)?;
    if !apps.iter().any(|a| a == app_name) {
        return Err(anyhow::anyhow!(
            "'{}' はビルド可能なアプリではありません。forge apps で一覧を確認してください",
            app_name
        ));
    }

    let app = catalog::resolve_application(app_name, &config.sources)?;
    let feed = FeedClient::new(config.timeout())?;
    let releases = feed.latest_releases(&app, DEFAULT_RELEASE_LIMIT).await?;

    if releases.is_empty() {
        println!("{} にはまだリリースがありません。", app_name);
        return Ok(());
    }

    println!("{}", format!("{} の最新リリース:", app_name).bold());
    for release in &releases {
        println!(
            "  • {} {} ({})",
            release.id.cyan(),
            release.title,
            release.published_display()
        );
    }
    Ok(())
}
