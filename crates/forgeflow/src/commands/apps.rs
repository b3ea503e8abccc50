//! apps コマンド

use colored::Colorize;
use forgeflow_config::Config;
use forgeflow_core::catalog;

pub fn handle(config: &Config) -> anyhow::Result<()> {
    let ids = catalog::list_applications(&config.dockerfiles_dir)?;
    if ids.is_empty() {
        println!("ビルド可能なアプリケーションがありません。");
        return Ok(());
    }

    println!(
        "{}",
        format!("ビルド可能なアプリケーション ({} 件):", ids.len()).bold()
    );
    for id in &ids {
        match config.sources.get(id) {
            Some(repo) => println!("  • {} ({})", id.cyan(), repo),
            None => println!("  • {} {}", id.cyan(), "(上流ソース未設定)".yellow()),
        }
    }
    Ok(())
}
