mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "forge")]
#[command(about = "上流リリースを追いかけ、コンテナイメージを鍛える。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// コンテナイメージをビルドしてレジストリにプッシュ
    Build {
        /// ビルドするアプリ名（省略時は一覧から選択）
        #[arg(short = 'a', long = "app-name")]
        app_name: Option<String>,
        /// 最新リリースを確認なしでビルドする（リリース一覧を表示しない）
        #[arg(short = 'b', long = "build-latest")]
        build_latest: bool,
        /// ビルドを latest としてもタグ付けする
        #[arg(short = 't', long = "tag-latest")]
        tag_latest: bool,
        /// サマリ確認プロンプトをスキップする
        #[arg(short = 'n', long = "no-summary-confirmation")]
        no_summary: bool,
        /// ビルド後にダングリングイメージを削除する（想定より多く消えることがある）
        #[arg(short = 'p', long = "prune")]
        prune: bool,
        /// ビルドしたイメージをレジストリにプッシュしない
        #[arg(short = 'd', long = "do-not-push")]
        do_not_push: bool,
        /// 実際には何もせず、行う予定の操作だけを表示する
        #[arg(short = 'i', long = "dry-run")]
        dry_run: bool,
    },
    /// レジストリと上流の最新リリースの差分からリモートビルドを起動
    Sync {
        /// トリガせずビルドリストの表示だけ行う
        #[arg(long)]
        dry_run: bool,
    },
    /// ビルド可能なアプリケーションの一覧を表示
    Apps,
    /// アプリケーションの最新リリースを表示
    Releases {
        /// アプリ名
        app_name: String,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("forgeflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // 設定はプロセス起動時に一度だけロードし、各コマンドへ明示的に渡す
    let config = forgeflow_config::load_config()?;

    match cli.command {
        Commands::Build {
            app_name,
            build_latest,
            tag_latest,
            no_summary,
            prune,
            do_not_push,
            dry_run,
        } => {
            commands::build::handle(
                &config,
                commands::build::BuildArgs {
                    app_name,
                    build_latest,
                    tag_latest,
                    no_summary,
                    prune,
                    do_not_push,
                    dry_run,
                },
            )
            .await?;
        }
        Commands::Sync { dry_run } => {
            commands::sync::handle(&config, dry_run).await?;
        }
        Commands::Apps => {
            commands::apps::handle(&config)?;
        }
        Commands::Releases { app_name } => {
            commands::releases::handle(&config, &app_name).await?;
        }
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
    }

    Ok(())
}
