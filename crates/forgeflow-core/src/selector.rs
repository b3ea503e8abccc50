//! リリース／アプリケーション選択
//!
//! 対話的な選択は入力ソースを注入された [`Selector`] が担当する。
//! 実際の端末入力なしでテストできるよう、入力は `BufRead` で抽象化する。

use crate::error::{CoreError, Result};
use crate::model::Release;
use std::io::{BufRead, Write};

/// 自動選択: 最新（先頭）のリリースを返す
///
/// フィードが空の場合は `NoReleasesFound`。
pub fn latest_release<'a>(app_name: &str, releases: &'a [Release]) -> Result<&'a Release> {
    releases
        .first()
        .ok_or_else(|| CoreError::NoReleasesFound(app_name.to_string()))
}

/// 対話的セレクタ
///
/// 範囲外・数値以外の入力には上限なく再プロンプトする。
/// 入力ストリームが尽きた場合（EOF）は `InputClosed` で抜ける。
pub struct Selector<R> {
    input: R,
}

impl Selector<std::io::BufReader<std::io::Stdin>> {
    /// 標準入力から読むセレクタ
    pub fn from_stdin() -> Self {
        Self {
            input: std::io::BufReader::new(std::io::stdin()),
        }
    }
}

impl<R: BufRead> Selector<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// アプリケーションを番号で選択させる（1始まり、デフォルトなし）
    pub fn pick_application(&mut self, apps: &[String]) -> Result<String> {
        loop {
            for (i, app) in apps.iter().enumerate() {
                println!("[{}] {}", i + 1, app);
            }
            let line = self.prompt("ビルドするアプリの番号を入力してください: ")?;

            if let Ok(value) = line.parse::<usize>()
                && (1..=apps.len()).contains(&value)
            {
                return Ok(apps[value - 1].clone());
            }
            println!(
                "入力が正しくありません。1 から {} の番号を入力してください。",
                apps.len()
            );
        }
    }

    /// リリースを番号で選択させる
    ///
    /// `[0]` は「特定リリースなし（head をビルド）」。空入力はデフォルトの 1。
    /// 渡されたリリースが5件未満の場合は表示もその件数まで（番号に欠番なし）。
    pub fn pick_release(&mut self, releases: &[Release]) -> Result<Release> {
        loop {
            println!(
                "[0] 特定のリリースを指定しない（{} をビルド）",
                crate::model::HEAD_RELEASE
            );
            for (i, release) in releases.iter().enumerate() {
                println!(
                    "[{}] {} {} {}",
                    i + 1,
                    release.id,
                    release.title,
                    release.published_display()
                );
            }
            let line = self.prompt("ビルドするリリースの番号を入力してください [1]: ")?;

            // 空入力はデフォルトの 1
            let line = if line.is_empty() { "1" } else { line.as_str() };

            match line.parse::<usize>() {
                Ok(0) => return Ok(Release::head()),
                Ok(value) if (1..=releases.len()).contains(&value) => {
                    return Ok(releases[value - 1].clone());
                }
                _ => {
                    println!(
                        "入力が正しくありません。0 から {} の番号を入力してください。",
                        releases.len()
                    );
                }
            }
        }
    }

    /// yes/no の確認プロンプト
    ///
    /// 空入力は `default_yes` に従う。y/yes/n/no 以外は再プロンプト。
    pub fn confirm(&mut self, question: &str, default_yes: bool) -> Result<bool> {
        let suffix = if default_yes { " [Y/n] " } else { " [y/N] " };
        loop {
            let line = self.prompt(&format!("{}{}", question, suffix))?;
            if line.is_empty() {
                return Ok(default_yes);
            }
            match line.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => {
                    println!("'yes' か 'no'（または 'y' / 'n'）で答えてください。");
                }
            }
        }
    }

    /// プロンプトを表示して1行読む（trim 済み）
    fn prompt(&mut self, message: &str) -> Result<String> {
        print!("{}", message);
        std::io::stdout().flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            return Err(CoreError::InputClosed);
        }
        Ok(line.trim().to_string())
    }
}
