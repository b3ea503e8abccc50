//! アプリケーションカタログ
//!
//! ビルド定義ディレクトリを走査し、`Dockerfile.<name>` 規約で
//! ビルド可能なアプリケーションを列挙する。

use crate::error::{CoreError, Result};
use crate::model::Application;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// ビルド定義ファイルの接頭辞
pub const DOCKERFILE_PREFIX: &str = "Dockerfile.";

/// ビルド可能なアプリケーションIDを列挙する
///
/// `Dockerfile.<name>` にマッチするファイル名の `<name>` 部分を返す。
/// 表示の安定性のためアルファベット順にソートする。
pub fn list_applications(dockerfiles_dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dockerfiles_dir)
        .map_err(|_| CoreError::CatalogUnavailable(dockerfiles_dir.to_path_buf()))?;

    let mut apps = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if let Some(name) = file_name.strip_prefix(DOCKERFILE_PREFIX)
            && !name.is_empty()
        {
            apps.push(name.to_string());
        }
    }

    apps.sort();
    debug!(count = apps.len(), dir = %dockerfiles_dir.display(), "Enumerated buildable applications");
    Ok(apps)
}

/// アプリケーションのビルド定義ファイルのパス
pub fn dockerfile_path(dockerfiles_dir: &Path, app_name: &str) -> PathBuf {
    dockerfiles_dir.join(format!("{}{}", DOCKERFILE_PREFIX, app_name))
}

/// カタログIDを上流ソース設定と突き合わせて [`Application`] に解決する
pub fn resolve_application(name: &str, sources: &HashMap<String, String>) -> Result<Application> {
    let repo = sources
        .get(name)
        .ok_or_else(|| CoreError::UnknownSource(name.to_string()))?;
    Ok(Application::new(name, repo))
}
