//! ビルドコンテキスト作成
//!
//! ビルド定義ディレクトリを tar.gz アーカイブにまとめ、選択した
//! `Dockerfile.<app>` を正規名 `Dockerfile` として注入する。

use crate::error::{BuildError, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::path::Path;
use tar::Builder;
use tracing::debug;

/// ビルドコンテキストを tar.gz として作成する
pub fn build_context(context_dir: &Path, dockerfile: &Path) -> Result<Vec<u8>> {
    debug!(dir = %context_dir.display(), "Creating build context");

    let dockerfile_content = std::fs::read(dockerfile)?;

    let mut archive_data = Vec::new();
    {
        let encoder = GzEncoder::new(&mut archive_data, Compression::default());
        let mut tar = Builder::new(encoder);

        // コンテキストディレクトリを再帰的に追加
        tar.append_dir_all(".", context_dir)?;

        // 選択したビルド定義を "Dockerfile" として注入
        let mut header = tar::Header::new_gnu();
        header
            .set_path("Dockerfile")
            .map_err(|e| BuildError::BuildFailed(format!("Dockerfileの注入に失敗: {}", e)))?;
        header.set_size(dockerfile_content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        tar.append(&header, &dockerfile_content[..])?;

        tar.finish()?;
    }

    debug!(bytes = archive_data.len(), "Build context created");
    Ok(archive_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_build_context_injects_dockerfile() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("Dockerfile.teku"), "FROM eclipse-temurin").unwrap();
        fs::write(temp_dir.path().join("entrypoint.sh"), "#!/bin/sh").unwrap();

        let archive = build_context(
            temp_dir.path(),
            &temp_dir.path().join("Dockerfile.teku"),
        )
        .unwrap();
        assert!(!archive.is_empty());

        // 展開して正規名の Dockerfile が含まれることを確認
        let extract_dir = tempdir().unwrap();
        let decoder = flate2::read::GzDecoder::new(std::io::Cursor::new(archive));
        let mut tar = tar::Archive::new(decoder);
        tar.unpack(extract_dir.path()).unwrap();

        let injected = fs::read_to_string(extract_dir.path().join("Dockerfile")).unwrap();
        assert_eq!(injected, "FROM eclipse-temurin");
        assert!(extract_dir.path().join("entrypoint.sh").exists());
    }

    #[test]
    fn test_build_context_missing_dockerfile() {
        let temp_dir = tempdir().unwrap();
        let result = build_context(temp_dir.path(), &temp_dir.path().join("Dockerfile.nope"));
        assert!(result.is_err());
    }
}
