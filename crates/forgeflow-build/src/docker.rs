//! Docker API 実行層
//!
//! [`crate::ImageExecutor`] のBollard実装。ビルド・プッシュの進捗は
//! ストリームで受け取り、そのまま標準出力に流す。

use crate::auth::docker_credentials;
use crate::context::build_context;
use crate::error::{BuildError, Result};
use crate::executor::ImageExecutor;
use async_trait::async_trait;
use bollard::Docker;
use colored::Colorize;
use forgeflow_core::dockerfile_path;
use futures_util::stream::StreamExt;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Bollard ベースのイメージ操作実行層
pub struct DockerExecutor {
    docker: Docker,
    dockerfiles_dir: PathBuf,
}

impl DockerExecutor {
    /// Dockerデーモンに接続する（ping による接続確認付き）
    pub async fn connect(dockerfiles_dir: PathBuf) -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        docker.ping().await?;
        Ok(Self {
            docker,
            dockerfiles_dir,
        })
    }

    /// ビルド出力の処理
    fn handle_build_output(&self, output: bollard::models::BuildInfo) -> Result<()> {
        if let Some(stream) = output.stream {
            print!("{}", stream);
        }

        if let Some(error) = output.error {
            return Err(BuildError::BuildFailed(error));
        }

        if let Some(error_detail) = output.error_detail {
            let message = error_detail
                .message
                .unwrap_or_else(|| "不明なビルドエラー".to_string());
            return Err(BuildError::BuildFailed(message));
        }

        if let Some(status) = output.status {
            println!("{}", status.cyan());
        }

        Ok(())
    }
}

#[async_trait]
impl ImageExecutor for DockerExecutor {
    async fn build(
        &self,
        app_name: &str,
        image: &str,
        tags: &[String],
        release_id: &str,
    ) -> Result<()> {
        let dockerfile = dockerfile_path(&self.dockerfiles_dir, app_name);
        if !dockerfile.is_file() {
            return Err(BuildError::DockerfileNotFound(dockerfile));
        }
        for tag in tags {
            validate_tag(tag)?;
        }

        let context_data = build_context(&self.dockerfiles_dir, &dockerfile)?;

        let primary = format!(
            "{}:{}",
            image,
            tags.first().map(String::as_str).unwrap_or("latest")
        );
        info!("Building image: {}", primary);

        let buildargs: HashMap<&str, &str> = HashMap::from([("RELEASE", release_id)]);

        #[allow(deprecated)]
        let options = bollard::image::BuildImageOptions {
            dockerfile: "Dockerfile",
            t: primary.as_str(),
            buildargs,
            rm: true,
            forcerm: true,
            pull: true,
            ..Default::default()
        };

        use bytes::Bytes;
        use http_body_util::{Either, Full};
        let body = Full::new(Bytes::from(context_data));
        let mut stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        while let Some(msg) = stream.next().await {
            match msg {
                Ok(output) => self.handle_build_output(output)?,
                Err(e) => return Err(BuildError::DockerConnection(e)),
            }
        }

        // 2つ目以降のタグを付与
        for tag in tags.iter().skip(1) {
            #[allow(deprecated)]
            let options = bollard::image::TagImageOptions {
                repo: image,
                tag: tag.as_str(),
            };
            self.docker.tag_image(&primary, Some(options)).await?;
            info!("Tagged: {}:{}", image, tag);
        }

        info!("Successfully built: {}", primary);
        Ok(())
    }

    async fn push(&self, image: &str, tag: &str) -> Result<()> {
        validate_tag(tag)?;
        let full_image = format!("{}:{}", image, tag);

        // イメージ名の先頭要素がレジストリホスト
        let registry = image.split('/').next().unwrap_or_default();
        let credentials = docker_credentials(registry);

        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> {
            tag: tag.to_string(),
        };

        println!("  → {}", full_image.cyan());

        #[allow(deprecated)]
        let mut stream = self.docker.push_image(image, Some(options), credentials);

        let mut error_message: Option<String> = None;
        while let Some(result) = stream.next().await {
            match result {
                Ok(progress) => {
                    if let Some(err) = progress.error {
                        error_message = Some(err);
                    } else if let Some(status) = progress.status {
                        match status.as_str() {
                            "Pushing" => {
                                print!(
                                    "\r  ↑ {} {}     ",
                                    status,
                                    progress.progress.as_deref().unwrap_or("")
                                );
                                std::io::stdout().flush().ok();
                            }
                            "Preparing" | "Waiting" => {}
                            _ => {
                                println!("\r  {} {}                    ", "✓".green(), status);
                            }
                        }
                    }
                }
                Err(e) => return Err(BuildError::PushFailed(e.to_string())),
            }
        }
        println!();

        if let Some(err) = error_message {
            return Err(BuildError::PushFailed(err));
        }

        info!("Pushed: {}", full_image);
        Ok(())
    }

    async fn prune(&self) -> Result<()> {
        let mut filters = HashMap::new();
        filters.insert("dangling".to_string(), vec!["true".to_string()]);

        let options = bollard::query_parameters::PruneImagesOptions {
            filters: Some(filters),
        };

        let result = self.docker.prune_images(Some(options)).await?;
        let deleted = result.images_deleted.as_ref().map(|v| v.len()).unwrap_or(0);
        let reclaimed = result.space_reclaimed.unwrap_or(0);
        info!(deleted, reclaimed, "Pruned dangling images");
        println!("  ✓ ダングリングイメージを削除 ({} 個)", deleted);
        Ok(())
    }
}

/// Dockerタグのバリデーション
///
/// 128文字以下、英数字とピリオド・ハイフン・アンダースコアのみ、
/// 先頭はピリオド・ハイフン以外。
pub fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(BuildError::InvalidTag("(空のタグ)".to_string()));
    }

    if tag.len() > 128 {
        return Err(BuildError::InvalidTag(format!(
            "タグが長すぎます ({} 文字、最大128)",
            tag.len()
        )));
    }

    if tag.starts_with('.') || tag.starts_with('-') {
        return Err(BuildError::InvalidTag(tag.to_string()));
    }

    for c in tag.chars() {
        if !c.is_ascii_alphanumeric() && c != '.' && c != '-' && c != '_' {
            return Err(BuildError::InvalidTag(format!(
                "タグに使えない文字 '{}': {}",
                c, tag
            )));
        }
    }

    Ok(())
}
