//! Jenkins ビルドトリガクライアント
//!
//! 成功は HTTP 201 のみ。その他のステータスは失敗として報告する。
//! トリガは fire-and-forget で、ジョブの完了は追跡しない。

use crate::error::{Result, TriggerError};
use async_trait::async_trait;
use forgeflow_config::JenkinsConfig;
use forgeflow_core::{BuildRequest, normalize_release_tag};
use std::time::Duration;
use tracing::{info, warn};

/// リモートビルドトリガの能力インタフェース
#[async_trait]
pub trait BuildTrigger: Send + Sync {
    /// ビルドリクエストをCIシステムに送信する
    async fn trigger(&self, request: &BuildRequest) -> Result<()>;
}

/// Jenkins の buildWithParameters トリガ
pub struct JenkinsTrigger {
    client: reqwest::Client,
    jenkins: JenkinsConfig,
    registry: String,
}

impl JenkinsTrigger {
    pub fn new(
        jenkins: JenkinsConfig,
        registry: impl Into<String>,
        timeout: Duration,
        insecure_skip_tls_verify: bool,
    ) -> Result<Self> {
        if insecure_skip_tls_verify {
            warn!("TLS certificate verification is disabled for CI trigger");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure_skip_tls_verify)
            .build()?;

        Ok(Self {
            client,
            jenkins,
            registry: registry.into(),
        })
    }

    /// トリガURLを組み立てる
    ///
    /// リリースIDは正規化済みのタグで渡す。
    pub fn trigger_url(&self, request: &BuildRequest) -> Result<reqwest::Url> {
        let base = format!(
            "{}/job/{}/buildWithParameters",
            self.jenkins.url.trim_end_matches('/'),
            self.jenkins.job
        );
        let release = normalize_release_tag(&request.release_id);

        reqwest::Url::parse_with_params(
            &base,
            &[
                ("token", self.jenkins.trigger_token.as_str()),
                ("REGISTRY", self.registry.as_str()),
                ("RELEASE", release.as_str()),
                ("APP_NAME", request.app_name.as_str()),
                ("EMAIL", self.jenkins.email.as_str()),
            ],
        )
        .map_err(|e| TriggerError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl BuildTrigger for JenkinsTrigger {
    async fn trigger(&self, request: &BuildRequest) -> Result<()> {
        let url = self.trigger_url(request)?;
        info!(app = %request.app_name, release = %request.release_id, "Submitting remote build");

        let response = self
            .client
            .get(url)
            .basic_auth(&self.jenkins.user, Some(&self.jenkins.api_token))
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::CREATED {
            return Err(TriggerError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn trigger() -> JenkinsTrigger {
        let jenkins = JenkinsConfig {
            url: "https://jenkins.example.com/".to_string(),
            job: "ethereum-builder".to_string(),
            user: "builder".to_string(),
            api_token: "api-secret".to_string(),
            trigger_token: "remote-trigger".to_string(),
            email: "ops@example.com".to_string(),
        };
        JenkinsTrigger::new(jenkins, "registry.example.com", Duration::from_secs(5), false)
            .unwrap()
    }

    #[test]
    fn test_trigger_url() {
        let request = BuildRequest {
            app_name: "go_ethereum".to_string(),
            release_id: "v1.13.0+abc".to_string(),
        };

        let url = trigger().trigger_url(&request).unwrap();

        // 末尾スラッシュは畳まれる
        assert_eq!(
            url.as_str().split('?').next().unwrap(),
            "https://jenkins.example.com/job/ethereum-builder/buildWithParameters"
        );

        let params: HashMap<String, String> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(params["token"], "remote-trigger");
        assert_eq!(params["REGISTRY"], "registry.example.com");
        // リリースIDは正規化して送る
        assert_eq!(params["RELEASE"], "v1.13.0_abc");
        assert_eq!(params["APP_NAME"], "go_ethereum");
        assert_eq!(params["EMAIL"], "ops@example.com");
    }
}
