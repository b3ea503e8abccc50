//! レジストリ認証
//!
//! `~/.docker/config.json` の auths セクションから認証情報を取得して
//! Bollard の `DockerCredentials` に変換する。認証情報がなければ
//! 匿名プッシュとして続行する。

use base64::Engine;
use bollard::auth::DockerCredentials;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Docker config.json の構造（必要な部分のみ）
#[derive(Debug, Deserialize)]
struct DockerConfigFile {
    #[serde(default)]
    auths: HashMap<String, AuthEntry>,
}

#[derive(Debug, Deserialize)]
struct AuthEntry {
    /// Base64エンコードされた "username:password"
    auth: Option<String>,
}

/// レジストリの認証情報を取得する
///
/// `DOCKER_CONFIG` 環境変数、なければ `~/.docker` の config.json を読む。
pub fn docker_credentials(registry: &str) -> Option<DockerCredentials> {
    let config_path = std::env::var("DOCKER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".docker"))
                .unwrap_or_else(|| PathBuf::from(".docker"))
        })
        .join("config.json");

    let content = std::fs::read_to_string(&config_path).ok()?;
    let credentials = parse_docker_credentials(&content, registry);
    if credentials.is_none() {
        debug!(registry = %registry, "No credentials found, pushing anonymously");
    }
    credentials
}

/// config.json の内容からレジストリの認証情報を取り出す
fn parse_docker_credentials(content: &str, registry: &str) -> Option<DockerCredentials> {
    let config: DockerConfigFile = serde_json::from_str(content).ok()?;
    let auth_b64 = config.auths.get(registry)?.auth.as_ref()?;

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(auth_b64)
        .ok()?;
    let auth_str = String::from_utf8(decoded).ok()?;
    let (username, password) = auth_str.split_once(':')?;

    Some(DockerCredentials {
        username: Some(username.to_string()),
        password: Some(password.to_string()),
        serveraddress: Some(registry.to_string()),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_json(registry: &str, user_pass: &str) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(user_pass);
        format!(r#"{{"auths": {{"{}": {{"auth": "{}"}}}}}}"#, registry, encoded)
    }

    #[test]
    fn test_parse_docker_credentials() {
        let content = config_json("registry.example.com", "builder:s3cret");

        let credentials =
            parse_docker_credentials(&content, "registry.example.com").unwrap();
        assert_eq!(credentials.username.as_deref(), Some("builder"));
        assert_eq!(credentials.password.as_deref(), Some("s3cret"));
        assert_eq!(
            credentials.serveraddress.as_deref(),
            Some("registry.example.com")
        );
    }

    #[test]
    fn test_parse_docker_credentials_unknown_registry() {
        let content = config_json("ghcr.io", "builder:s3cret");
        assert!(parse_docker_credentials(&content, "registry.example.com").is_none());
    }

    #[test]
    fn test_parse_docker_credentials_malformed() {
        assert!(parse_docker_credentials("not json", "registry.example.com").is_none());
        assert!(parse_docker_credentials("{}", "registry.example.com").is_none());
    }
}
