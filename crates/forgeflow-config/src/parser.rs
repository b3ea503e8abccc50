//! forge.kdl パーサー
//!
//! 設定ファイルのKDL構文をパースして [`Config`] を生成する。

use crate::error::{ConfigError, Result};
use crate::model::{Config, JenkinsConfig, default_sources, DEFAULT_NAMESPACE, DEFAULT_TIMEOUT_SECS};
use kdl::{KdlDocument, KdlNode};
use std::path::Path;

/// KDLファイルを Config にパースする
///
/// 相対パス設定（dockerfiles）は設定ファイルのあるディレクトリ基準で解決する。
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_config(&content, base_dir)
}

/// KDL文字列を Config にパースする
pub fn parse_config(content: &str, base_dir: &Path) -> Result<Config> {
    let doc: KdlDocument = content.parse()?;

    let mut registry = None;
    let mut namespace = DEFAULT_NAMESPACE.to_string();
    let mut dockerfiles = "dockerfiles".to_string();
    let mut insecure_skip_tls_verify = false;
    let mut timeout_secs = DEFAULT_TIMEOUT_SECS;
    let mut sources = default_sources();
    let mut jenkins = None;

    for node in doc.nodes() {
        match node.name().value() {
            "registry" => {
                registry = first_string(node).map(|s| s.to_string());
            }
            "namespace" => {
                if let Some(value) = first_string(node) {
                    namespace = value.to_string();
                }
            }
            "dockerfiles" => {
                if let Some(value) = first_string(node) {
                    dockerfiles = value.to_string();
                }
            }
            "insecure-skip-tls-verify" => {
                // 引数なしのフラグ、または明示的な true/false
                insecure_skip_tls_verify = node
                    .entries()
                    .first()
                    .and_then(|e| e.value().as_bool())
                    .unwrap_or(true);
            }
            "timeout-secs" => {
                if let Some(value) = node.entries().first().and_then(|e| e.value().as_integer()) {
                    if value <= 0 {
                        return Err(ConfigError::InvalidConfig(
                            "timeout-secs は正の整数で指定してください".to_string(),
                        ));
                    }
                    timeout_secs = value as u64;
                }
            }
            "source" => {
                let (name, repo) = parse_source(node)?;
                sources.insert(name, repo);
            }
            "jenkins" => {
                jenkins = Some(parse_jenkins(node)?);
            }
            _ => {
                // 不明なノードはスキップ
            }
        }
    }

    let registry = registry.ok_or_else(|| {
        ConfigError::InvalidConfig("registry ノードが必要です".to_string())
    })?;

    Ok(Config {
        registry,
        namespace,
        dockerfiles_dir: base_dir.join(dockerfiles),
        insecure_skip_tls_verify,
        timeout_secs,
        sources,
        jenkins,
    })
}

/// source ノードをパース: `source "name" repo="https://..."`
fn parse_source(node: &KdlNode) -> Result<(String, String)> {
    let name = first_string(node)
        .ok_or_else(|| ConfigError::InvalidConfig("source には名前が必要です".to_string()))?
        .to_string();

    let repo = node
        .entries()
        .iter()
        .find(|e| e.name().map(|n| n.value()) == Some("repo"))
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| {
            ConfigError::InvalidConfig(format!("source \"{}\" に repo が必要です", name))
        })?
        .to_string();

    Ok((name, repo))
}

/// jenkins ノードをパース
fn parse_jenkins(node: &KdlNode) -> Result<JenkinsConfig> {
    let mut url = None;
    let mut job = None;
    let mut user = None;
    let mut api_token = None;
    let mut trigger_token = None;
    let mut email = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let value = first_string(child).map(|s| s.to_string());
            match child.name().value() {
                "url" => url = value,
                "job" => job = value,
                "user" => user = value,
                "api-token" => api_token = value,
                "trigger-token" => trigger_token = value,
                "email" => email = value,
                _ => {}
            }
        }
    }

    let require = |field: Option<String>, name: &str| {
        field.ok_or_else(|| {
            ConfigError::InvalidConfig(format!("jenkins ブロックに {} が必要です", name))
        })
    };

    Ok(JenkinsConfig {
        url: require(url, "url")?,
        job: require(job, "job")?,
        user: require(user, "user")?,
        api_token: require(api_token, "api-token")?,
        trigger_token: require(trigger_token, "trigger-token")?,
        email: require(email, "email")?,
    })
}

/// ノードの最初の文字列引数
fn first_string(node: &KdlNode) -> Option<&str> {
    node.entries().first().and_then(|e| e.value().as_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
registry "registry.example.com"
namespace "ethereum"
dockerfiles "dockerfiles"
timeout-secs 10

source "go_ethereum" repo="https://github.com/ethereum/go-ethereum"
source "nimbus" repo="https://github.com/status-im/nimbus-eth2"

jenkins {
    url "https://jenkins.example.com"
    job "ethereum-builder"
    user "builder"
    api-token "secret-token"
    trigger-token "remote-trigger"
    email "ops@example.com"
}
"#;

    #[test]
    fn test_parse_config_full() {
        let config = parse_config(SAMPLE_CONFIG, Path::new("/etc/forgeflow")).unwrap();

        assert_eq!(config.registry, "registry.example.com");
        assert_eq!(config.namespace, "ethereum");
        assert_eq!(
            config.dockerfiles_dir,
            Path::new("/etc/forgeflow/dockerfiles")
        );
        assert_eq!(config.timeout_secs, 10);
        assert!(!config.insecure_skip_tls_verify);

        // 組み込みソース + 追加1件
        assert_eq!(config.sources.len(), 7);
        assert_eq!(
            config.sources.get("nimbus").unwrap(),
            "https://github.com/status-im/nimbus-eth2"
        );

        let jenkins = config.jenkins.unwrap();
        assert_eq!(jenkins.url, "https://jenkins.example.com");
        assert_eq!(jenkins.job, "ethereum-builder");
        assert_eq!(jenkins.email, "ops@example.com");
    }

    #[test]
    fn test_parse_config_minimal() {
        let config = parse_config("registry \"reg.local:5000\"", Path::new(".")).unwrap();

        assert_eq!(config.registry, "reg.local:5000");
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.dockerfiles_dir, Path::new("./dockerfiles"));
        assert_eq!(config.sources, default_sources());
        assert!(config.jenkins.is_none());
    }

    #[test]
    fn test_parse_config_requires_registry() {
        let result = parse_config("namespace \"ethereum\"", Path::new("."));
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_parse_config_source_override() {
        let content = r#"
registry "reg.example.com"
source "go_ethereum" repo="https://github.com/example/go-ethereum-fork"
"#;
        let config = parse_config(content, Path::new(".")).unwrap();
        assert_eq!(config.sources.len(), 6);
        assert_eq!(
            config.sources.get("go_ethereum").unwrap(),
            "https://github.com/example/go-ethereum-fork"
        );
    }

    #[test]
    fn test_parse_config_insecure_flag() {
        let content = "registry \"reg\"\ninsecure-skip-tls-verify";
        let config = parse_config(content, Path::new(".")).unwrap();
        assert!(config.insecure_skip_tls_verify);

        let content = "registry \"reg\"\ninsecure-skip-tls-verify #false";
        let config = parse_config(content, Path::new(".")).unwrap();
        assert!(!config.insecure_skip_tls_verify);
    }

    #[test]
    fn test_parse_config_jenkins_missing_field() {
        let content = r#"
registry "reg"
jenkins {
    url "https://jenkins.example.com"
    job "builder"
}
"#;
        let result = parse_config(content, Path::new("."));
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_parse_config_invalid_timeout() {
        let content = "registry \"reg\"\ntimeout-secs 0";
        let result = parse_config(content, Path::new("."));
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_parse_config_skips_unknown_nodes() {
        let content = "registry \"reg\"\nfuture-feature \"whatever\"";
        let config = parse_config(content, Path::new(".")).unwrap();
        assert_eq!(config.registry, "reg");
    }
}
