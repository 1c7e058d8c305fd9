//! # 制御 API 設定
//!
//! 環境変数からサーバーの設定を読み込む。
//!
//! | 変数 | 既定値 | 内容 |
//! |------|--------|------|
//! | `WEB_HOST` | `0.0.0.0` | バインドアドレス |
//! | `WEB_PORT` | `7654` | ポート番号 |
//! | `WEB_AUTH` | `false` | Digest 認証の有効化（`true` / `false`） |
//! | `WEB_AUTH_DB` | なし | 資格情報ファイル（認証有効時は必須） |
//! | `WEB_MODULES` | 組み込み 7 ノード | `segment=handler` のカンマ区切り |

use std::{env, path::PathBuf};

use thiserror::Error;

use crate::registry::DEFAULT_MODULES;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 7654;

/// 設定の読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} は有効なポート番号である必要があります: {value}")]
    InvalidPort { name: &'static str, value: String },

    #[error("{name} は true または false である必要があります: {value}")]
    InvalidBool { name: &'static str, value: String },

    #[error("WEB_AUTH が有効な場合は WEB_AUTH_DB を設定してください")]
    MissingCredentialDb,

    #[error("WEB_MODULES の要素が不正です（segment=handler の形式で指定してください）: {0:?}")]
    InvalidModule(String),
}

/// パスセグメントとハンドラ名の対応
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleBinding {
    pub segment: String,
    pub handler: String,
}

impl ModuleBinding {
    pub fn new(segment: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            handler: handler.into(),
        }
    }
}

/// 認証方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// 認証なしでツリーを直接公開する
    Disabled,
    /// HTTP Digest 認証のゲートを通す
    Digest { credential_db: PathBuf },
}

/// 制御 API サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    /// バインドアドレス
    pub host:    String,
    /// ポート番号
    pub port:    u16,
    pub auth:    AuthConfig,
    /// ツリーに配置するノード
    pub modules: Vec<ModuleBinding>,
}

impl WebConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// テストでは環境変数の代わりに固定の表を渡す。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("WEB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("WEB_PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort {
                name: "WEB_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let auth = match lookup("WEB_AUTH") {
            Some(value) => parse_bool("WEB_AUTH", value)?,
            None => false,
        };
        let auth = if auth {
            let credential_db = lookup("WEB_AUTH_DB")
                .filter(|path| !path.trim().is_empty())
                .ok_or(ConfigError::MissingCredentialDb)?;
            AuthConfig::Digest {
                credential_db: PathBuf::from(credential_db),
            }
        } else {
            AuthConfig::Disabled
        };

        let modules = match lookup("WEB_MODULES") {
            Some(value) => parse_modules(&value)?,
            None => default_modules(),
        };

        Ok(Self {
            host,
            port,
            auth,
            modules,
        })
    }

    /// `host:port` 形式のバインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 組み込みノードの既定配置
pub fn default_modules() -> Vec<ModuleBinding> {
    DEFAULT_MODULES
        .iter()
        .map(|(segment, handler)| ModuleBinding::new(*segment, *handler))
        .collect()
}

/// `segment=handler,segment=handler` を解析する
///
/// 空の要素は読み飛ばす。セグメントは空文字と `/` を含むものを拒否する。
pub fn parse_modules(value: &str) -> Result<Vec<ModuleBinding>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let Some((segment, handler)) = entry.split_once('=') else {
                return Err(ConfigError::InvalidModule(entry.to_string()));
            };
            let (segment, handler) = (segment.trim(), handler.trim());
            if segment.is_empty() || segment.contains('/') || handler.is_empty() {
                return Err(ConfigError::InvalidModule(entry.to_string()));
            }
            Ok(ModuleBinding::new(segment, handler))
        })
        .collect()
}

fn parse_bool(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim() {
        v if v.eq_ignore_ascii_case("true") => Ok(true),
        v if v.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(ConfigError::InvalidBool { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::registry::names;

    // 環境変数はテスト間で共有されるため、固定の表から読み込んで検証する
    fn load(vars: &[(&str, &str)]) -> Result<WebConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        WebConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_既定値では認証なしで読み込める() {
        let config = load(&[]).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:7654");
        assert_eq!(config.auth, AuthConfig::Disabled);
        assert_eq!(config.modules, default_modules());
    }

    #[test]
    fn test_資格情報ファイルだけでは認証は有効にならない() {
        let config = load(&[("WEB_AUTH_DB", "/etc/crawlctl/passwd")]).unwrap();

        assert_eq!(config.auth, AuthConfig::Disabled);
    }

    #[rstest]
    #[case("true")]
    #[case("TRUE")]
    #[case(" True ")]
    fn test_web_authをtrueにするとdigest認証になる(#[case] value: &str) {
        let config = load(&[("WEB_AUTH", value), ("WEB_AUTH_DB", "/etc/crawlctl/passwd")]).unwrap();

        assert_eq!(
            config.auth,
            AuthConfig::Digest {
                credential_db: PathBuf::from("/etc/crawlctl/passwd"),
            }
        );
    }

    #[test]
    fn test_認証有効で資格情報ファイルがなければエラー() {
        assert_eq!(
            load(&[("WEB_AUTH", "true")]),
            Err(ConfigError::MissingCredentialDb)
        );
    }

    #[rstest]
    #[case("false")]
    #[case("FALSE")]
    #[case(" False ")]
    fn test_web_authをfalseにすると認証なしになる(#[case] value: &str) {
        let config = load(&[("WEB_AUTH", value), ("WEB_AUTH_DB", "/etc/crawlctl/passwd")]).unwrap();

        assert_eq!(config.auth, AuthConfig::Disabled);
    }

    #[test]
    fn test_web_authが真偽値でなければエラー() {
        assert_eq!(
            load(&[("WEB_AUTH", "0")]),
            Err(ConfigError::InvalidBool {
                name:  "WEB_AUTH",
                value: "0".to_string(),
            })
        );
    }

    #[test]
    fn test_ポート番号が不正ならエラー() {
        let result = load(&[("WEB_AUTH", "false"), ("WEB_PORT", "http")]);

        assert!(matches!(result, Err(ConfigError::InvalidPort { .. })));
    }

    #[test]
    fn test_web_modulesで配置を置き換えられる() {
        let config = load(&[
            ("WEB_AUTH", "false"),
            (
                "WEB_MODULES",
                "status=crawlctl_web::resource::Status, hello=acme::Hello,",
            ),
        ])
        .unwrap();

        assert_eq!(
            config.modules,
            vec![
                ModuleBinding::new("status", names::STATUS),
                ModuleBinding::new("hello", "acme::Hello"),
            ]
        );
    }

    #[rstest]
    #[case("status")]
    #[case("=crawlctl_web::resource::Status")]
    #[case("status=")]
    #[case("a/b=crawlctl_web::resource::Status")]
    fn test_不正なweb_modulesはエラー(#[case] value: &str) {
        assert!(matches!(
            parse_modules(value),
            Err(ConfigError::InvalidModule(_))
        ));
    }
}
