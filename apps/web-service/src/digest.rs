//! # HTTP Digest 認証
//!
//! RFC 2617 の Digest 認証（MD5 / MD5-sess, qop=auth）のチャレンジ生成と応答検証。
//!
//! ## チャレンジ
//!
//! ```text
//! WWW-Authenticate: Digest nonce="<hex>", qop="auth", algorithm="md5",
//!                          realm="crawlctl", opaque="<md5hex>-<base64>"
//! ```
//!
//! `opaque` はサーバーだけが知る秘密鍵で署名した `nonce,クライアントIP,発行時刻` で、
//! 応答時にはこれを検証してチャレンジの出自と有効期限（15 分）を確認する。
//! サーバー側にチャレンジの状態は持たない。

use std::{collections::HashMap, sync::Arc};

use base64::{Engine, engine::general_purpose::STANDARD};
use crawlctl_domain::clock::Clock;
use crawlctl_infra::InfraError;
use md5::{Digest, Md5};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// 保護領域の名前
pub const REALM: &str = "crawlctl";

/// チャレンジの有効期間（秒）
pub const CHALLENGE_LIFETIME_SECS: i64 = 15 * 60;

/// 認証の失敗理由（ログ用。クライアントには常に 401 チャレンジを返す）
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization ヘッダーがありません")]
    MissingHeader,

    #[error("Digest 以外の認証方式です")]
    UnsupportedScheme,

    #[error("必須パラメータがありません: {0}")]
    MissingField(&'static str),

    #[error("未対応のアルゴリズムです: {0}")]
    UnsupportedAlgorithm(String),

    #[error("opaque を検証できません: {0}")]
    InvalidOpaque(&'static str),

    #[error("チャレンジの有効期限が切れています")]
    ExpiredChallenge,

    #[error("未登録のユーザーです: {0}")]
    UnknownPrincipal(String),

    #[error("応答ダイジェストが一致しません: {0}")]
    ResponseMismatch(String),

    #[error(transparent)]
    CredentialStore(#[from] InfraError),
}

/// チャレンジの発行と応答の解読を行う
pub struct DigestChallenger {
    private_key: String,
    clock:       Arc<dyn Clock>,
}

impl DigestChallenger {
    /// プロセスごとに新しい秘密鍵で作成する
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_private_key(hex::encode(rand::random::<[u8; 32]>()), clock)
    }

    pub fn with_private_key(private_key: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            private_key: private_key.into(),
            clock,
        }
    }

    /// `WWW-Authenticate` ヘッダーの値を生成する
    pub fn challenge(&self, client_ip: &str) -> String {
        let nonce = hex::encode(rand::random::<[u8; 16]>());
        let opaque = self.generate_opaque(&nonce, client_ip);
        format!(
            "Digest nonce=\"{nonce}\", qop=\"auth\", algorithm=\"md5\", realm=\"{REALM}\", opaque=\"{opaque}\""
        )
    }

    /// `Authorization` ヘッダーを解読し、検証可能な資格情報にする
    ///
    /// この段階ではパスワードは参照しない（チャレンジの出自と期限のみ確認する）。
    pub fn decode(
        &self,
        header: &str,
        method: &str,
        client_ip: &str,
    ) -> Result<DigestCredentials, AuthError> {
        let params = strip_scheme(header).ok_or(AuthError::UnsupportedScheme)?;
        let fields = parse_fields(params);

        let username = required(&fields, "username")?.to_string();
        let nonce = required(&fields, "nonce")?;
        let opaque = required(&fields, "opaque")?;
        required(&fields, "response")?;
        required(&fields, "uri")?;

        let algorithm = fields
            .get("algorithm")
            .map_or_else(|| "md5".to_string(), |a| a.to_ascii_lowercase());
        if algorithm != "md5" && algorithm != "md5-sess" {
            return Err(AuthError::UnsupportedAlgorithm(algorithm));
        }

        self.verify_opaque(opaque, nonce, client_ip)?;

        Ok(DigestCredentials {
            username,
            method: method.to_string(),
            algorithm,
            fields,
        })
    }

    fn generate_opaque(&self, nonce: &str, client_ip: &str) -> String {
        let key = format!("{nonce},{client_ip},{}", self.clock.unix_seconds());
        self.sign(&key)
    }

    fn sign(&self, key: &str) -> String {
        let digest = md5_hex(&[key.as_bytes(), self.private_key.as_bytes()]);
        format!("{digest}-{}", STANDARD.encode(key))
    }

    fn verify_opaque(&self, opaque: &str, nonce: &str, client_ip: &str) -> Result<(), AuthError> {
        let parts: Vec<&str> = opaque.split('-').collect();
        let &[digest, encoded] = parts.as_slice() else {
            return Err(AuthError::InvalidOpaque("形式が不正です"));
        };

        let key = STANDARD
            .decode(encoded)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or(AuthError::InvalidOpaque("base64 を復号できません"))?;

        let key_parts: Vec<&str> = key.split(',').collect();
        let &[key_nonce, key_ip, issued_at] = key_parts.as_slice() else {
            return Err(AuthError::InvalidOpaque("鍵の要素数が不正です"));
        };
        if key_nonce != nonce {
            return Err(AuthError::InvalidOpaque("nonce が一致しません"));
        }
        if key_ip != client_ip {
            return Err(AuthError::InvalidOpaque("クライアントが一致しません"));
        }

        // 署名を確認するまで発行時刻は信用しない
        let expected = md5_hex(&[key.as_bytes(), self.private_key.as_bytes()]);
        if !bool::from(expected.as_bytes().ct_eq(digest.as_bytes())) {
            return Err(AuthError::InvalidOpaque("署名が一致しません"));
        }

        let issued_at: i64 = issued_at
            .parse()
            .map_err(|_| AuthError::InvalidOpaque("発行時刻が不正です"))?;
        let age = self
            .clock
            .unix_seconds()
            .checked_sub(issued_at)
            .ok_or(AuthError::InvalidOpaque("発行時刻が不正です"))?;
        if age < 0 {
            return Err(AuthError::InvalidOpaque("発行時刻が未来です"));
        }
        if age > CHALLENGE_LIFETIME_SECS {
            return Err(AuthError::ExpiredChallenge);
        }
        Ok(())
    }
}

/// 解読済みの Digest 応答
#[derive(Debug, Clone)]
pub struct DigestCredentials {
    username:  String,
    method:    String,
    algorithm: String,
    fields:    HashMap<String, String>,
}

impl DigestCredentials {
    pub fn username(&self) -> &str {
        &self.username
    }

    /// パスワードから期待される応答を計算し、クライアントの応答と比較する
    pub fn check_password(&self, password: &str) -> bool {
        let response = self.field("response");
        let expected = self.expected_response(password);
        bool::from(expected.as_bytes().ct_eq(response.as_bytes()))
    }

    fn field(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", String::as_str)
    }

    fn expected_response(&self, password: &str) -> String {
        let nonce = self.field("nonce");
        let cnonce = self.fields.get("cnonce").map(String::as_str);
        let nc = self.fields.get("nc").map(String::as_str);

        let mut ha1 = md5_hex(&[
            self.username.as_bytes(),
            b":",
            REALM.as_bytes(),
            b":",
            password.as_bytes(),
        ]);
        if self.algorithm == "md5-sess" {
            ha1 = md5_hex(&[
                ha1.as_bytes(),
                b":",
                nonce.as_bytes(),
                b":",
                cnonce.unwrap_or_default().as_bytes(),
            ]);
        }
        let ha2 = md5_hex(&[self.method.as_bytes(), b":", self.field("uri").as_bytes()]);

        match (nc, cnonce) {
            (Some(nc), Some(cnonce)) => {
                let qop = self.fields.get("qop").map_or("auth", String::as_str);
                md5_hex(&[
                    ha1.as_bytes(),
                    b":",
                    nonce.as_bytes(),
                    b":",
                    nc.as_bytes(),
                    b":",
                    cnonce.as_bytes(),
                    b":",
                    qop.as_bytes(),
                    b":",
                    ha2.as_bytes(),
                ])
            }
            _ => md5_hex(&[ha1.as_bytes(), b":", nonce.as_bytes(), b":", ha2.as_bytes()]),
        }
    }
}

/// 連結したバイト列の MD5 を 16 進文字列で返す
pub fn md5_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Md5::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

fn required<'a>(
    fields: &'a HashMap<String, String>,
    name: &'static str,
) -> Result<&'a str, AuthError> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or(AuthError::MissingField(name))
}

/// `Digest ` の認証方式プレフィックスを除去する（大文字小文字を区別しない）
fn strip_scheme(header: &str) -> Option<&str> {
    let header = header.trim_start();
    let (scheme, params) = header.split_once(char::is_whitespace)?;
    scheme.eq_ignore_ascii_case("digest").then_some(params)
}

/// `key=value, key="quoted value", ...` を解析する
///
/// キーは小文字に正規化する。引用符内のカンマと `\"` エスケープを扱う。
fn parse_fields(params: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    let mut rest = params.trim();

    while !rest.is_empty() {
        let Some((key, after_key)) = rest.split_once('=') else {
            break;
        };
        let key = key.trim().trim_start_matches(',').trim().to_ascii_lowercase();
        let after_key = after_key.trim_start();

        let (value, remaining) = if let Some(quoted) = after_key.strip_prefix('"') {
            let mut value = String::new();
            let mut chars = quoted.char_indices();
            let mut end = quoted.len();
            while let Some((index, c)) = chars.next() {
                match c {
                    '\\' => {
                        if let Some((_, escaped)) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => {
                        end = index + 1;
                        break;
                    }
                    _ => value.push(c),
                }
            }
            (value, &quoted[end..])
        } else {
            let end = after_key.find(',').unwrap_or(after_key.len());
            (after_key[..end].trim().to_string(), &after_key[end..])
        };

        if !key.is_empty() {
            fields.insert(key, value);
        }
        rest = remaining.trim_start().trim_start_matches(',').trim_start();
    }

    fields
}
