//! # リクエスト引数
//!
//! クエリ文字列とフォームボディから引数を抽出し、必須チェックを行う。
//!
//! - 引数名はバイト列の値を 0 個以上持つ（同名の引数は出現順に保持する）
//! - 値の参照は常に先頭の値を使う
//! - ボディは `application/x-www-form-urlencoded` と `multipart/form-data` を受け付け、
//!   それ以外の Content-Type のボディは読まずに無視する

use std::collections::BTreeMap;

use axum::{
    body::Body,
    extract::{FromRequest, Multipart},
    http::{Method, Request, header::CONTENT_TYPE},
};
use bytes::Bytes;

use crate::error::ApiError;

/// リクエストボディの上限（プロジェクトアーカイブを受け付けられる大きさ）
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// 引数名 → 値（バイト列）の列
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    values: BTreeMap<String, Vec<Bytes>>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// 引数を追加する（同名の既存値の後ろに並ぶ）
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Bytes>) {
        self.values
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    /// URL エンコードされた `key=value&...` を追加する
    pub fn extend_urlencoded(&mut self, input: &[u8]) {
        for (name, value) in url::form_urlencoded::parse(input) {
            self.push(name.into_owned(), value.into_owned());
        }
    }

    /// 引数が 1 つ以上の値とともに存在するか
    pub fn contains(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(|values| !values.is_empty())
    }

    /// 先頭の値
    pub fn first(&self, name: &str) -> Option<&Bytes> {
        self.values.get(name).and_then(|values| values.first())
    }

    /// すべての引数が存在することを検証する
    ///
    /// 欠けている最初の引数名を `MissingArgument` として返す。
    pub fn require_all(&self, names: &[&str]) -> Result<(), ApiError> {
        match names.iter().find(|name| !self.contains(name)) {
            Some(missing) => Err(ApiError::MissingArgument((*missing).to_string())),
            None => Ok(()),
        }
    }

    /// いずれか 1 つ以上の引数が存在することを検証する
    ///
    /// 1 つもなければ候補名を `" or "` で連結して `MissingArgument` とする。
    pub fn require_any(&self, names: &[&str]) -> Result<(), ApiError> {
        if names.iter().any(|name| self.contains(name)) {
            Ok(())
        } else {
            Err(ApiError::MissingArgument(names.join(" or ")))
        }
    }

    /// 先頭の値をバイト列として取得する
    pub fn bytes(&self, name: &str) -> Result<Bytes, ApiError> {
        self.first(name)
            .cloned()
            .ok_or_else(|| ApiError::MissingArgument(name.to_string()))
    }

    /// 先頭の値を UTF-8 テキストとして取得する
    pub fn text(&self, name: &str) -> Result<String, ApiError> {
        let value = self.bytes(name)?;
        String::from_utf8(value.to_vec()).map_err(|_| ApiError::InvalidArgument(name.to_string()))
    }
}

/// リソースノードに渡す解析済みリクエスト
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path:   String,
    args:   Args,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, args: Args) -> Self {
        Self {
            method,
            path: path.into(),
            args,
        }
    }

    /// HTTP リクエストからメソッド・パス・引数を抽出する
    ///
    /// クエリ文字列の引数が先、ボディの引数が後に並ぶ。
    pub async fn from_http(request: Request<Body>) -> Result<Self, ApiError> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let mut args = Args::new();
        if let Some(query) = request.uri().query() {
            args.extend_urlencoded(query.as_bytes());
        }

        let body_kind = BodyKind::of(&request);
        match body_kind {
            BodyKind::UrlEncoded => {
                let body = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
                    .await
                    .map_err(|e| ApiError::MalformedBody(e.to_string()))?;
                args.extend_urlencoded(&body);
            }
            BodyKind::Multipart => read_multipart(request, &mut args).await?,
            BodyKind::Other => {}
        }

        Ok(Self::new(method, path, args))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn args(&self) -> &Args {
        &self.args
    }
}

enum BodyKind {
    UrlEncoded,
    Multipart,
    Other,
}

impl BodyKind {
    fn of(request: &Request<Body>) -> Self {
        let Some(content_type) = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        else {
            return Self::Other;
        };

        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "application/x-www-form-urlencoded" => Self::UrlEncoded,
            "multipart/form-data" => Self::Multipart,
            _ => Self::Other,
        }
    }
}

async fn read_multipart(request: Request<Body>, args: &mut Args) -> Result<(), ApiError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| ApiError::MalformedBody(e.to_string()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::MalformedBody(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .bytes()
            .await
            .map_err(|e| ApiError::MalformedBody(e.to_string()))?;
        args.push(name, value);
    }

    Ok(())
}
