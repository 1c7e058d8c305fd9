//! # リソースノード
//!
//! パスの最初のセグメントに対応するエンドポイントの契約と、組み込みノードを定義する。
//!
//! ## 契約
//!
//! - [`Resource`]: HTTP リクエストを受け取り完成したレスポンスを返す（ツリーが直接呼ぶ）
//! - [`JsonResource`]: JSON エンベロープを返すノード。[`JsonNode`] で包むと `Resource` になる
//!
//! `JsonResource` のメソッドは `None` で「そのメソッドは未対応」を表し、405 を返す。
//! HEAD は GET として扱う。405 の `Allow` ヘッダーには各ノードの [`JsonResource::ALLOW`] を使う。

pub mod home;
pub mod job;
pub mod project;
pub mod status;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header::ALLOW},
    response::{IntoResponse, Response},
};
use crawlctl_domain::Controller;
use crawlctl_infra::ProcessProbe;

pub use self::{
    home::Home,
    job::{CancelJob, ListJobs, ScheduleJob},
    project::{ListProjects, ListSpiders, PushProject},
    status::Status,
};
use crate::{
    args::ApiRequest,
    completion::Pending,
    envelope::{self, Outcome},
};

/// リソースノードが参照する協力者
#[derive(Clone)]
pub struct ResourceContext {
    pub controller: Arc<dyn Controller>,
    pub probe:      Arc<dyn ProcessProbe>,
}

impl ResourceContext {
    pub fn new(controller: Arc<dyn Controller>, probe: Arc<dyn ProcessProbe>) -> Self {
        Self { controller, probe }
    }
}

/// ツリーに配置できるノード
#[async_trait]
pub trait Resource: Send + Sync {
    async fn render(&self, request: Request<Body>) -> Response;
}

/// JSON ノードの処理結果
#[derive(Debug)]
pub enum Rendered {
    /// その場で確定した結果
    Ready(Outcome),
    /// 非同期に確定する結果
    Deferred(Pending),
}

impl From<Outcome> for Rendered {
    fn from(outcome: Outcome) -> Self {
        Self::Ready(outcome)
    }
}

/// GET のみ受け付けるノードの `Allow` 値
pub const ALLOW_GET: &str = "GET, HEAD";

/// POST のみ受け付けるノードの `Allow` 値
pub const ALLOW_POST: &str = "POST";

/// JSON エンベロープを返すノード
pub trait JsonResource: Send + Sync {
    /// 405 応答の `Allow` ヘッダー。`render_get` / `render_post` の実装と揃える
    const ALLOW: &'static str;

    fn render_get(&self, _request: &ApiRequest) -> Option<Rendered> {
        None
    }

    fn render_post(&self, _request: &ApiRequest) -> Option<Rendered> {
        None
    }
}

/// [`JsonResource`] を [`Resource`] として配置するためのラッパー
pub struct JsonNode<R> {
    inner: R,
}

impl<R: JsonResource> JsonNode<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn shared(inner: R) -> Arc<dyn Resource>
    where
        R: 'static,
    {
        Arc::new(Self::new(inner))
    }
}

#[async_trait]
impl<R: JsonResource> Resource for JsonNode<R> {
    async fn render(&self, request: Request<Body>) -> Response {
        let request = match ApiRequest::from_http(request).await {
            Ok(request) => request,
            Err(error) => return envelope::render(Err(error)),
        };

        let rendered = match *request.method() {
            Method::GET | Method::HEAD => self.inner.render_get(&request),
            Method::POST => self.inner.render_post(&request),
            _ => None,
        };

        match rendered {
            Some(Rendered::Ready(outcome)) => envelope::render(outcome),
            Some(Rendered::Deferred(pending)) => pending.wait().await,
            None => method_not_allowed(request.method(), R::ALLOW),
        }
    }
}

/// 未対応メソッドへの応答
pub fn method_not_allowed(method: &Method, allow: &'static str) -> Response {
    tracing::debug!(%method, "未対応のメソッドです");
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(ALLOW, allow)],
        "Method Not Allowed",
    )
        .into_response()
}

/// 存在しないパスへの応答
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "No Such Resource").into_response()
}
