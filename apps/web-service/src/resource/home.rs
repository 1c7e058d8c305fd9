//! ルートパスの静的ページ

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use super::{ALLOW_GET, Resource, method_not_allowed};

const GREETING: &str = "<html>Hello, world!</html>";

/// `/` に配置される静的ページ（JSON エンベロープではない）
pub struct Home;

#[async_trait]
impl Resource for Home {
    async fn render(&self, request: Request<Body>) -> Response {
        match *request.method() {
            Method::GET | Method::HEAD => {
                ([(CONTENT_TYPE, "text/html; charset=utf-8")], GREETING).into_response()
            }
            ref method => method_not_allowed(method, ALLOW_GET),
        }
    }
}
