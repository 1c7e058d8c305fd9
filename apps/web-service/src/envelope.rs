//! # エンベロープの HTTP レスポンス化
//!
//! 操作結果からレスポンスを組み立てる唯一の経路。
//! 同期ノードの戻り値も非同期ノードの完了通知も [`render`] を通る。

use axum::{
    http::{
        HeaderValue,
        StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use crawlctl_shared::{Envelope, Payload};

use crate::error::ApiError;

/// 操作の結果
pub type Outcome = Result<Payload, ApiError>;

const JSON_CONTENT_TYPE: &str = "application/json";

/// 操作結果を完成した HTTP レスポンスに変換する
///
/// - 成功: `200` + `{"status":"ok", ...payload}`
/// - 失敗: `400` + `{"status":"error","msg":...}`
pub fn render(outcome: Outcome) -> Response {
    let (status, envelope) = match outcome {
        Ok(payload) => (StatusCode::OK, Envelope::ok(payload)),
        Err(error) => {
            if let ApiError::Introspection(source) = &error {
                tracing::error!(
                    error.kind = error.kind(),
                    span_trace = %source.span_trace(),
                    "プロセス情報の取得に失敗しました: {}",
                    source
                );
            } else {
                tracing::warn!(
                    error.kind = error.kind(),
                    "リクエストを処理できませんでした: {}",
                    error
                );
            }
            (StatusCode::BAD_REQUEST, Envelope::error(error.to_string()))
        }
    };

    let body = envelope.into_bytes();
    (
        status,
        [
            (CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE)),
            (CONTENT_LENGTH, HeaderValue::from(body.len())),
        ],
        body,
    )
        .into_response()
}
