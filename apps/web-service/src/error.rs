//! # 制御 API エラー定義
//!
//! リソースノードで発生するエラーと、エラーエンベロープへの変換を定義する。
//!
//! ## HTTP ステータス
//!
//! アプリケーションレベルのエラーは種別にかかわらずすべて `400 Bad Request` とし、
//! 種別はエンベロープの `msg` とログの `error.kind` でのみ区別する。
//! 認証失敗はこのエラー型を経由しない（Digest ゲートが 401 チャレンジを返す）。

use axum::response::{IntoResponse, Response};
use crawlctl_domain::ControllerError;
use crawlctl_infra::InfraError;
use thiserror::Error;

use crate::envelope;

/// リソースノードで発生するエラー
///
/// `Display` の結果がそのままエンベロープの `msg` になる。
#[derive(Debug, Error)]
pub enum ApiError {
    /// 必須引数がない
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// 引数をテキストとして解釈できない（UTF-8 でない）
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// ジョブステータス名が存在しない
    #[error("Unknown job status: {0}")]
    UnknownStatus(String),

    /// Controller が失敗を報告した（メッセージは素通しする）
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// プロセス情報を取得できない
    #[error("Process introspection failed")]
    Introspection(#[source] InfraError),

    /// リクエストボディを解析できない
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// レスポンスの組み立てに失敗した
    #[error("Failed to encode response: {0}")]
    Encoding(#[from] serde_json::Error),

    /// 非同期操作が応答を確定しないまま終了した
    #[error("Request was abandoned before completion")]
    Abandoned,
}

impl ApiError {
    /// ログ出力用のエラー種別
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingArgument(_) => "missing_argument",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::UnknownStatus(_) => "unknown_status",
            Self::Controller(_) => "controller",
            Self::Introspection(_) => "introspection",
            Self::MalformedBody(_) => "malformed_body",
            Self::Encoding(_) => "encoding",
            Self::Abandoned => "abandoned",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        envelope::render(Err(self))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ApiError::MissingArgument("id".to_string()), "Missing argument: id")]
    #[case(ApiError::UnknownStatus("UNKNOWN".to_string()), "Unknown job status: UNKNOWN")]
    #[case(
        ApiError::Controller(ControllerError::failed("Scheduler is shutting down")),
        "Scheduler is shutting down"
    )]
    #[case(
        ApiError::Introspection(InfraError::introspection("pid が見つかりません")),
        "Process introspection failed"
    )]
    fn test_メッセージが利用者向けの文言になる(#[case] error: ApiError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_into_responseは400を返す() {
        let response = ApiError::Abandoned.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
