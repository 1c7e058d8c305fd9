//! # インフラ層エラー定義
//!
//! 資格情報ファイルやプロセス情報の取得で発生するエラーを表現する。
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別

use std::{fmt, path::PathBuf};

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// convenience constructor でエラーを生成すると、その時点のスパン情報が
/// 自動的にキャプチャされる。
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// 資格情報ファイルを読み込めない
    #[error("資格情報ファイルの読み込みに失敗しました: {}: {source}", .path.display())]
    CredentialStore {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// プロセス情報を取得できない
    #[error("プロセス情報の取得に失敗しました: {0}")]
    Introspection(String),
}

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 資格情報ファイルの読み込みエラーを生成する
    pub fn credential_store(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            kind:       InfraErrorKind::CredentialStore {
                path: path.into(),
                source,
            },
            span_trace: SpanTrace::capture(),
        }
    }

    /// プロセス情報の取得エラーを生成する
    pub fn introspection(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Introspection(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}
