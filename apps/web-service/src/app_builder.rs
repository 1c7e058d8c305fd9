//! # アプリケーション構築
//!
//! 設定と協力者からリソースツリーを組み立て、認証ゲートとトレースを重ねた Router を返す。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, middleware::from_fn_with_state};
use crawlctl_domain::clock::SystemClock;
use crawlctl_infra::FilePasswordDb;
use tower_http::trace::TraceLayer;

use crate::{
    args::MAX_BODY_BYTES,
    config::{AuthConfig, WebConfig},
    middleware::{DigestGate, digest_auth_middleware},
    registry::HandlerRegistry,
    resource::ResourceContext,
    tree::{ResourceTree, TreeError},
};

/// 設定に従ってアプリケーション全体を組み立てる
///
/// ツリーは 1 つだけ作り、認証済みのすべてのクライアントで共有する。
pub fn build_app(
    config: &WebConfig,
    context: &ResourceContext,
    registry: &HandlerRegistry,
) -> Result<Router, TreeError> {
    let tree = ResourceTree::build(&config.modules, registry, context)?;
    tracing::info!(segments = ?tree.segments(), "リソースツリーを構築しました");

    let gate = match &config.auth {
        AuthConfig::Disabled => {
            tracing::warn!("認証が無効です（WEB_AUTH=true で有効化）");
            None
        }
        AuthConfig::Digest { credential_db } => {
            tracing::info!(credential_db = %credential_db.display(), "Digest 認証を有効にします");
            Some(DigestGate::new(
                Arc::new(FilePasswordDb::new(credential_db)),
                Arc::new(SystemClock),
            ))
        }
    };

    Ok(build_router(tree, gate))
}

/// ツリーとゲートから Router を組み立てる
///
/// レイヤーは下に書いたものが外側になる。
/// 1. TraceLayer（最外）: 認証失敗を含むすべてのリクエストを記録
/// 2. DefaultBodyLimit: アーカイブを受け付けられるよう上限を引き上げる
/// 3. Digest ゲート: 認証に失敗したリクエストはツリーに届かない
pub fn build_router(tree: ResourceTree, gate: Option<DigestGate>) -> Router {
    let router = tree.into_router();
    let router = match gate {
        Some(gate) => router.layer(from_fn_with_state(gate, digest_auth_middleware)),
        None => router,
    };

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}
