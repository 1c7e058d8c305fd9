//! # crawlctl 制御 API サーバー
//!
//! クロールジョブスケジューラの HTTP 制御面。
//!
//! ## エンドポイント（既定の配置）
//!
//! | パス | メソッド | 内容 |
//! |------|----------|------|
//! | `/` | GET | 固定の HTML |
//! | `/status` | GET | メモリ・CPU 使用量 |
//! | `/push-project` | POST | プロジェクトアーカイブの登録 |
//! | `/list-projects` | GET | プロジェクト一覧 |
//! | `/list-spiders` | GET | スパイダー一覧 |
//! | `/schedule-job` | POST | ジョブのスケジュール |
//! | `/list-jobs` | GET | ジョブ一覧 |
//! | `/cancel-job` | POST | ジョブの取り消し |
//!
//! 環境変数は [`crawlctl_web::config`] を参照。
//!
//! ## 起動方法
//!
//! ```bash
//! WEB_PORT=8000 cargo run -p crawlctl-web
//! WEB_AUTH=true WEB_AUTH_DB=./passwd cargo run -p crawlctl-web
//! ```

use std::{net::SocketAddr, sync::Arc};

use crawlctl_domain::Controller;
use crawlctl_infra::{ProcessProbe, SysinfoProbe, mock::InMemoryController};
use crawlctl_shared::observability::{TracingConfig, init_tracing};
use crawlctl_web::{HandlerRegistry, ResourceContext, WebConfig, build_app};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在しない場合は無視）
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("crawlctl-web");
    init_tracing(&tracing_config);
    let _span = tracing::info_span!("app", service = "crawlctl-web").entered();

    let config = WebConfig::from_env()?;
    tracing::info!(
        "制御 API サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    tracing::warn!("インメモリ Controller を使用します（ジョブは実行されず、再起動で消えます）");
    let controller: Arc<dyn Controller> = Arc::new(InMemoryController::new());
    let probe: Arc<dyn ProcessProbe> = Arc::new(SysinfoProbe::new()?);
    let context = ResourceContext::new(controller, probe);

    let app = build_app(&config, &context, &HandlerRegistry::with_builtins())?;

    let listener = TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("制御 API サーバーが起動しました: {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("制御 API サーバーを停止しました");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("シグナルハンドラを登録できません: {}", e);
    }
}
