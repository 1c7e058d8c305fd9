//! # crawlctl 制御 API
//!
//! クロールジョブスケジューラを HTTP で操作するための JSON API。
//!
//! ```text
//! HTTP ─▶ TraceLayer ─▶ Digest ゲート ─▶ ResourceTree ─▶ ノード ─▶ Controller
//!                        (WEB_AUTH)       /<segment>       │
//!                                                         ▼
//!                                        {"status":"ok", ...} / {"status":"error","msg":...}
//! ```
//!
//! ## モジュール構成
//!
//! - `args`: リクエスト引数の抽出と必須チェック
//! - `envelope`: 操作結果から HTTP レスポンスを組み立てる
//! - `completion`: 非同期ノードの完了ハンドル
//! - `resource`: ノードの契約と組み込みノード
//! - `registry`: ハンドラ名からノードを生成するレジストリ
//! - `tree`: パスセグメントによるディスパッチ
//! - `digest`, `middleware`: HTTP Digest 認証
//! - `config`: 環境変数からの設定読み込み
//! - `app_builder`: Router の組み立て

pub mod app_builder;
pub mod args;
pub mod completion;
pub mod config;
pub mod digest;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod registry;
pub mod resource;
pub mod tree;

pub use app_builder::{build_app, build_router};
pub use config::WebConfig;
pub use error::ApiError;
pub use registry::HandlerRegistry;
pub use resource::ResourceContext;
pub use tree::ResourceTree;
