//! # crawlctl インフラ層
//!
//! 制御 API が利用する外部協力者の具体実装を提供する。
//!
//! ## 責務
//!
//! - **資格情報ストア**: Digest 認証で参照するパスワードファイル
//! - **プロセス情報**: `status` エンドポイントのメモリ・CPU 使用量
//! - **開発用 Controller**: インメモリのスケジューラ代替（`test-utils` feature）
//!
//! ## モジュール構成
//!
//! - [`credential`] - 資格情報ストア
//! - [`probe`] - プロセス情報の取得
//! - [`error`] - インフラ層エラー定義
//! - `mock` - インメモリ Controller（`test-utils` feature 有効時のみ）

pub mod credential;
pub mod error;
#[cfg(feature = "test-utils")]
pub mod mock;
pub mod probe;

pub use credential::{CredentialStore, FilePasswordDb};
pub use error::{InfraError, InfraErrorKind};
pub use probe::{ProcessProbe, ProcessSample, SysinfoProbe};
