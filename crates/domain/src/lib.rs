//! # crawlctl ドメイン層
//!
//! 制御 API が扱うジョブのモデルと、スケジューラ（Controller）との境界を定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! web-service → infra → domain
//!      ↘                  ↑
//!        ─────────────────
//! ```
//!
//! ドメイン層はスケジューラの実装（キューイング、クーロン計算、スパイダー実行、永続化）を
//! 一切含まない。それらは [`Controller`] トレイトの実装側の責務となる。
//!
//! ## モジュール構成
//!
//! - [`job`] - ジョブ、ジョブステータス、実行主体
//! - [`controller`] - スケジューラとの境界トレイト
//! - [`error`] - Controller が返すエラー
//! - [`clock`] - 時刻プロバイダ

pub mod clock;
pub mod controller;
pub mod error;
pub mod job;

pub use controller::Controller;
pub use error::ControllerError;
pub use job::{Actor, Job, JobId, JobStatus};
