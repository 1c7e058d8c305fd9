//! # crawlctl 共有ユーティリティ
//!
//! ワークスペース全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, web-service）から依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - axum など HTTP フレームワークには依存しない

pub mod envelope;
pub mod observability;

pub use envelope::{Envelope, EnvelopeStatus, Payload};
