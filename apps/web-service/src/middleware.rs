//! # ミドルウェア
//!
//! - [`digest_auth`] - HTTP Digest 認証ゲート

pub mod digest_auth;

pub use digest_auth::{DigestGate, digest_auth_middleware};
