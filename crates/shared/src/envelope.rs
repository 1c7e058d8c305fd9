//! # JSON レスポンスエンベロープ
//!
//! 制御 API の統一レスポンス形式を提供する。
//!
//! ```text
//! 成功: { "status": "ok", ...操作固有のフィールド }
//! 失敗: { "status": "error", "msg": "..." }
//! ```
//!
//! ## 設計
//!
//! - `Envelope` は純粋なデータ構造（HTTP ヘッダーやステータスコードは扱わない）
//! - axum レスポンスへの変換は web-service の責務（shared に axum 依存を入れない）
//! - 成功時の `status` は操作のペイロードで上書きできない

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 操作固有のフィールド（キーの挿入順を保持する）
pub type Payload = serde_json::Map<String, Value>;

/// エンベロープの `status` フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Ok,
    Error,
}

impl EnvelopeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// 統一レスポンスエンベロープ
///
/// ## 使用例
///
/// ```
/// use crawlctl_shared::envelope::{Envelope, fields};
///
/// let envelope = Envelope::ok(fields([("identifier", "abc123".into())]));
/// assert_eq!(
///     envelope.into_bytes(),
///     b"{\"status\":\"ok\",\"identifier\":\"abc123\"}\n".to_vec()
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    status: EnvelopeStatus,
    body:   Payload,
}

impl Envelope {
    /// 成功エンベロープを作成する
    ///
    /// `status` を先頭に置き、ペイロードのフィールドを挿入順のまま続ける。
    /// ペイロードに `status` キーが含まれていても無視する。
    pub fn ok(payload: Payload) -> Self {
        let mut body = Payload::with_capacity(payload.len() + 1);
        body.insert("status".to_string(), EnvelopeStatus::Ok.as_str().into());
        for (key, value) in payload {
            if key != "status" {
                body.insert(key, value);
            }
        }

        Self {
            status: EnvelopeStatus::Ok,
            body,
        }
    }

    /// エラーエンベロープを作成する
    ///
    /// `msg` はエラーメッセージをそのまま格納する（スタックトレース等は含めない）。
    pub fn error(msg: impl Into<String>) -> Self {
        let mut body = Payload::with_capacity(2);
        body.insert("status".to_string(), EnvelopeStatus::Error.as_str().into());
        body.insert("msg".to_string(), Value::String(msg.into()));

        Self {
            status: EnvelopeStatus::Error,
            body,
        }
    }

    pub fn status(&self) -> EnvelopeStatus {
        self.status
    }

    pub fn body(&self) -> &Payload {
        &self.body
    }

    /// ワイヤ表現（UTF-8 の JSON + 末尾改行）に変換する
    pub fn into_bytes(self) -> Vec<u8> {
        let mut text = Value::Object(self.body).to_string();
        text.push('\n');
        text.into_bytes()
    }
}

/// キーと値の組からペイロードを作成する
pub fn fields<K, const N: usize>(entries: [(K, Value); N]) -> Payload
where
    K: Into<String>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), value))
        .collect()
}
