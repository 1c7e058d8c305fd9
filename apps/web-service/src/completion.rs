//! # 非同期完了
//!
//! ハンドラが即座に結果を返せない操作のための完了ハンドル。
//!
//! ```text
//! let (completion, pending) = completion::channel();
//! tokio::spawn(async move { completion.finish(outcome) });  // 1 回だけ
//! Rendered::Deferred(pending)                              // ノードはすぐ返る
//! ```
//!
//! - [`Completion::finish`] は `self` を消費するため二重完了は型で防がれる
//! - 応答の組み立ては同期ノードと同じ [`envelope::render`] を使う
//! - クライアントが先に切断しても操作は最後まで実行され、応答は破棄される

use axum::response::Response;
use tokio::sync::oneshot;

use crate::{
    envelope::{self, Outcome},
    error::ApiError,
};

/// 完了側のハンドル（操作を実行するタスクが保持する）
#[derive(Debug)]
pub struct Completion {
    sender: oneshot::Sender<Response>,
}

/// 応答側のハンドル（HTTP 接続が待機する）
#[derive(Debug)]
pub struct Pending {
    receiver: oneshot::Receiver<Response>,
}

/// 完了ハンドルの組を作成する
pub fn channel() -> (Completion, Pending) {
    let (sender, receiver) = oneshot::channel();
    (Completion { sender }, Pending { receiver })
}

impl Completion {
    /// 操作結果を書き込み、応答を確定する
    pub fn finish(self, outcome: Outcome) {
        if self.sender.send(envelope::render(outcome)).is_err() {
            tracing::debug!("クライアントが切断済みのため応答を破棄しました");
        }
    }

    /// 応答側がすでに破棄されているか
    pub fn is_abandoned(&self) -> bool {
        self.sender.is_closed()
    }
}

impl Pending {
    /// 応答の確定を待つ
    ///
    /// 完了側が `finish` せずに破棄された場合はエラーエンベロープを返す。
    pub async fn wait(self) -> Response {
        match self.receiver.await {
            Ok(response) => response,
            Err(_) => envelope::render(Err(ApiError::Abandoned)),
        }
    }
}
