//! # Controller（スケジューラ境界）
//!
//! 制御 API が状態を持つ操作をすべて委譲する先のインターフェース。
//!
//! ## 同期・非同期の区別
//!
//! | 操作 | 完了 |
//! |------|------|
//! | `push_project` | 非同期（アーカイブの展開とスパイダー列挙を待つ） |
//! | `cancel_job` | 非同期（実行中プロセスの停止を待つ） |
//! | その他 | 同期（呼び出し時点で結果が確定する） |
//!
//! 非同期操作の完了までの時間は Controller 側が制約する。制御 API はタイムアウトを持たない。
//!
//! ## 排他制御
//!
//! 制御 API はロックを取らない。同時リクエストに対する状態変更の整合性は
//! 実装側の責務とする。

use async_trait::async_trait;
use bytes::Bytes;

use crate::{ControllerError, Job, JobId, JobStatus};

/// スケジューラとの境界トレイト
#[async_trait]
pub trait Controller: Send + Sync {
    /// プロジェクトのアーカイブを登録し、含まれるスパイダー名を返す
    async fn push_project(&self, name: &str, archive: Bytes)
    -> Result<Vec<String>, ControllerError>;

    /// 登録済みプロジェクト名の一覧を返す
    fn get_projects(&self) -> Result<Vec<String>, ControllerError>;

    /// プロジェクトに含まれるスパイダー名の一覧を返す
    fn get_spiders(&self, project: &str) -> Result<Vec<String>, ControllerError>;

    /// ジョブをスケジュールし、新しいジョブ ID を返す
    ///
    /// `when` はスケジュール式で、解釈は実装に委ねる（`"now"` など）。
    fn schedule_job(&self, project: &str, spider: &str, when: &str)
    -> Result<JobId, ControllerError>;

    /// 指定ステータスのジョブ一覧を返す
    fn get_jobs(&self, status: JobStatus) -> Result<Vec<Job>, ControllerError>;

    /// ID でジョブを取得する
    fn get_job(&self, id: &JobId) -> Result<Job, ControllerError>;

    /// ジョブを取り消す
    async fn cancel_job(&self, id: &JobId) -> Result<(), ControllerError>;
}
