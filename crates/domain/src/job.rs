//! # ジョブ
//!
//! スケジューラが管理するジョブと、そのライフサイクル状態を表現する。
//!
//! 制御 API はこれらを所有せず、フィルタキー（[`JobStatus`]）と
//! レスポンスの `jobs` フィールド（[`Job`] のシリアライズ結果）としてのみ使用する。

use chrono::{DateTime, Utc};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

/// ジョブ ID
///
/// 形式は Controller に委ねる（制御 API は不透明な文字列として扱う）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
#[display("{_0}")]
pub struct JobId(String);

impl JobId {
    /// 新しい ID を生成する（UUID v7）
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// ジョブステータス
///
/// 文字列表現は大文字の名前（`PENDING` など）。
/// クエリ引数からの変換は名前の完全一致で行う。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    EnumString,
    EnumIter,
    strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// 実行待ち
    Pending,
    /// 実行中
    Running,
    /// 取り消し済み
    Canceled,
    /// 正常終了
    Successful,
    /// 異常終了
    Failed,
}

impl JobStatus {
    /// 取り消し可能な（まだ終了していない）状態か
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }
}

/// ジョブの実行主体
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Actor {
    /// スケジュールに従って起動された
    Scheduler,
    /// 利用者が即時実行を要求した
    User,
}

/// ジョブ
///
/// シリアライズ結果（辞書形式）は制御 API の `jobs` フィールドにそのまま格納される:
///
/// ```json
/// {
///   "identifier": "...",
///   "status": "PENDING",
///   "actor": "USER",
///   "schedule": "now",
///   "project": "quotesbot",
///   "spider": "toscrape-css",
///   "timestamp": "2024-01-01T00:00:00Z",
///   "duration": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    identifier: JobId,
    status:     JobStatus,
    actor:      Actor,
    schedule:   String,
    project:    String,
    spider:     String,
    timestamp:  DateTime<Utc>,
    /// 実行時間（秒）。終了していないジョブは `None`
    duration:   Option<u64>,
}

impl Job {
    /// 実行待ちのジョブを作成する
    pub fn new(
        identifier: JobId,
        actor: Actor,
        schedule: impl Into<String>,
        project: impl Into<String>,
        spider: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            identifier,
            status: JobStatus::Pending,
            actor,
            schedule: schedule.into(),
            project: project.into(),
            spider: spider.into(),
            timestamp,
            duration: None,
        }
    }

    pub fn with_status(self, status: JobStatus) -> Self {
        Self { status, ..self }
    }

    pub fn with_duration(self, duration: u64) -> Self {
        Self {
            duration: Some(duration),
            ..self
        }
    }

    pub fn identifier(&self) -> &JobId {
        &self.identifier
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn actor(&self) -> Actor {
        self.actor
    }

    pub fn schedule(&self) -> &str {
        &self.schedule
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn spider(&self) -> &str {
        &self.spider
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn duration(&self) -> Option<u64> {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("PENDING", JobStatus::Pending)]
    #[case("RUNNING", JobStatus::Running)]
    #[case("CANCELED", JobStatus::Canceled)]
    #[case("SUCCESSFUL", JobStatus::Successful)]
    #[case("FAILED", JobStatus::Failed)]
    fn test_job_statusは名前から変換できる(#[case] name: &str, #[case] expected: JobStatus) {
        assert_eq!(JobStatus::from_str(name).unwrap(), expected);
        assert_eq!(expected.to_string(), name);
    }

    #[rstest]
    #[case("pending")]
    #[case("UNKNOWN")]
    #[case("")]
    fn test_job_statusの不明な名前はエラー(#[case] name: &str) {
        assert!(JobStatus::from_str(name).is_err());
    }

    #[test]
    fn test_is_activeは終了前の状態のみtrue() {
        assert!(JobStatus::Pending.is_active());
        assert!(JobStatus::Running.is_active());
        assert!(!JobStatus::Canceled.is_active());
        assert!(!JobStatus::Successful.is_active());
        assert!(!JobStatus::Failed.is_active());
    }

    #[test]
    fn test_jobのシリアライズは辞書形式になる() {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let job = Job::new(
            JobId::new("abc123"),
            Actor::User,
            "now",
            "quotesbot",
            "toscrape-css",
            timestamp,
        )
        .with_status(JobStatus::Successful)
        .with_duration(42);

        let value = serde_json::to_value(&job).unwrap();

        assert_eq!(
            value,
            json!({
                "identifier": "abc123",
                "status": "SUCCESSFUL",
                "actor": "USER",
                "schedule": "now",
                "project": "quotesbot",
                "spider": "toscrape-css",
                "timestamp": "2024-01-02T03:04:05Z",
                "duration": 42
            })
        );
    }

    #[test]
    fn test_新規ジョブはpendingで実行時間なし() {
        let job = Job::new(
            JobId::generate(),
            Actor::Scheduler,
            "every 2 hours",
            "p",
            "s",
            Utc::now(),
        );

        assert_eq!(job.status(), JobStatus::Pending);
        assert_eq!(job.duration(), None);
        assert!(!job.identifier().as_str().is_empty());
    }
}
