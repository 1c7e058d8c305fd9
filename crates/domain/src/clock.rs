//! # 時計
//!
//! 制御 API で時刻に依存する処理は次の 2 つだけで、どちらもこのトレイト経由で現在時刻を得る。
//!
//! - Digest チャレンジの発行時刻と有効期限（Unix 秒で比較する）
//! - ジョブの作成時刻（`Job::timestamp`）
//!
//! テストでは [`ManualClock`] を注入し、チャレンジの期限切れなどを実時間を待たずに再現する。

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// 現在時刻の取得元
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// 現在時刻の Unix 秒
    fn unix_seconds(&self) -> i64 {
        self.now().timestamp()
    }
}

/// OS の時計
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 手動で進める時計
///
/// 明示的に進めない限り同じ時刻を返す。
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
