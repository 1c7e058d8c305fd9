//! # プロセス情報
//!
//! `status` エンドポイントが返すメモリ使用量と CPU 使用率を取得する。

use std::sync::Mutex;

use sysinfo::{Pid, System};

use crate::InfraError;

/// プロセス情報のサンプル
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSample {
    /// 常駐メモリ（RSS）のバイト数
    pub memory_usage: u64,
    /// 前回のサンプル以降の CPU 使用率（%）
    pub cpu_usage:    f32,
}

/// プロセス情報を取得するトレイト
pub trait ProcessProbe: Send + Sync {
    /// 現在のプロセス情報を取得する
    ///
    /// # Errors
    ///
    /// - OS からプロセス情報を取得できない場合
    fn sample(&self) -> Result<ProcessSample, InfraError>;
}

/// sysinfo による自プロセスの情報取得
///
/// CPU 使用率は前回のリフレッシュとの差分で計算されるため、
/// `System` をサンプル間で保持する。
pub struct SysinfoProbe {
    pid:    Pid,
    system: Mutex<System>,
}

impl SysinfoProbe {
    /// 自プロセスを対象とするプローブを作成する
    ///
    /// # Errors
    ///
    /// - 自プロセスの PID を取得できない場合
    pub fn new() -> Result<Self, InfraError> {
        let pid = sysinfo::get_current_pid().map_err(InfraError::introspection)?;
        let mut system = System::new();
        system.refresh_process(pid);

        Ok(Self {
            pid,
            system: Mutex::new(system),
        })
    }
}

impl ProcessProbe for SysinfoProbe {
    fn sample(&self) -> Result<ProcessSample, InfraError> {
        let mut system = self
            .system
            .lock()
            .map_err(|_| InfraError::introspection("プローブのロックが破損しています"))?;

        if !system.refresh_process(self.pid) {
            return Err(InfraError::introspection(format!(
                "プロセスが見つかりません: pid={}",
                self.pid
            )));
        }

        let process = system.process(self.pid).ok_or_else(|| {
            InfraError::introspection(format!("プロセスが見つかりません: pid={}", self.pid))
        })?;

        Ok(ProcessSample {
            memory_usage: process.memory(),
            cpu_usage:    process.cpu_usage(),
        })
    }
}
