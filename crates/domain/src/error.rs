//! # Controller エラー定義
//!
//! スケジューラ（Controller）が操作の失敗を報告するためのエラー型。
//!
//! 制御 API はこのエラーのメッセージをそのままエラーエンベロープの `msg` に格納する。
//! そのためメッセージは利用者が読める英文とし、内部状態を含めないこと。

use thiserror::Error;

/// Controller の操作で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// 指定されたプロジェクトが存在しない
    #[error("Unknown project: {0}")]
    ProjectNotFound(String),

    /// 指定されたスパイダーがプロジェクトに存在しない
    #[error("Unknown spider: {project}/{spider}")]
    SpiderNotFound {
        project: String,
        spider:  String,
    },

    /// 指定されたジョブが存在しない
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// その他の失敗（メッセージは Controller 側で組み立てる）
    #[error("{0}")]
    Failed(String),
}

impl ControllerError {
    /// 汎用の失敗を作成する
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failedのメッセージはそのまま表示される() {
        let error = ControllerError::failed("Archive is corrupted");

        assert_eq!(error.to_string(), "Archive is corrupted");
    }

    #[test]
    fn test_spider_not_foundはプロジェクトとスパイダーを表示する() {
        let error = ControllerError::SpiderNotFound {
            project: "p1".to_string(),
            spider:  "s1".to_string(),
        };

        assert_eq!(error.to_string(), "Unknown spider: p1/s1");
    }
}
