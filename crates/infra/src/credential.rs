//! # 資格情報ストア
//!
//! Digest 認証ゲートが参照する「プリンシパル名 → シークレット」の対応を提供する。
//!
//! Digest 方式ではサーバー側で `MD5(user:realm:password)` を再計算するため、
//! ストアは平文のシークレットを返す必要がある。ハッシュ済みパスワードは扱えない。

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::InfraError;

/// プリンシパル名からシークレットを引くトレイト
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// シークレットを取得する
    ///
    /// プリンシパルが存在しない場合は `Ok(None)` を返す。
    ///
    /// # Errors
    ///
    /// - ストアにアクセスできない場合
    async fn secret_for(&self, principal: &str) -> Result<Option<String>, InfraError>;
}

/// パスワードファイルによる資格情報ストア
///
/// 1 行に `user:password` を 1 組記述する。
///
/// - 空行と `#` で始まる行は無視する
/// - `:` を含まない行は無視する
/// - ユーザー名は大文字小文字を区別する
///
/// ファイルは問い合わせのたびに読み直すため、再起動なしで資格情報を更新できる。
#[derive(Debug, Clone)]
pub struct FilePasswordDb {
    path: PathBuf,
}

impl FilePasswordDb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// ファイル内容から指定ユーザーのパスワードを探す
fn lookup<'a>(contents: &'a str, principal: &str) -> Option<&'a str> {
    contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .find(|(user, _)| *user == principal)
        .map(|(_, password)| password)
}

#[async_trait]
impl CredentialStore for FilePasswordDb {
    async fn secret_for(&self, principal: &str) -> Result<Option<String>, InfraError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| InfraError::credential_store(&self.path, e))?;

        Ok(lookup(&contents, principal).map(str::to_string))
    }
}
