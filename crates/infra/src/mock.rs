//! # インメモリ Controller
//!
//! スケジューラ本体を持たない環境（開発サーバー、テスト）で使用する Controller 実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! crawlctl-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! ## 簡略化している点
//!
//! - アーカイブは UTF-8 テキストとして扱い、空でない各行をスパイダー名とみなす
//! - スケジュール式は解釈しない（`"now"` のみ利用者起点、それ以外はスケジューラ起点として記録）
//! - ジョブは実行されない（取り消し以外で状態は変化しない）

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use bytes::Bytes;
use crawlctl_domain::{
    Actor,
    Controller,
    ControllerError,
    Job,
    JobId,
    JobStatus,
    clock::{Clock, SystemClock},
};

#[derive(Default)]
struct State {
    projects: BTreeMap<String, Vec<String>>,
    jobs:     Vec<Job>,
}

/// インメモリ Controller
#[derive(Clone)]
pub struct InMemoryController {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryController {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryController {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
        }
    }

    /// プロジェクトを事前登録する（テスト用）
    pub fn with_project(self, name: &str, spiders: &[&str]) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.projects.insert(
                name.to_string(),
                spiders.iter().map(|s| (*s).to_string()).collect(),
            );
        }
        self
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, ControllerError> {
        self.state
            .lock()
            .map_err(|_| ControllerError::failed("Controller state is unavailable"))
    }
}

/// アーカイブからスパイダー名を取り出す
fn spiders_in(archive: &[u8]) -> Result<Vec<String>, ControllerError> {
    let text = std::str::from_utf8(archive)
        .map_err(|_| ControllerError::failed("Archive is not a valid project"))?;
    let spiders: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if spiders.is_empty() {
        return Err(ControllerError::failed("No spiders found in the archive"));
    }
    Ok(spiders)
}

#[async_trait]
impl Controller for InMemoryController {
    async fn push_project(
        &self,
        name: &str,
        archive: Bytes,
    ) -> Result<Vec<String>, ControllerError> {
        // 展開処理の代わりに一度スケジューラへ制御を返す
        tokio::task::yield_now().await;

        let spiders = spiders_in(&archive)?;
        self.state()?
            .projects
            .insert(name.to_string(), spiders.clone());
        tracing::debug!(project = name, spiders = spiders.len(), "プロジェクトを登録しました");

        Ok(spiders)
    }

    fn get_projects(&self) -> Result<Vec<String>, ControllerError> {
        Ok(self.state()?.projects.keys().cloned().collect())
    }

    fn get_spiders(&self, project: &str) -> Result<Vec<String>, ControllerError> {
        self.state()?
            .projects
            .get(project)
            .cloned()
            .ok_or_else(|| ControllerError::ProjectNotFound(project.to_string()))
    }

    fn schedule_job(
        &self,
        project: &str,
        spider: &str,
        when: &str,
    ) -> Result<JobId, ControllerError> {
        let mut state = self.state()?;
        let spiders = state
            .projects
            .get(project)
            .ok_or_else(|| ControllerError::ProjectNotFound(project.to_string()))?;
        if !spiders.iter().any(|s| s == spider) {
            return Err(ControllerError::SpiderNotFound {
                project: project.to_string(),
                spider:  spider.to_string(),
            });
        }

        let actor = if when == "now" {
            Actor::User
        } else {
            Actor::Scheduler
        };
        let identifier = JobId::generate();
        state.jobs.push(Job::new(
            identifier.clone(),
            actor,
            when,
            project,
            spider,
            self.clock.now(),
        ));

        Ok(identifier)
    }

    fn get_jobs(&self, status: JobStatus) -> Result<Vec<Job>, ControllerError> {
        Ok(self
            .state()?
            .jobs
            .iter()
            .filter(|job| job.status() == status)
            .cloned()
            .collect())
    }

    fn get_job(&self, id: &JobId) -> Result<Job, ControllerError> {
        self.state()?
            .jobs
            .iter()
            .find(|job| job.identifier() == id)
            .cloned()
            .ok_or_else(|| ControllerError::JobNotFound(id.to_string()))
    }

    async fn cancel_job(&self, id: &JobId) -> Result<(), ControllerError> {
        // プロセス停止の代わりに一度スケジューラへ制御を返す
        tokio::task::yield_now().await;

        let mut state = self.state()?;
        let job = state
            .jobs
            .iter_mut()
            .find(|job| job.identifier() == id)
            .ok_or_else(|| ControllerError::JobNotFound(id.to_string()))?;
        if !job.status().is_active() {
            return Err(ControllerError::failed(format!("Job is not active: {id}")));
        }

        *job = job.clone().with_status(JobStatus::Canceled);
        Ok(())
    }
}
