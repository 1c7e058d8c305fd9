//! ジョブ関連のノード
//!
//! - `schedule-job` (POST): ジョブを登録し、ジョブ ID を返す
//! - `list-jobs` (GET): ステータスまたは ID でジョブを取得する
//! - `cancel-job` (POST, 非同期): ジョブを取り消す

use std::{str::FromStr, sync::Arc};

use crawlctl_domain::{Controller, JobId, JobStatus};
use crawlctl_shared::{Payload, envelope::fields};

use super::{ALLOW_GET, ALLOW_POST, JsonResource, Rendered};
use crate::{args::ApiRequest, completion, envelope::Outcome, error::ApiError};

pub struct ScheduleJob {
    controller: Arc<dyn Controller>,
}

impl ScheduleJob {
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        Self { controller }
    }

    fn schedule(&self, request: &ApiRequest) -> Outcome {
        let args = request.args();
        args.require_all(&["project", "spider", "when"])?;
        let project = args.text("project")?;
        let spider = args.text("spider")?;
        let when = args.text("when")?;

        let identifier = self.controller.schedule_job(&project, &spider, &when)?;
        tracing::debug!(
            %identifier,
            project = %project,
            spider = %spider,
            when = %when,
            "ジョブをスケジュールしました"
        );

        Ok(fields([("identifier", identifier.as_str().into())]))
    }
}

impl JsonResource for ScheduleJob {
    const ALLOW: &'static str = ALLOW_POST;

    fn render_post(&self, request: &ApiRequest) -> Option<Rendered> {
        Some(self.schedule(request).into())
    }
}

pub struct ListJobs {
    controller: Arc<dyn Controller>,
}

impl ListJobs {
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        Self { controller }
    }

    /// `status` と `id` の両方があれば `status` を優先する
    fn list(&self, request: &ApiRequest) -> Outcome {
        let args = request.args();
        args.require_any(&["status", "id"])?;

        let jobs = if args.contains("status") {
            let name = args.text("status")?;
            let status = JobStatus::from_str(&name).map_err(|_| ApiError::UnknownStatus(name))?;
            self.controller.get_jobs(status)?
        } else {
            let id = JobId::new(args.text("id")?);
            vec![self.controller.get_job(&id)?]
        };

        Ok(fields([("jobs", serde_json::to_value(&jobs)?)]))
    }
}

impl JsonResource for ListJobs {
    const ALLOW: &'static str = ALLOW_GET;

    fn render_get(&self, request: &ApiRequest) -> Option<Rendered> {
        Some(self.list(request).into())
    }
}

pub struct CancelJob {
    controller: Arc<dyn Controller>,
}

impl CancelJob {
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        Self { controller }
    }
}

impl JsonResource for CancelJob {
    const ALLOW: &'static str = ALLOW_POST;

    fn render_post(&self, request: &ApiRequest) -> Option<Rendered> {
        let (completion, pending) = completion::channel();

        let parsed = request
            .args()
            .require_all(&["id"])
            .and_then(|()| request.args().text("id"));

        match parsed {
            Err(error) => completion.finish(Err(error)),
            Ok(id) => {
                let controller = Arc::clone(&self.controller);
                let id = JobId::new(id);
                tokio::spawn(async move {
                    let outcome = match controller.cancel_job(&id).await {
                        Ok(()) => {
                            tracing::debug!(identifier = %id, "ジョブを取り消しました");
                            Ok(Payload::new())
                        }
                        Err(error) => Err(ApiError::from(error)),
                    };
                    completion.finish(outcome);
                });
            }
        }

        Some(Rendered::Deferred(pending))
    }
}
