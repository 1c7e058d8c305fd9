//! プロジェクト関連のノード
//!
//! - `push-project` (POST, 非同期): アーカイブを登録し、含まれるスパイダー名を返す
//! - `list-projects` (GET): 登録済みプロジェクト名
//! - `list-spiders` (GET): プロジェクトのスパイダー名

use std::sync::Arc;

use crawlctl_domain::Controller;
use crawlctl_shared::envelope::fields;

use super::{ALLOW_GET, ALLOW_POST, JsonResource, Rendered};
use crate::{args::ApiRequest, completion, envelope::Outcome, error::ApiError};

pub struct PushProject {
    controller: Arc<dyn Controller>,
}

impl PushProject {
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        Self { controller }
    }
}

impl JsonResource for PushProject {
    const ALLOW: &'static str = ALLOW_POST;

    fn render_post(&self, request: &ApiRequest) -> Option<Rendered> {
        let (completion, pending) = completion::channel();

        let parsed = request
            .args()
            .require_all(&["name", "archive"])
            .and_then(|()| Ok((request.args().text("name")?, request.args().bytes("archive")?)));

        match parsed {
            // 検証エラーはタスクを起動せずにその場で確定させる
            Err(error) => completion.finish(Err(error)),
            Ok((name, archive)) => {
                let controller = Arc::clone(&self.controller);
                tokio::spawn(async move {
                    tracing::debug!(project = %name, size = archive.len(), "プロジェクトを登録します");
                    let outcome: Outcome = match controller.push_project(&name, archive).await {
                        Ok(spiders) => Ok(fields([("spiders", spiders.into())])),
                        Err(error) => Err(ApiError::from(error)),
                    };
                    completion.finish(outcome);
                });
            }
        }

        Some(Rendered::Deferred(pending))
    }
}

pub struct ListProjects {
    controller: Arc<dyn Controller>,
}

impl ListProjects {
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        Self { controller }
    }
}

impl JsonResource for ListProjects {
    const ALLOW: &'static str = ALLOW_GET;

    fn render_get(&self, _request: &ApiRequest) -> Option<Rendered> {
        let outcome = self
            .controller
            .get_projects()
            .map(|projects| fields([("projects", projects.into())]))
            .map_err(ApiError::from);
        Some(outcome.into())
    }
}

pub struct ListSpiders {
    controller: Arc<dyn Controller>,
}

impl ListSpiders {
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        Self { controller }
    }

    fn list(&self, request: &ApiRequest) -> Outcome {
        request.args().require_all(&["project"])?;
        let project = request.args().text("project")?;
        let spiders = self.controller.get_spiders(&project)?;

        Ok(fields([
            ("project", project.into()),
            ("spiders", spiders.into()),
        ]))
    }
}

impl JsonResource for ListSpiders {
    const ALLOW: &'static str = ALLOW_GET;

    fn render_get(&self, request: &ApiRequest) -> Option<Rendered> {
        Some(self.list(request).into())
    }
}
