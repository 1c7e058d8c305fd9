//! # ハンドラレジストリ
//!
//! 設定に書かれたハンドラ名からリソースノードを生成するファクトリの登録表。
//! 組み込みノードは [`HandlerRegistry::with_builtins`] で登録済みになり、
//! 拡張ノードは [`HandlerRegistry::register`] で追加する。

use std::{collections::HashMap, fmt, sync::Arc};

use crate::resource::{
    CancelJob,
    JsonNode,
    ListJobs,
    ListProjects,
    ListSpiders,
    PushProject,
    Resource,
    ResourceContext,
    ScheduleJob,
    Status,
};

/// 組み込みハンドラ名
pub mod names {
    pub const STATUS: &str = "crawlctl_web::resource::Status";
    pub const PUSH_PROJECT: &str = "crawlctl_web::resource::PushProject";
    pub const LIST_PROJECTS: &str = "crawlctl_web::resource::ListProjects";
    pub const LIST_SPIDERS: &str = "crawlctl_web::resource::ListSpiders";
    pub const SCHEDULE_JOB: &str = "crawlctl_web::resource::ScheduleJob";
    pub const LIST_JOBS: &str = "crawlctl_web::resource::ListJobs";
    pub const CANCEL_JOB: &str = "crawlctl_web::resource::CancelJob";
}

/// 組み込みノードの既定配置（パスセグメント, ハンドラ名）
pub const DEFAULT_MODULES: [(&str, &str); 7] = [
    ("status", names::STATUS),
    ("push-project", names::PUSH_PROJECT),
    ("list-projects", names::LIST_PROJECTS),
    ("list-spiders", names::LIST_SPIDERS),
    ("schedule-job", names::SCHEDULE_JOB),
    ("list-jobs", names::LIST_JOBS),
    ("cancel-job", names::CANCEL_JOB),
];

/// コンテキストからノードを生成するファクトリ
pub type HandlerFactory = Arc<dyn Fn(&ResourceContext) -> Arc<dyn Resource> + Send + Sync>;

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    factories: HashMap<String, HandlerFactory>,
}

impl HandlerRegistry {
    /// 何も登録されていないレジストリ
    pub fn empty() -> Self {
        Self::default()
    }

    /// 組み込みノードを登録したレジストリ
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(names::STATUS, |ctx| {
            JsonNode::shared(Status::new(Arc::clone(&ctx.probe)))
        });
        registry.register(names::PUSH_PROJECT, |ctx| {
            JsonNode::shared(PushProject::new(Arc::clone(&ctx.controller)))
        });
        registry.register(names::LIST_PROJECTS, |ctx| {
            JsonNode::shared(ListProjects::new(Arc::clone(&ctx.controller)))
        });
        registry.register(names::LIST_SPIDERS, |ctx| {
            JsonNode::shared(ListSpiders::new(Arc::clone(&ctx.controller)))
        });
        registry.register(names::SCHEDULE_JOB, |ctx| {
            JsonNode::shared(ScheduleJob::new(Arc::clone(&ctx.controller)))
        });
        registry.register(names::LIST_JOBS, |ctx| {
            JsonNode::shared(ListJobs::new(Arc::clone(&ctx.controller)))
        });
        registry.register(names::CANCEL_JOB, |ctx| {
            JsonNode::shared(CancelJob::new(Arc::clone(&ctx.controller)))
        });
        registry
    }

    /// ファクトリを登録する（同名の登録は置き換える）
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ResourceContext) -> Arc<dyn Resource> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn resolve(&self, name: &str) -> Option<&HandlerFactory> {
        self.factories.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// 登録済みのハンドラ名（昇順）
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("names", &self.names())
            .finish()
    }
}
