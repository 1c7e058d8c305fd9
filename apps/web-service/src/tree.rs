//! # リソースツリー
//!
//! パスの最初のセグメントでノードを選ぶ、1 階層だけのルーティング表。
//!
//! - `""`（`/`）には常に [`Home`] が配置される
//! - セグメントは完全一致で照合し、該当がなければ 404 を返す
//! - 2 番目以降のセグメントは無視する（`/status/extra` は `status` に届く）

use std::{collections::HashMap, sync::Arc};

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    response::Response,
};
use thiserror::Error;

use crate::{
    config::ModuleBinding,
    registry::HandlerRegistry,
    resource::{self, Home, Resource, ResourceContext},
};

/// ツリー構築時のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("未登録のハンドラです: {handler} (/{segment})")]
    UnknownHandler { segment: String, handler: String },

    #[error("パスセグメントが重複しています: /{0}")]
    DuplicateSegment(String),
}

pub struct ResourceTree {
    children: HashMap<String, Arc<dyn Resource>>,
}

impl ResourceTree {
    /// `Home` だけを持つツリー
    pub fn new() -> Self {
        let mut children: HashMap<String, Arc<dyn Resource>> = HashMap::new();
        children.insert(String::new(), Arc::new(Home));
        Self { children }
    }

    /// 設定された配置に従ってノードを生成し、ツリーを構築する
    pub fn build(
        modules: &[ModuleBinding],
        registry: &HandlerRegistry,
        context: &ResourceContext,
    ) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        for module in modules {
            let factory =
                registry
                    .resolve(&module.handler)
                    .ok_or_else(|| TreeError::UnknownHandler {
                        segment: module.segment.clone(),
                        handler: module.handler.clone(),
                    })?;
            tree.put_child(module.segment.clone(), factory(context))?;
            tracing::debug!(segment = %module.segment, handler = %module.handler, "ノードを配置しました");
        }
        Ok(tree)
    }

    /// ノードを配置する
    pub fn put_child(
        &mut self,
        segment: impl Into<String>,
        node: Arc<dyn Resource>,
    ) -> Result<(), TreeError> {
        let segment = segment.into();
        if self.children.contains_key(&segment) {
            return Err(TreeError::DuplicateSegment(segment));
        }
        self.children.insert(segment, node);
        Ok(())
    }

    pub fn child(&self, segment: &str) -> Option<&Arc<dyn Resource>> {
        self.children.get(segment)
    }

    /// 配置済みのセグメント（昇順）
    pub fn segments(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self.children.keys().map(String::as_str).collect();
        segments.sort_unstable();
        segments
    }

    /// リクエストをノードに振り分ける
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let segment = first_segment(request.uri().path()).to_string();
        match self.children.get(&segment) {
            Some(node) => {
                let node = Arc::clone(node);
                node.render(request).await
            }
            None => {
                tracing::debug!(%segment, "未配置のパスです");
                resource::not_found()
            }
        }
    }

    /// すべてのリクエストをツリーで処理する Router に変換する
    pub fn into_router(self) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(Arc::new(self))
    }
}

impl Default for ResourceTree {
    fn default() -> Self {
        Self::new()
    }
}

async fn dispatch(State(tree): State<Arc<ResourceTree>>, request: Request<Body>) -> Response {
    tree.dispatch(request).await
}

fn first_segment(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.split('/').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/", "")]
    #[case("/status", "status")]
    #[case("/status/", "status")]
    #[case("/status/extra", "status")]
    #[case("/list-jobs", "list-jobs")]
    fn test_最初のセグメントを取り出す(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(first_segment(path), expected);
    }

    #[test]
    fn test_同じセグメントは二重に配置できない() {
        let mut tree = ResourceTree::new();

        let result = tree.put_child("", Arc::new(Home));

        assert_eq!(result, Err(TreeError::DuplicateSegment(String::new())));
    }

    #[tokio::test]
    async fn test_未配置のパスは404を返す() {
        let tree = ResourceTree::new();
        let request = Request::get("/no-such-thing").body(Body::empty()).unwrap();

        let response = tree.dispatch(request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ルートはhomeに届く() {
        let tree = ResourceTree::new();
        let request = Request::get("/").body(Body::empty()).unwrap();

        let response = tree.dispatch(request).await;

        assert_eq!(response.status(), StatusCode::OK);
    }
}
