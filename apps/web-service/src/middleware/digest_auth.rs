//! # Digest 認証ゲート
//!
//! 認証が有効な場合、すべてのリクエストはこのゲートを通ってからツリーに届く。
//! 認証に失敗したリクエストはツリーに到達せず、理由によらず同じ 401 チャレンジを返す。

use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{
        HeaderValue,
        Method,
        Request,
        StatusCode,
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use crawlctl_domain::clock::Clock;
use crawlctl_infra::CredentialStore;

use crate::digest::{AuthError, DigestChallenger};

/// ゲートの状態
#[derive(Clone)]
pub struct DigestGate {
    challenger: Arc<DigestChallenger>,
    store:      Arc<dyn CredentialStore>,
}

impl DigestGate {
    pub fn new(store: Arc<dyn CredentialStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_challenger(store, DigestChallenger::new(clock))
    }

    pub fn with_challenger(store: Arc<dyn CredentialStore>, challenger: DigestChallenger) -> Self {
        Self {
            challenger: Arc::new(challenger),
            store,
        }
    }

    /// 認証済みのユーザー名を返す
    async fn authenticate(
        &self,
        header: Option<&str>,
        method: &Method,
        client_ip: &str,
    ) -> Result<String, AuthError> {
        let header = header.ok_or(AuthError::MissingHeader)?;
        let credentials = self.challenger.decode(header, method.as_str(), client_ip)?;

        let password = self
            .store
            .secret_for(credentials.username())
            .await?
            .ok_or_else(|| AuthError::UnknownPrincipal(credentials.username().to_string()))?;

        if !credentials.check_password(&password) {
            return Err(AuthError::ResponseMismatch(credentials.username().to_string()));
        }
        Ok(credentials.username().to_string())
    }

    fn challenge_response(&self, client_ip: &str) -> Response {
        let challenge = self.challenger.challenge(client_ip);
        match HeaderValue::from_str(&challenge) {
            Ok(value) => {
                (StatusCode::UNAUTHORIZED, [(WWW_AUTHENTICATE, value)], "Unauthorized").into_response()
            }
            Err(e) => {
                tracing::error!(error = %e, "チャレンジをヘッダーに設定できません");
                (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
            }
        }
    }
}

/// Digest 認証ミドルウェア
pub async fn digest_auth_middleware(
    State(gate): State<DigestGate>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client_ip = client_ip(&request);
    let method = request.method().clone();
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let result = gate
        .authenticate(header.as_deref(), &method, &client_ip)
        .await;
    match result {
        Ok(principal) => {
            tracing::debug!(%principal, "認証に成功しました");
            next.run(request).await
        }
        Err(AuthError::CredentialStore(e)) => {
            tracing::error!(
                error = %e,
                span_trace = %e.span_trace(),
                "資格情報ストアを参照できません"
            );
            gate.challenge_response(&client_ip)
        }
        Err(AuthError::MissingHeader) => gate.challenge_response(&client_ip),
        Err(e) => {
            tracing::debug!(reason = %e, client_ip = %client_ip, "認証に失敗しました");
            gate.challenge_response(&client_ip)
        }
    }
}

/// 接続元 IP アドレス（接続情報がなければ空文字）
fn client_ip(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use axum::{Router, middleware::from_fn_with_state, routing::get};
    use crawlctl_domain::clock::SystemClock;
    use crawlctl_infra::InfraError;
    use tower::ServiceExt;

    use super::*;
    use crate::digest::md5_hex;

    struct StaticStore(HashMap<String, String>);

    #[async_trait]
    impl CredentialStore for StaticStore {
        async fn secret_for(&self, principal: &str) -> Result<Option<String>, InfraError> {
            Ok(self.0.get(principal).cloned())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl CredentialStore for BrokenStore {
        async fn secret_for(&self, _principal: &str) -> Result<Option<String>, InfraError> {
            Err(InfraError::credential_store(
                "/nonexistent/passwd",
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ))
        }
    }

    fn app(store: Arc<dyn CredentialStore>) -> Router {
        let gate = DigestGate::new(store, Arc::new(SystemClock));
        Router::new()
            .route("/", get(|| async { "protected" }))
            .layer(from_fn_with_state(gate, digest_auth_middleware))
    }

    #[tokio::test]
    async fn test_資格情報がなければ401チャレンジを返す() {
        let store = StaticStore(HashMap::from([("admin".to_string(), "s3cret".to_string())]));

        let response = app(Arc::new(store))
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let challenge = response.headers().get(WWW_AUTHENTICATE).unwrap().to_str().unwrap();
        assert!(challenge.starts_with("Digest "));
        assert!(challenge.contains("realm=\"crawlctl\""));
    }

    #[tokio::test]
    async fn test_資格情報ストアの障害も401になる() {
        let app = app(Arc::new(BrokenStore));
        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let challenge = response.headers().get(WWW_AUTHENTICATE).unwrap().to_str().unwrap();
        let field = |name: &str| {
            let start = challenge.find(&format!("{name}=\"")).unwrap() + name.len() + 2;
            let end = start + challenge[start..].find('"').unwrap();
            challenge[start..end].to_string()
        };
        let (nonce, opaque) = (field("nonce"), field("opaque"));
        let ha1 = md5_hex(&[b"admin:crawlctl:s3cret".as_slice()]);
        let ha2 = md5_hex(&[b"GET:/".as_slice()]);
        let response = md5_hex(&[format!("{ha1}:{nonce}:{ha2}").as_bytes()]);
        let request = Request::get("/")
            .header(
                AUTHORIZATION,
                format!(
                    "Digest username=\"admin\", nonce=\"{nonce}\", uri=\"/\", response=\"{response}\", opaque=\"{opaque}\""
                ),
            )
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_接続情報がなければクライアントipは空文字() {
        let request = Request::get("/").body(Body::empty()).unwrap();

        assert_eq!(client_ip(&request), "");
    }
}
