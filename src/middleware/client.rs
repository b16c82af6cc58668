use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use headers::{HeaderMapExt, UserAgent};
use std::convert::Infallible;
use std::net::SocketAddr;

/// Who sent the request, as recorded alongside contacts and downloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientMeta {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // first hop of X-Forwarded-For wins over the socket peer
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let ip = forwarded.or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        let user_agent = parts
            .headers
            .typed_get::<UserAgent>()
            .map(|ua| ua.as_str().to_string());

        Ok(Self { ip, user_agent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> ClientMeta {
        let (mut parts, _) = req.into_parts();
        ClientMeta::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn forwarded_for_first_hop_is_used() {
        let req = Request::builder()
            .header("x-forwarded-for", " 203.0.113.7 , 10.0.0.1")
            .header("user-agent", "curl/8.0")
            .body(())
            .unwrap();
        let meta = extract(req).await;
        assert_eq!(meta.ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(meta.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[tokio::test]
    async fn falls_back_to_peer_address() {
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 5555))));
        let meta = extract(req).await;
        assert_eq!(meta.ip.as_deref(), Some("192.0.2.1"));
        assert_eq!(meta.user_agent, None);
    }
}
