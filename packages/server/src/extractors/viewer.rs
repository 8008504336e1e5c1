use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

use crate::error::AppError;

/// Identity used when the peer address is unknown.
pub const ANONYMOUS: &str = "anonymous";

/// Caller identity for likes and comments.
///
/// There are no accounts; the client's socket address stands in for a user.
/// Requests served without connect info all share [`ANONYMOUS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer(pub String);

impl Viewer {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| ANONYMOUS.to_string());
        Ok(Viewer(identity))
    }
}
