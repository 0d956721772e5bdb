use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{Ready, ready};

use crate::presentation::middleware::RequestId;

/// Rate-limit key for the calling client, derived from the connection's
/// peer address. Nothing authenticates it, so a spoofed source address
/// gets a fresh budget; that weakness is accepted, not patched over.
#[derive(Debug, Clone)]
pub struct ClientIdentity(pub String);

impl FromRequest for ClientIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let identity = req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_owned());
        ready(Ok(ClientIdentity(identity)))
    }
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}
