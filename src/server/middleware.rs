//! Request authorization and envelope unwrapping.
//!
//! - [`Client`] is the identity check: the last token of the
//!   `Authorization` header must name a paired browser.
//! - [`Sealed`] is the payload check: on top of the identity check the
//!   body must be an envelope sealed by that browser. It is opened
//!   before the handler runs. `X-Content-Type: application/json` bodies
//!   are parsed as JSON; anything else is handed over as text, so only a
//!   `Sealed<String>` accepts it.
//! - [`sealed_json`] wraps a response the same way for the return trip.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::Serialize;

use crate::errors::{KitsupassError, Result};

use super::AppState;

/// Declares the type of a body hidden inside an envelope.
pub const X_CONTENT_TYPE: &str = "x-content-type";

/// Marks a response as envelope-wrapped.
pub const X_BCUP_API: &str = "x-bcup-api";

const ENVELOPE_SCHEME: &str = "enc,1";
const JSON: &str = "application/json";
const TEXT: &str = "text/plain";

/// The peer identifier carried in the `Authorization` header, if any.
fn peer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split_whitespace().last())
        .map(str::to_string)
}

/// A request from a paired browser.
#[derive(Debug, Clone)]
pub struct Client(pub String);

impl FromRequestParts<AppState> for Client {
    type Rejection = KitsupassError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let peer = peer_token(&parts.headers)
            .ok_or(KitsupassError::Unauthorized("No client key provided"))?;
        if !state.channel.is_registered(&peer) {
            return Err(KitsupassError::Unauthorized("No key registered"));
        }
        Ok(Self(peer))
    }
}

/// A request whose JSON body was sealed by a paired browser.
#[derive(Debug, Clone)]
pub struct Sealed<T> {
    pub client: Client,
    pub body: T,
}

impl<T> FromRequest<AppState> for Sealed<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = KitsupassError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self> {
        let (mut parts, body) = req.into_parts();
        let client = Client::from_request_parts(&mut parts, state).await?;
        let body_type = parts
            .headers
            .get(X_CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(TEXT)
            .to_string();

        let req = Request::from_parts(parts, body);
        let sealed = String::from_request(req, state)
            .await
            .map_err(|_| KitsupassError::BadRequest("body is not text".into()))?;

        let plaintext = state.decrypt(&client.0, sealed).await?;

        let body = decode_body(&body_type, plaintext)?;
        Ok(Self { client, body })
    }
}

/// Turn an opened envelope into the handler's body type.
fn decode_body<T: DeserializeOwned>(body_type: &str, plaintext: Vec<u8>) -> Result<T> {
    if body_type == JSON {
        return serde_json::from_slice(&plaintext)
            .map_err(|e| KitsupassError::BadRequest(e.to_string()));
    }

    let text = String::from_utf8(plaintext)
        .map_err(|_| KitsupassError::BadRequest("text payload is not UTF-8".into()))?;
    T::deserialize(text.into_deserializer()).map_err(|e: serde::de::value::Error| {
        KitsupassError::BadRequest(format!("unexpected {body_type} payload: {e}"))
    })
}

/// An unsealed JSON body. An empty body reads as `{}`.
#[derive(Debug, Clone)]
pub struct PlainJson<T>(pub T);

impl<T, S> FromRequest<S> for PlainJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = KitsupassError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| KitsupassError::BadRequest("unreadable body".into()))?;
        let bytes: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };

        serde_json::from_slice(bytes)
            .map(Self)
            .map_err(|e| KitsupassError::BadRequest(e.to_string()))
    }
}

/// Serialize `value`, seal it for `client` and add the envelope headers.
pub async fn sealed_json<T: Serialize>(
    state: &AppState,
    client: &Client,
    value: &T,
) -> Result<Response> {
    let json = serde_json::to_vec(value)
        .map_err(|e| KitsupassError::SerializationError(e.to_string()))?;
    let sealed = state.encrypt(&client.0, json).await?;

    Ok((
        [
            (X_BCUP_API, HeaderValue::from_static(ENVELOPE_SCHEME)),
            (CONTENT_TYPE.as_str(), HeaderValue::from_static(TEXT)),
            (X_CONTENT_TYPE, HeaderValue::from_static(JSON)),
        ],
        sealed,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_token_is_last_word() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Client  01ABC"));
        assert_eq!(peer_token(&headers).as_deref(), Some("01ABC"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("01ABC"));
        assert_eq!(peer_token(&headers).as_deref(), Some("01ABC"));
    }

    #[derive(Debug, serde::Deserialize)]
    struct Query {
        term: String,
    }

    #[test]
    fn json_payload_is_parsed() {
        let body: Query = decode_body(JSON, br#"{"term":"mail"}"#.to_vec()).unwrap();
        assert_eq!(body.term, "mail");
    }

    #[test]
    fn text_payload_passes_through() {
        let body: String = decode_body(TEXT, b"opaque {not json}".to_vec()).unwrap();
        assert_eq!(body, "opaque {not json}");
    }

    #[test]
    fn text_payload_for_json_handler_is_bad_request() {
        let err = decode_body::<Query>(TEXT, br#"{"term":"mail"}"#.to_vec()).unwrap_err();
        assert!(matches!(err, KitsupassError::BadRequest(_)));
    }

    #[test]
    fn peer_token_missing() {
        let mut headers = HeaderMap::new();
        assert!(peer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("   "));
        assert!(peer_token(&headers).is_none());
    }
}
