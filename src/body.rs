use std::fmt;

use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

/// Request body that may arrive as JSON or as `application/x-www-form-urlencoded`.
/// Anything that isn't form-encoded is read as JSON.
pub struct JsonOrForm<T>(pub T);

/// Why the body couldn't be read. Handlers decide what status that becomes.
#[derive(Debug)]
pub struct BodyRejection(Response, String);

impl fmt::Display for BodyRejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.1)
    }
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        self.0
    }
}

impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            match Form::<T>::from_request(req, state).await {
                Ok(Form(value)) => Ok(JsonOrForm(value)),
                Err(rejection) => {
                    let msg = rejection.body_text();
                    Err(BodyRejection(rejection.into_response(), msg))
                }
            }
        } else {
            match Json::<T>::from_request(req, state).await {
                Ok(Json(value)) => Ok(JsonOrForm(value)),
                Err(rejection) => {
                    let msg = rejection.body_text();
                    Err(BodyRejection(rejection.into_response(), msg))
                }
            }
        }
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pair {
        a: String,
        #[serde(default)]
        b: Option<String>,
    }

    fn request(content_type: &str, body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    async fn extract(req: Request) -> Result<Pair, BodyRejection> {
        JsonOrForm::<Pair>::from_request(req, &()).await.map(|JsonOrForm(pair)| pair)
    }

    #[tokio::test]
    async fn reads_json() {
        let pair = extract(request("application/json", r#"{"a":"x","b":"y"}"#)).await.unwrap();
        assert_eq!(pair, Pair { a: "x".into(), b: Some("y".into()) });
    }

    #[tokio::test]
    async fn reads_form_with_charset() {
        let req = request("application/x-www-form-urlencoded; charset=UTF-8", "a=x%20y");
        let pair = extract(req).await.unwrap();
        assert_eq!(pair, Pair { a: "x y".into(), b: None });
    }

    #[tokio::test]
    async fn rejects_unreadable_bodies() {
        assert!(extract(request("application/json", "a=x")).await.is_err());
        assert!(extract(request("application/x-www-form-urlencoded", "b=y")).await.is_err());
        assert!(extract(request("text/plain", "a=x")).await.is_err());
    }
}
