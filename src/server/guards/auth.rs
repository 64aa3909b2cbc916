use axum::{
    extract::FromRequestParts,
    http::{HeaderName, HeaderValue, request::Parts},
};
use axum_extra::headers::{self, Header, HeaderMapExt};

use crate::error::CatalogError;

pub static X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");

/// `X-User-Id`, set by the SPA from its auth provider's session. Blank values don't decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XUserId(pub String);

impl Header for XUserId {
    fn name() -> &'static HeaderName {
        &X_USER_ID
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let user = value
            .to_str()
            .map_err(|_| headers::Error::invalid())?
            .trim();
        if user.is_empty() {
            return Err(headers::Error::invalid());
        }
        Ok(XUserId(user.to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}

pub(crate) fn user_id(parts: &Parts) -> Option<String> {
    parts
        .headers
        .typed_get::<XUserId>()
        .map(|XUserId(user)| user)
}

/// Rejects the request with 401 unless `X-User-Id` is present.
#[derive(Debug, Clone)]
pub struct RequireUser(pub String);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_id(parts)
            .map(RequireUser)
            .ok_or(CatalogError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(user: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/software");
        if let Some(user) = user {
            builder = builder.header("x-user-id", user);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn present_user_is_extracted_trimmed() {
        let mut parts = parts(Some("  user_2abc "));
        let RequireUser(user) = RequireUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user, "user_2abc");
    }

    #[tokio::test]
    async fn missing_or_blank_user_is_unauthorized() {
        for header in [None, Some(""), Some("   ")] {
            let mut parts = parts(header);
            let err = RequireUser::from_request_parts(&mut parts, &())
                .await
                .unwrap_err();
            assert!(matches!(err, CatalogError::Unauthorized));
        }
    }
}
