use super::JwtVerifier;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use hammer_core::models::BidderId;
use uuid::Uuid;

/// An authenticated marketplace user.
///
/// This extractor verifies the JWT token from the request headers and
/// extracts the bidder id and display name. The same identity is used for
/// sellers finalizing a listing and for bidders submitting bids.
pub struct Bidder {
    /// The authenticated user's id
    pub id: BidderId,
    /// The authenticated user's display name
    pub name: String,
}

impl<S> FromRequestParts<S> for Bidder
where
    S: Send + Sync,
    JwtVerifier: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the bearer token, returning 401 if not provided
        let auth = Option::<TypedHeader<Authorization<Bearer>>>::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::UNAUTHORIZED)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        // Extract the claims from the bearer token, returning 401 if any errors occur
        let claims = JwtVerifier::from_ref(state)
            .claims(auth.token())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        // Extract the BidderId from the claims, returning 401 if subject cannot be parsed as UUID
        let subject = claims.subject.ok_or(StatusCode::UNAUTHORIZED)?;
        let id = Uuid::try_parse(&subject).map_err(|_| StatusCode::UNAUTHORIZED)?;
        Ok(Self {
            id: id.into(),
            name: claims.custom.name,
        })
    }
}
