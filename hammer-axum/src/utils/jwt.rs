use crate::AppState;
use axum::extract::FromRef;
use hammer_core::ports::AuctionStore;
use jwt_simple::{
    algorithms::{HS256Key, MACLike},
    claims::JWTClaims,
};
use serde::{Deserialize, Serialize};

/// JWT verification service.
///
/// Handles verification of JWT tokens and extraction of claims.
/// Uses HS256 for signature verification.
#[derive(Clone)]
pub struct JwtVerifier(HS256Key);

impl JwtVerifier {
    /// Creates a new JwtVerifier from a secret string.
    pub fn from(secret: &str) -> Self {
        Self(HS256Key::from_bytes(secret.as_bytes()))
    }

    /// Verifies a token and extracts its claims if valid.
    pub fn claims(&self, token: &str) -> Option<JWTClaims<CustomClaims>> {
        // Process the claims. According to simple-jwt docs, this will automatically
        // check and verify all the things a responsible implementation should.
        self.0.verify_token::<CustomClaims>(token, None).ok()
    }
}

impl<S: AuctionStore> FromRef<AppState<S>> for JwtVerifier {
    fn from_ref(input: &AppState<S>) -> Self {
        input.jwt.clone()
    }
}

/// Custom claims structure for JWT tokens.
///
/// The identity collaborator resolves a display name for every connection;
/// it rides along as a custom claim so the engine never stores accounts.
#[derive(Serialize, Deserialize)]
pub struct CustomClaims {
    /// Display name of the authenticated user
    #[serde(default)]
    pub name: String,
}
