use crate::auth::token::Claims;

/// The verified claims of the bearer token attached to a request.
///
/// Only [`TokenService::validate`](crate::auth::TokenService::validate) constructs
/// this outside of tests, so holding one proves the signature, issuer, audience
/// and expiry checks passed.
#[derive(Debug, Clone)]
pub struct Principal {
    claims: Claims,
}

impl Principal {
    pub(crate) fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}

/// Resolve the owner id used for every ownership decision.
///
/// The name-identifier claim wins; the generic `sub` claim is the fallback.
/// Blank values count as absent. `None` means the caller must be treated as
/// unauthenticated even though the token itself validated.
pub fn current_user_id(principal: &Principal) -> Option<&str> {
    non_blank(principal.claims.nameid.as_deref()).or_else(|| non_blank(principal.claims.sub.as_deref()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
