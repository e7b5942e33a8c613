use anyhow::{Context as AnyhowContext, Result};
use std::net::SocketAddr;

pub(crate) const AUTH_TOKEN_ENV: &str = "TANF_AUTH_TOKEN";

/// Bearer token required on every HTTP route when set.
#[derive(Clone, Debug)]
pub(crate) struct AuthToken {
    secret: String,
}

impl AuthToken {
    /// Flag first, then `TANF_AUTH_TOKEN`. A public server must end up with one.
    pub(crate) fn resolve(flag: Option<&str>, public: bool) -> Result<Option<Self>> {
        let raw = flag
            .map(str::to_string)
            .or_else(|| std::env::var(AUTH_TOKEN_ENV).ok());
        let token = Self::parse(raw.as_deref())?;
        if public && token.is_none() {
            anyhow::bail!("--public requires an auth token: set --auth-token or export {AUTH_TOKEN_ENV}");
        }
        Ok(token)
    }

    fn parse(raw: Option<&str>) -> Result<Option<Self>> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        let secret = raw.trim();
        if secret.is_empty() {
            anyhow::bail!("auth token must be non-empty")
        }
        Ok(Some(Self {
            secret: secret.to_string(),
        }))
    }

    /// Accepts `Bearer <token>` only.
    pub(crate) fn accepts(&self, authorization: &str) -> bool {
        authorization
            .trim()
            .strip_prefix("Bearer ")
            .is_some_and(|presented| constant_time_eq(presented.trim(), &self.secret))
    }
}

/// Resolves `bind` and refuses non-loopback addresses unless `public` is set.
pub(crate) async fn guarded_bind_addrs(bind: &str, public: bool) -> Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host(bind)
        .await
        .with_context(|| format!("Failed to resolve bind address: {bind}"))?
        .collect();
    if addrs.is_empty() {
        anyhow::bail!("Bind address resolved to zero socket addrs: {bind}")
    }

    let exposed = addrs.iter().any(|addr| !addr.ip().is_loopback());
    if exposed && !public {
        anyhow::bail!(
            "Refusing to bind to non-loopback address without --public: {bind}. To expose the calculator, pass --public and set {AUTH_TOKEN_ENV} (or --auth-token)."
        )
    }
    Ok(addrs)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |diff, (x, y)| diff | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_matches_bearer_header_only() {
        let token = AuthToken::parse(Some("  s3cr3t  ")).unwrap().unwrap();
        assert!(token.accepts("Bearer s3cr3t"));
        assert!(token.accepts("Bearer  s3cr3t  "));
        assert!(!token.accepts("s3cr3t"));
        assert!(!token.accepts("Basic s3cr3t"));
        assert!(!token.accepts("Bearer s3cr3"));
    }

    #[test]
    fn blank_token_is_rejected() {
        assert!(AuthToken::parse(Some("   ")).is_err());
        assert!(AuthToken::parse(None).unwrap().is_none());
    }

    #[test]
    fn explicit_token_satisfies_public() {
        assert!(AuthToken::resolve(Some("abc"), true).unwrap().is_some());
    }

    #[tokio::test]
    async fn non_loopback_requires_public() {
        guarded_bind_addrs("127.0.0.1:0", false).await.unwrap();
        assert!(guarded_bind_addrs("0.0.0.0:0", false).await.is_err());
        guarded_bind_addrs("0.0.0.0:0", true).await.unwrap();
    }
}
