//! Administrative credential checks.
//!
//! Two secrets exist: the admin key (release, reset, export) and the view key
//! (admin panel, session login). A successful login hands out a per-process
//! session token that can stand in for the admin key on the panel and on exports.

/// Constant-time byte comparison (no early exit on the first mismatch).
///
/// Lengths are folded into the result instead of short-circuiting, so the
/// running time depends only on the longer input.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut diff = (a.len() ^ b.len()) as u64;
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= u64::from(x ^ y);
    }
    diff == 0
}

/// Whether `provided` matches the configured `expected` secret.
///
/// An empty configured secret never matches: leaving it unset disables the
/// operations it guards.
pub fn secret_matches(expected: &str, provided: &str) -> bool {
    !expected.is_empty() && constant_time_eq(expected.as_bytes(), provided.as_bytes())
}

/// Per-process admin session token.
///
/// Regenerated on every start, so restarting the server logs every admin out.
#[derive(Clone)]
pub struct AdminSession {
    token: String,
}

impl AdminSession {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self {
            token: uuid::Uuid::new_v4().simple().to_string(),
        }
    }

    /// Value to hand out in the session cookie.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether a presented cookie value belongs to this session.
    pub fn is_valid(&self, presented: &str) -> bool {
        secret_matches(&self.token, presented)
    }
}

impl std::fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession").finish_non_exhaustive()
    }
}
