//! Path-prefix dispatch to upstream services and the public allow-list.

/// Upstream base URLs, path-prefix matched in declaration order.
#[derive(Debug, Clone)]
pub struct RouteTable {
    auth: String,
    patient: String,
    note: String,
}

impl RouteTable {
    pub fn new(
        auth: impl Into<String>,
        patient: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        RouteTable {
            auth: trim_base(auth.into()),
            patient: trim_base(patient.into()),
            note: trim_base(note.into()),
        }
    }

    pub fn upstream_for(&self, path: &str) -> Option<&str> {
        if path.starts_with("/api/auth") || path.starts_with("/api/users")
            || path.starts_with("/internal-auth")
        {
            Some(&self.auth)
        } else if path.starts_with("/api/patients") {
            Some(&self.patient)
        } else if path.starts_with("/api/notes") {
            Some(&self.note)
        } else {
            None
        }
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Paths that pass the gate unauthenticated: registration, login,
/// internal-token issuance, health and docs, and anything under /public.
pub fn is_public(path: &str) -> bool {
    path == "/api/auth/login"
        || path == "/api/auth/register"
        || path == "/internal-auth/internal-token"
        || path == "/health"
        || path.starts_with("/public")
        || path.starts_with("/docs")
}
