// Credential access for authenticated API calls.
//
// No global token store. The two facts the core actually needs — the
// token and the caller's numeric user id — come from an injected trait,
// so anonymous and signed-in flows differ only in which provider gets
// wired in.

/// Supplies the bearer token and caller identity for API requests.
pub trait CredentialProvider: Send + Sync {
    /// Bearer token for the Authorization header, if the caller is signed in.
    fn bearer_token(&self) -> Option<String>;

    /// The signed-in caller's numeric user id.
    fn user_id(&self) -> Option<i64>;
}

/// Fixed credentials, typically built from configuration.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    token: Option<String>,
    user_id: Option<i64>,
}

impl StaticCredentials {
    pub fn new(token: Option<String>, user_id: Option<i64>) -> Self {
        Self { token, user_id }
    }
}

impl CredentialProvider for StaticCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn user_id(&self) -> Option<i64> {
        self.user_id
    }
}

/// No credentials — every request goes out unauthenticated and resolved
/// reports never carry a caller vote.
pub struct Anonymous;

impl CredentialProvider for Anonymous {
    fn bearer_token(&self) -> Option<String> {
        None
    }

    fn user_id(&self) -> Option<i64> {
        None
    }
}
