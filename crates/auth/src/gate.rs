//! Access gate: the per-navigation allow/redirect decision.
//!
//! - No IO
//! - No panics
//! - Looks at token *presence* only; validity is the resolver's business

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Where authenticated visitors land.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Static route partition used by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Reachable without a session (prefix match).
    pub public_prefixes: Vec<String>,

    /// Framework-internal and API paths the gate never applies to.
    pub excluded_prefixes: Vec<String>,

    pub login_path: String,
    pub landing_path: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            public_prefixes: ["/login", "/register", "/forgot-password"]
                .map(String::from)
                .to_vec(),
            excluded_prefixes: ["/_next/static", "/_next/image", "/api", "/favicon.ico"]
                .map(String::from)
                .to_vec(),
            login_path: LOGIN_PATH.to_string(),
            landing_path: DASHBOARD_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Protected,
    Excluded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    RedirectTo(String),
}

impl AccessDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            AccessDecision::Allow => None,
            AccessDecision::RedirectTo(target) => Some(target),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    config: GateConfig,
}

impl AccessGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Pure, path-only classification.
    pub fn classify(&self, path: &str) -> RouteClass {
        let matches = |prefixes: &[String]| prefixes.iter().any(|p| path.starts_with(p.as_str()));

        if matches(&self.config.excluded_prefixes) {
            RouteClass::Excluded
        } else if matches(&self.config.public_prefixes) {
            RouteClass::Public
        } else {
            RouteClass::Protected
        }
    }

    /// Decide what happens to a navigation to `path`.
    ///
    /// Protected without a token goes to login carrying `redirect=<path>`;
    /// public with a token goes to the landing page; everything else passes.
    pub fn decide(&self, path: &str, has_token: bool) -> AccessDecision {
        let decision = match (self.classify(path), has_token) {
            (RouteClass::Protected, false) => AccessDecision::RedirectTo(format!(
                "{}?redirect={}",
                self.config.login_path,
                encode_redirect(path)
            )),
            (RouteClass::Public, true) => {
                AccessDecision::RedirectTo(self.config.landing_path.clone())
            }
            _ => AccessDecision::Allow,
        };

        tracing::debug!(path, has_token, ?decision, "access gate");
        decision
    }
}

/// Percent-encode a path for use as a query value, keeping `/` readable.
fn encode_redirect(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
