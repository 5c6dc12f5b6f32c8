//! Ordered signature cascade
//!
//! Each rule is a `(matcher, code)` pair evaluated against the lowercased
//! combined output text. Order is load-bearing: several signature families
//! overlap (a timeout during install must win over a generic build timeout,
//! a 404 from the registry is a dependency error, not a registry outage), so
//! the cascade is an explicit slice rather than nested conditionals.

use crate::ErrorCode;

type Matcher = fn(&str) -> bool;

struct Rule {
    matches: Matcher,
    code: ErrorCode,
}

fn network_transient(text: &str) -> bool {
    const SIGNATURES: &[&str] = &[
        "enotfound",
        "etimedout",
        "econnreset",
        "econnrefused",
        "socket hang up",
    ];
    SIGNATURES.iter().any(|sig| text.contains(sig))
}

/// ENOENT during an npm invocation is treated as network-transient.
///
/// Heuristic tied to the observed operating environment, where this
/// signature has only ever correlated with a transient network condition.
/// In other environments it can mask a genuine missing-path bug.
fn install_context_enoent(text: &str) -> bool {
    text.contains("enoent") && text.contains("npm")
}

fn registry_unavailable(text: &str) -> bool {
    // A 404 from the registry is a missing package, handled below as a
    // dependency error.
    (text.contains("registry.npmjs.org") && !text.contains("404"))
        || text.contains("502 bad gateway")
        || text.contains("503 service unavailable")
}

fn install_timeout(text: &str) -> bool {
    text.contains("timeout") && text.contains("npm install")
}

fn dependency_resolution(text: &str) -> bool {
    text.contains("eresolve") || text.contains("peer dep") || text.contains("404")
}

fn type_check_failed(text: &str) -> bool {
    text.contains("type error") || text.contains("typescript") || text.contains("failed to compile")
}

fn memory_exhausted(text: &str) -> bool {
    text.contains("heap out of memory") || text.contains("out of memory") || text.contains("enomem")
}

fn build_timeout(text: &str) -> bool {
    text.contains("timeout") && (text.contains("next build") || text.contains("npm run build"))
}

fn rate_limited(text: &str) -> bool {
    text.contains("429") || text.contains("rate limit")
}

fn api_timeout(text: &str) -> bool {
    text.contains("api") && text.contains("timeout")
}

fn api_error(text: &str) -> bool {
    text.contains("api error")
}

fn upload_failed(text: &str) -> bool {
    text.contains("upload failed")
}

fn auth_failed(text: &str) -> bool {
    text.contains("netlify_auth_token") || text.contains("unauthorized") || text.contains("401")
}

fn config_invalid(text: &str) -> bool {
    text.contains("invalid configuration") || text.contains("invalid next.config")
}

fn build_unknown(text: &str) -> bool {
    text.contains("build failed")
}

const RULES: &[Rule] = &[
    Rule {
        matches: network_transient,
        code: ErrorCode::NetworkUnreachable,
    },
    Rule {
        matches: install_context_enoent,
        code: ErrorCode::NetworkUnreachable,
    },
    Rule {
        matches: registry_unavailable,
        code: ErrorCode::RegistryUnavailable,
    },
    Rule {
        matches: install_timeout,
        code: ErrorCode::InstallTimeout,
    },
    Rule {
        matches: dependency_resolution,
        code: ErrorCode::DependencyResolution,
    },
    Rule {
        matches: type_check_failed,
        code: ErrorCode::TypeCheckFailed,
    },
    Rule {
        matches: memory_exhausted,
        code: ErrorCode::MemoryExhausted,
    },
    Rule {
        matches: build_timeout,
        code: ErrorCode::BuildTimeout,
    },
    Rule {
        matches: rate_limited,
        code: ErrorCode::RateLimited,
    },
    Rule {
        matches: api_timeout,
        code: ErrorCode::ApiTimeout,
    },
    Rule {
        matches: api_error,
        code: ErrorCode::ApiError,
    },
    Rule {
        matches: upload_failed,
        code: ErrorCode::UploadFailed,
    },
    Rule {
        matches: auth_failed,
        code: ErrorCode::AuthFailed,
    },
    Rule {
        matches: config_invalid,
        code: ErrorCode::ConfigInvalid,
    },
    Rule {
        matches: build_unknown,
        code: ErrorCode::BuildUnknown,
    },
];

/// First matching code in cascade order, falling back to `Unknown`
pub(crate) fn match_code(text: &str) -> ErrorCode {
    RULES
        .iter()
        .find(|rule| (rule.matches)(text))
        .map_or(ErrorCode::Unknown, |rule| rule.code)
}
