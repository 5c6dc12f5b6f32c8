#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Failure classification for the launchpad build pipeline
//!
//! Maps raw subprocess output to a typed failure taxonomy. Classification is
//! a pure function over the combined error text: the ordered rule cascade in
//! [`rules`] is evaluated top to bottom and the first match wins. Every code
//! carries static retry-policy metadata, so downstream retry decisions never
//! re-parse log text.
//!
//! The taxonomy's bias is "assume transience unless proven structural": only
//! dependency-resolution, type-check, configuration, and authentication
//! failures are fatal.

use serde::{Deserialize, Serialize};

mod rules;

/// Named bucket in the failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NetworkUnreachable,
    RegistryUnavailable,
    InstallTimeout,
    DependencyResolution,
    TypeCheckFailed,
    MemoryExhausted,
    BuildTimeout,
    RateLimited,
    ApiTimeout,
    ApiError,
    UploadFailed,
    AuthFailed,
    ConfigInvalid,
    BuildUnknown,
    Unknown,
}

impl ErrorCode {
    /// Stable snake_case identifier used in events, logs, and JSON output
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NetworkUnreachable => "network_unreachable",
            Self::RegistryUnavailable => "registry_unavailable",
            Self::InstallTimeout => "install_timeout",
            Self::DependencyResolution => "dependency_resolution",
            Self::TypeCheckFailed => "type_check_failed",
            Self::MemoryExhausted => "memory_exhausted",
            Self::BuildTimeout => "build_timeout",
            Self::RateLimited => "rate_limited",
            Self::ApiTimeout => "api_timeout",
            Self::ApiError => "api_error",
            Self::UploadFailed => "upload_failed",
            Self::AuthFailed => "auth_failed",
            Self::ConfigInvalid => "config_invalid",
            Self::BuildUnknown => "build_unknown",
            Self::Unknown => "unknown",
        }
    }

    /// Static retry-policy metadata for this code
    #[must_use]
    pub const fn classification(self) -> ErrorClassification {
        match self {
            Self::NetworkUnreachable => ErrorClassification {
                code: self,
                retryable: true,
                max_retries: 3,
                retry_delay_ms: 2000,
                description: "Network connection failed while fetching dependencies",
                suggested_fix: "Transient network issue; the build will be retried automatically",
            },
            Self::RegistryUnavailable => ErrorClassification {
                code: self,
                retryable: true,
                max_retries: 3,
                retry_delay_ms: 3000,
                description: "The package registry is unavailable",
                suggested_fix: "Registry outage or degradation; retry after a short wait",
            },
            Self::InstallTimeout => ErrorClassification {
                code: self,
                retryable: true,
                max_retries: 2,
                retry_delay_ms: 5000,
                description: "Dependency installation timed out",
                suggested_fix: "Slow network or registry; retrying usually succeeds",
            },
            Self::DependencyResolution => ErrorClassification {
                code: self,
                retryable: false,
                max_retries: 0,
                retry_delay_ms: 0,
                description: "Dependency resolution failed",
                suggested_fix: "Fix the dependency versions in package.json; retrying cannot help",
            },
            Self::TypeCheckFailed => ErrorClassification {
                code: self,
                retryable: false,
                max_retries: 0,
                retry_delay_ms: 0,
                description: "The project failed to compile",
                suggested_fix: "Fix the reported type or compile errors in the generated code",
            },
            Self::MemoryExhausted => ErrorClassification {
                code: self,
                retryable: true,
                max_retries: 1,
                retry_delay_ms: 5000,
                description: "The build ran out of memory",
                suggested_fix: "A clean retry sometimes succeeds; otherwise reduce project size",
            },
            Self::BuildTimeout => ErrorClassification {
                code: self,
                retryable: true,
                max_retries: 1,
                retry_delay_ms: 0,
                description: "The production build timed out",
                suggested_fix: "Retry once; persistent timeouts indicate a build-time loop",
            },
            Self::RateLimited => ErrorClassification {
                code: self,
                retryable: true,
                max_retries: 3,
                retry_delay_ms: 10_000,
                description: "A remote service rate-limited the build",
                suggested_fix: "Back off and retry; limits clear within a few minutes",
            },
            Self::ApiTimeout => ErrorClassification {
                code: self,
                retryable: true,
                max_retries: 2,
                retry_delay_ms: 5000,
                description: "A remote API call timed out",
                suggested_fix: "Transient upstream slowness; the call will be retried",
            },
            Self::ApiError => ErrorClassification {
                code: self,
                retryable: true,
                max_retries: 2,
                retry_delay_ms: 3000,
                description: "A remote API call failed",
                suggested_fix: "Transient upstream error; the call will be retried",
            },
            Self::UploadFailed => ErrorClassification {
                code: self,
                retryable: true,
                max_retries: 3,
                retry_delay_ms: 2000,
                description: "Uploading the build artifacts failed",
                suggested_fix: "Transient transfer failure; the upload will be retried",
            },
            Self::AuthFailed => ErrorClassification {
                code: self,
                retryable: false,
                max_retries: 0,
                retry_delay_ms: 0,
                description: "Authentication with the deployment provider failed",
                suggested_fix: "Check the deployment credentials; retrying cannot help",
            },
            Self::ConfigInvalid => ErrorClassification {
                code: self,
                retryable: false,
                max_retries: 0,
                retry_delay_ms: 0,
                description: "The project configuration is invalid",
                suggested_fix: "Fix the reported configuration error; retrying cannot help",
            },
            Self::BuildUnknown => ErrorClassification {
                code: self,
                retryable: true,
                max_retries: 1,
                retry_delay_ms: 2000,
                description: "The build failed for an unrecognized reason",
                suggested_fix: "Retried once in case the failure was transient",
            },
            Self::Unknown => ErrorClassification {
                code: self,
                retryable: true,
                max_retries: 1,
                retry_delay_ms: 2000,
                description: "Unrecognized failure",
                suggested_fix: "Retried once in case the failure was transient",
            },
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable retry-policy record attached to an [`ErrorCode`].
///
/// This is reference data, not created per build; `retry_delay_ms` is the
/// base delay fed into exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorClassification {
    pub code: ErrorCode,
    pub retryable: bool,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub description: &'static str,
    pub suggested_fix: &'static str,
}

/// Classify a failure from its raw output text.
///
/// Pure and total: repeated calls with the same input return the same
/// classification, and unmatched text falls through to [`ErrorCode::Unknown`].
#[must_use]
pub fn classify(error_message: &str, logs: &[String]) -> ErrorClassification {
    let mut combined = String::with_capacity(
        error_message.len() + logs.iter().map(|l| l.len() + 1).sum::<usize>(),
    );
    combined.push_str(error_message);
    for log in logs {
        combined.push('\n');
        combined.push_str(log);
    }
    let text = combined.to_lowercase();

    rules::match_code(&text).classification()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_msg(message: &str) -> ErrorClassification {
        classify(message, &[])
    }

    #[test]
    fn network_signature_is_transient() {
        let class = classify_msg("getaddrinfo ENOTFOUND registry.npmjs.org");
        assert_eq!(class.code, ErrorCode::NetworkUnreachable);
        assert!(class.retryable);
        assert_eq!(class.max_retries, 3);
    }

    #[test]
    fn http_404_is_fatal_dependency_error() {
        let class = classify_msg("npm ERR! 404 Not Found - GET https://registry.npmjs.org/left-pad");
        assert_eq!(class.code, ErrorCode::DependencyResolution);
        assert!(!class.retryable);
    }

    #[test]
    fn heap_exhaustion_retries_once() {
        let class = classify_msg(
            "FATAL ERROR: Ineffective mark-compacts near heap limit Allocation failed - JavaScript heap out of memory",
        );
        assert_eq!(class.code, ErrorCode::MemoryExhausted);
        assert!(class.retryable);
        assert_eq!(class.max_retries, 1);
    }

    #[test]
    fn install_timeout_beats_build_timeout() {
        let class = classify_msg("npm install exceeded timeout of 120000ms");
        assert_eq!(class.code, ErrorCode::InstallTimeout);
    }

    #[test]
    fn build_timeout_when_no_install_marker() {
        let class = classify_msg("npm run build exceeded timeout of 300000ms");
        assert_eq!(class.code, ErrorCode::BuildTimeout);
        assert_eq!(class.retry_delay_ms, 0);
    }

    #[test]
    fn enoent_during_install_is_network_transient() {
        // Environment-specific heuristic: see rules::install_context_enoent
        let class = classify_msg("npm ERR! enoent ENOENT: no such file or directory");
        assert_eq!(class.code, ErrorCode::NetworkUnreachable);
        assert!(class.retryable);
    }

    #[test]
    fn eresolve_conflict_is_fatal() {
        let class = classify_msg("npm ERR! ERESOLVE unable to resolve dependency tree");
        assert_eq!(class.code, ErrorCode::DependencyResolution);
    }

    #[test]
    fn type_errors_are_fatal() {
        let class = classify_msg("Type error: Property 'foo' does not exist on type 'Bar'.");
        assert_eq!(class.code, ErrorCode::TypeCheckFailed);
        assert!(!class.retryable);
    }

    #[test]
    fn rate_limit_backs_off_longest() {
        let class = classify_msg("429 Too Many Requests");
        assert_eq!(class.code, ErrorCode::RateLimited);
        assert_eq!(class.retry_delay_ms, 10_000);
    }

    #[test]
    fn api_timeout_flavored_vs_generic() {
        assert_eq!(
            classify_msg("api request timeout while generating page").code,
            ErrorCode::ApiTimeout
        );
        assert_eq!(classify_msg("upstream api error (500)").code, ErrorCode::ApiError);
    }

    #[test]
    fn auth_signatures_are_fatal() {
        assert_eq!(classify_msg("NETLIFY_AUTH_TOKEN is not set").code, ErrorCode::AuthFailed);
        assert_eq!(classify_msg("401 Unauthorized").code, ErrorCode::AuthFailed);
        assert!(!classify_msg("401 Unauthorized").retryable);
    }

    #[test]
    fn registry_host_in_logs_matters() {
        let logs = vec!["npm ERR! network request to https://registry.npmjs.org failed".to_string()];
        let class = classify("install failed", &logs);
        assert_eq!(class.code, ErrorCode::RegistryUnavailable);
    }

    #[test]
    fn generic_build_failed_falls_back() {
        let class = classify_msg("Build failed with exit code 1");
        assert_eq!(class.code, ErrorCode::BuildUnknown);
        assert!(class.retryable);
    }

    #[test]
    fn unmatched_text_is_total() {
        let class = classify_msg("something nobody has seen before");
        assert_eq!(class.code, ErrorCode::Unknown);
        assert!(class.retryable);
        assert_eq!(class.max_retries, 1);
    }

    #[test]
    fn classification_is_deterministic() {
        let message = "ECONNRESET while downloading";
        let first = classify(message, &[]);
        for _ in 0..10 {
            assert_eq!(classify(message, &[]), first);
        }
    }

    #[test]
    fn fatal_codes_carry_no_retry_budget() {
        for code in [
            ErrorCode::DependencyResolution,
            ErrorCode::TypeCheckFailed,
            ErrorCode::AuthFailed,
            ErrorCode::ConfigInvalid,
        ] {
            let class = code.classification();
            assert!(!class.retryable);
            assert_eq!(class.max_retries, 0);
        }
    }
}
