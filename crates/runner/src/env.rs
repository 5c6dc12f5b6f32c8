//! Environment sanitization for spawned subprocesses

use std::collections::HashMap;

/// Host variables copied into every child environment.
///
/// Everything else from the inherited environment is dropped; build tools get
/// a minimal, predictable world plus whatever the invocation overrides.
const ESSENTIAL_VARS: &[&str] = &[
    "PATH", "USER", "SHELL", "TERM", "LANG", "LC_ALL", "TMPDIR", "TMP", "TEMP",
];

/// Name fragments of variables known to destabilize the target build tool
/// when leaked from the host process (a bundler's turbo-mode flags being the
/// canonical offender). Caller overrides are exempt: those are deliberate.
const DESTABILIZING_TOKENS: &[&str] = &["TURBO"];

/// Build the child environment: essential host variables, minus anything
/// carrying a destabilizing token, with the caller's overrides applied last.
///
/// Callers running builds inside a workspace are expected to override `HOME`
/// and the package manager's cache/user-config paths to workspace-local
/// locations; sandboxed execution environments have no writable real home.
#[must_use]
pub fn sanitized_env(overrides: &HashMap<String, String>) -> HashMap<String, String> {
    let mut env = HashMap::new();

    for var in ESSENTIAL_VARS {
        if is_destabilizing(var) {
            continue;
        }
        if let Ok(value) = std::env::var(var) {
            env.insert((*var).to_string(), value);
        }
    }

    for (key, value) in overrides {
        env.insert(key.clone(), value.clone());
    }

    env
}

fn is_destabilizing(name: &str) -> bool {
    let upper = name.to_uppercase();
    DESTABILIZING_TOKENS.iter().any(|token| upper.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_over_host_values() {
        let mut overrides = HashMap::new();
        overrides.insert("HOME".to_string(), "/workspace".to_string());
        let env = sanitized_env(&overrides);
        assert_eq!(env.get("HOME").map(String::as_str), Some("/workspace"));
    }

    #[test]
    fn non_essential_host_variables_are_dropped() {
        // Set in this process, absent from the sanitized child environment.
        std::env::set_var("LAUNCHPAD_TEST_SECRET", "1");
        let env = sanitized_env(&HashMap::new());
        assert!(!env.contains_key("LAUNCHPAD_TEST_SECRET"));
        std::env::remove_var("LAUNCHPAD_TEST_SECRET");
    }

    #[test]
    fn turbo_flavored_names_are_destabilizing() {
        assert!(is_destabilizing("TURBO_FORCE"));
        assert!(is_destabilizing("next_turbo_mode"));
        assert!(!is_destabilizing("PATH"));
    }
}
