//! Positional parameter binding.
//!
//! Shell-style positional parameters are ordinary environment variables
//! stored under bare names: `1`..`N` for the parameters themselves, `#`
//! for the count, and `*` / `@` for the space-joined form. [`Env::expand`]
//! resolves `$1`, `$#`, `$*` and friends against those names.

use crate::env::Env;

/// Bind positional parameters into an environment.
///
/// Always replaces any previous binding: stale `$1..$N` variables from an
/// earlier, longer parameter list are removed first, then `$#`, `$1..`,
/// `$*` and `$@` are set from scratch.
pub fn set_params_in_env<S: AsRef<str>>(env: &Env, params: &[S]) {
    // step one: remove the previous positional parameters
    let old_count = param_count_from_env(env);
    for i in 1..=old_count {
        env.unset(&i.to_string());
    }

    // step two: the new count, then the parameters themselves
    env.set("#", params.len().to_string());
    for (i, param) in params.iter().enumerate() {
        env.set((i + 1).to_string(), param.as_ref());
    }

    // step three: the space-joined forms
    let joined = params
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    env.set("*", joined.clone());
    env.set("@", joined);
}

/// Read the current positional parameters back out of an environment.
///
/// Used by combinators to forward `$1..$N` into a nested sequence.
pub fn params_from_env(env: &Env) -> Vec<String> {
    let count = param_count_from_env(env);
    (1..=count).map(|i| env.get(&i.to_string())).collect()
}

/// The bound parameter count (`$#`), or 0 if none has been set.
fn param_count_from_env(env: &Env) -> usize {
    env.get("#").parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_count_params_and_joined_forms() {
        let env = Env::detached();
        set_params_in_env(&env, &["a", "b", "c"]);
        assert_eq!(env.get("#"), "3");
        assert_eq!(env.get("1"), "a");
        assert_eq!(env.get("2"), "b");
        assert_eq!(env.get("3"), "c");
        assert_eq!(env.get("*"), "a b c");
        assert_eq!(env.get("@"), "a b c");
    }

    #[test]
    fn rebinding_leaves_no_residue() {
        let env = Env::detached();
        set_params_in_env(&env, &["a", "b", "c"]);
        set_params_in_env(&env, &["x", "y"]);
        assert_eq!(env.get("#"), "2");
        assert_eq!(env.get("1"), "x");
        assert_eq!(env.get("2"), "y");
        assert_eq!(env.get("3"), "");
        assert_eq!(env.get("*"), "x y");
    }

    #[test]
    fn binding_nothing_clears_everything() {
        let env = Env::detached();
        set_params_in_env(&env, &["only"]);
        set_params_in_env::<&str>(&env, &[]);
        assert_eq!(env.get("#"), "0");
        assert_eq!(env.get("1"), "");
        assert_eq!(env.get("*"), "");
    }

    #[test]
    fn round_trips_through_params_from_env() {
        let env = Env::detached();
        set_params_in_env(&env, &["one", "two"]);
        assert_eq!(params_from_env(&env), vec!["one", "two"]);
    }

    #[test]
    fn params_from_unbound_env_is_empty() {
        let env = Env::detached();
        assert!(params_from_env(&env).is_empty());
    }
}
