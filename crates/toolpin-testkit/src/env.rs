//! Environment isolation utilities for testing

use std::sync::{Mutex, MutexGuard};

/// Static mutex to serialize tests that modify environment variables
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

fn lock_env() -> MutexGuard<'static, ()> {
    // A panicking test must not wedge every later one
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Runs `f` with the given variables set (`Some`) or removed (`None`),
/// restoring the previous values afterwards
///
/// # Examples
///
/// ```rust
/// use toolpin_testkit::with_env_vars;
///
/// let seen = with_env_vars(&[("TOOLPIN_DOC_EXAMPLE", Some("1"))], || {
///     std::env::var("TOOLPIN_DOC_EXAMPLE").ok()
/// });
/// assert_eq!(seen.as_deref(), Some("1"));
/// assert!(std::env::var("TOOLPIN_DOC_EXAMPLE").is_err());
/// ```
pub fn with_env_vars<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = lock_env();

    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(name, _)| (name.to_string(), std::env::var(name).ok()))
        .collect();

    // SAFETY: We hold ENV_LOCK, ensuring no other test is modifying env vars concurrently.
    unsafe {
        for (name, value) in vars {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
    }

    let result = f();

    // SAFETY: We still hold ENV_LOCK, ensuring exclusive access to env vars.
    unsafe {
        for (name, value) in saved {
            match value {
                Some(value) => std::env::set_var(&name, value),
                None => std::env::remove_var(&name),
            }
        }
    }

    result
}
