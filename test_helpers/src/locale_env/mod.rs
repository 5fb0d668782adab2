//! Guards for the locale environment variables read by gettext.
//!
//! Locale negotiation consults `LANGUAGE`, `LANG` and several `LC_*`
//! categories, all of which are process-wide. Every mutation here takes a global
//! re-entrant mutex and hands back an RAII guard restoring the previous value
//! on drop. A [`LocaleScope`] keeps the mutex for its whole lifetime, so tests
//! that depend on the system locale see a stable environment.
//!
//! Tests in the same binary that read the locale must still be serialised
//! (for example with `#[serial(locale_env)]`), since readers do not take the
//! mutex.
//!
//! # Examples
//!
//! ```
//! use test_helpers::locale_env;
//!
//! let scope = locale_env::scoped(Some("fr_FR.UTF-8"));
//! let _language = scope.set_var("LANGUAGE", "fr:it");
//! assert_eq!(std::env::var("LANG").ok().as_deref(), Some("fr_FR.UTF-8"));
//! assert!(std::env::var_os("LC_ALL").is_none());
//! ```

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::LazyLock;

/// Variables cleared by [`scoped`].
pub const LOCALE_VARIABLES: [&str; 5] = ["LANGUAGE", "LC_ALL", "LC_CTYPE", "LC_MESSAGES", "LANG"];

static ENV_MUTEX: LazyLock<ReentrantMutex<()>> = LazyLock::new(ReentrantMutex::default);

/// Wrapper around `std::env::set_var`.
///
/// # Safety
///
/// Callers must hold `ENV_MUTEX`.
unsafe fn env_set_var(key: &str, value: &OsStr) {
    unsafe { env::set_var(key, value) };
}

/// Wrapper around `std::env::remove_var`.
///
/// # Safety
///
/// Callers must hold `ENV_MUTEX`.
unsafe fn env_remove_var(key: &str) {
    unsafe { env::remove_var(key) };
}

fn mutate_locked<F>(
    key: String,
    mutator: F,
    _guard: &ReentrantMutexGuard<'static, ()>,
) -> EnvVarGuard
where
    F: FnOnce(&str),
{
    let original = env::var_os(&key);
    mutator(&key);
    EnvVarGuard { key, original }
}

/// RAII guard restoring an environment variable to its prior value on drop.
#[must_use = "dropping restores the prior value"]
pub struct EnvVarGuard {
    key: String,
    original: Option<OsString>,
}

impl fmt::Debug for EnvVarGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVarGuard")
            .field("key", &self.key)
            .field("had_original", &self.original.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        let _guard = ENV_MUTEX.lock();
        if let Some(value) = self.original.take() {
            // SAFETY: We hold `ENV_MUTEX` during restoration.
            unsafe { env_set_var(&self.key, &value) };
        } else {
            // SAFETY: We hold `ENV_MUTEX` during restoration.
            unsafe { env_remove_var(&self.key) };
        }
    }
}

/// Sets an environment variable and returns a guard restoring its prior value.
pub fn set_var<K, V>(key: K, value: V) -> EnvVarGuard
where
    K: Into<String>,
    V: AsRef<OsStr>,
{
    let guard = ENV_MUTEX.lock();
    // SAFETY: `guard` holds `ENV_MUTEX`.
    mutate_locked(key.into(), |k| unsafe { env_set_var(k, value.as_ref()) }, &guard)
}

/// Removes an environment variable and returns a guard restoring its prior value.
pub fn remove_var<K>(key: K) -> EnvVarGuard
where
    K: Into<String>,
{
    let guard = ENV_MUTEX.lock();
    // SAFETY: `guard` holds `ENV_MUTEX`.
    mutate_locked(key.into(), |k| unsafe { env_remove_var(k) }, &guard)
}

/// Holds the environment lock and a set of guards for the locale variables.
///
/// Guards are restored in reverse order before the lock is released.
#[must_use = "dropping releases the environment lock and restores the locale"]
pub struct LocaleScope {
    guards: Vec<EnvVarGuard>,
    lock: ReentrantMutexGuard<'static, ()>,
}

impl LocaleScope {
    /// Sets a further variable while the scope's lock is held.
    ///
    /// The returned guard must be dropped before the scope; declaring it
    /// after the scope binding does that.
    pub fn set_var<K, V>(&self, key: K, value: V) -> EnvVarGuard
    where
        K: Into<String>,
        V: AsRef<OsStr>,
    {
        // SAFETY: `self.lock` holds `ENV_MUTEX`.
        mutate_locked(key.into(), |k| unsafe { env_set_var(k, value.as_ref()) }, &self.lock)
    }

    /// Removes a further variable while the scope's lock is held.
    pub fn remove_var<K>(&self, key: K) -> EnvVarGuard
    where
        K: Into<String>,
    {
        // SAFETY: `self.lock` holds `ENV_MUTEX`.
        mutate_locked(key.into(), |k| unsafe { env_remove_var(k) }, &self.lock)
    }
}

impl fmt::Debug for LocaleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleScope")
            .field("guards", &self.guards)
            .finish_non_exhaustive()
    }
}

impl Drop for LocaleScope {
    fn drop(&mut self) {
        // Restore in reverse while the lock is still held.
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}

/// Clears every locale variable and optionally sets `LANG`.
///
/// With `None` the process has no locale configured at all, which is how
/// tests reach the fallback locale.
pub fn scoped(lang: Option<&str>) -> LocaleScope {
    let lock = ENV_MUTEX.lock();
    let mut guards: Vec<EnvVarGuard> = LOCALE_VARIABLES
        .iter()
        // SAFETY: `lock` holds `ENV_MUTEX`.
        .map(|key| mutate_locked((*key).to_owned(), |k| unsafe { env_remove_var(k) }, &lock))
        .collect();
    if let Some(value) = lang {
        // SAFETY: `lock` holds `ENV_MUTEX`.
        guards.push(mutate_locked(
            "LANG".to_owned(),
            |k| unsafe { env_set_var(k, OsStr::new(value)) },
            &lock,
        ));
    }
    LocaleScope { guards, lock }
}
