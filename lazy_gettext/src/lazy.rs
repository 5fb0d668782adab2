//! Process-scoped switch selecting lazy or eager translation.
//!
//! Embedding applications call [`enable_lazy`] once during start-up, before
//! any translator produced by [`crate::TranslatorFactory`] runs. Translators
//! read the switch on every call rather than latching it when they are built,
//! but flipping it while translators are in use is unsupported: messages
//! already handed out keep whichever shape they were created with.

use std::sync::atomic::{AtomicBool, Ordering};

static USE_LAZY: AtomicBool = AtomicBool::new(false);

/// Turns lazy translation on or off for the whole process.
///
/// # Examples
/// ```rust
/// use lazy_gettext::lazy;
///
/// lazy::enable_lazy(true);
/// assert!(lazy::is_lazy_enabled());
/// lazy::enable_lazy(false);
/// ```
pub fn enable_lazy(enable: bool) {
    USE_LAZY.store(enable, Ordering::Release);
    tracing::debug!(enable, "lazy translation toggled");
}

/// Reports whether translators should currently return lazy messages.
#[must_use]
pub fn is_lazy_enabled() -> bool {
    USE_LAZY.load(Ordering::Acquire)
}

/// How a translator decides between lazy and eager translation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LazyMode {
    /// Defer to the process-wide switch at call time.
    #[default]
    Process,
    /// Always return lazy messages.
    Enabled,
    /// Always translate eagerly.
    Disabled,
}

impl LazyMode {
    /// Resolves the mode to a decision for the current call.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        match self {
            Self::Process => is_lazy_enabled(),
            Self::Enabled => true,
            Self::Disabled => false,
        }
    }
}

impl From<bool> for LazyMode {
    fn from(enable: bool) -> Self {
        if enable { Self::Enabled } else { Self::Disabled }
    }
}
