//! Scoped umask override.

/// Forces a umask for the lifetime of the guard and restores the previous
/// mask on drop.
///
/// The umask is process-wide state, so a run holds exactly one guard for its
/// whole duration.
#[derive(Debug)]
pub struct UmaskGuard {
    #[cfg(unix)]
    previous: rustix::fs::Mode,
}

impl UmaskGuard {
    /// Installs `mask` as the process umask.
    #[must_use]
    pub fn apply(mask: u32) -> Self {
        #[cfg(unix)]
        {
            let mode = rustix::fs::Mode::from_bits_truncate(mask);
            Self {
                previous: rustix::process::umask(mode),
            }
        }

        #[cfg(not(unix))]
        {
            let _ = mask;
            Self {}
        }
    }
}

impl Drop for UmaskGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            rustix::process::umask(self.previous);
        }
    }
}
