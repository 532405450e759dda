//! Privilege detection.

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn is_privileged_impl(&self) -> bool {
        #[cfg(unix)]
        return nix::unistd::geteuid().is_root();

        #[cfg(windows)]
        return is_elevated::is_elevated();
    }
}
