//! Reconcile action - converges one package to its desired state.
//!
//! This action coordinates:
//! - Querying the installed state through a [`PackageManager`]
//! - Deciding the single mutating command needed, if any
//! - Issuing it (unless in check mode) and reporting the [`Outcome`]

use anyhow::Result;
use log::{debug, info};

use crate::outcome::Outcome;
use crate::package::{DesiredState, PackageSpec, VersionMatcher};
use crate::winget::{InstalledPackage, PackageManager};

/// The one mutating command a reconciliation may issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Install,
    Uninstall,
    Upgrade,
}

impl Action {
    fn past_tense(&self) -> &'static str {
        match self {
            Action::Install => "installed",
            Action::Uninstall => "uninstalled",
            Action::Upgrade => "updated",
        }
    }
}

/// What to do about a package, decided from its desired and installed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Already converged; the message says why.
    Nothing(String),
    Apply(Action),
}

/// Decide the action for `spec` given what is installed.
///
/// Pure: no package manager calls happen here.
pub fn plan(spec: &PackageSpec, installed: Option<&InstalledPackage>) -> Plan {
    let id = &spec.app_id;
    let pinned = |pkg: &InstalledPackage| {
        spec.version
            .as_deref()
            .is_none_or(|v| VersionMatcher::versions_match(&pkg.version, v))
    };

    match (spec.state, installed) {
        (DesiredState::Present, Some(pkg)) if pinned(pkg) => Plan::Nothing(format!(
            "Package {} is already present (version {})",
            id, pkg.version
        )),
        (DesiredState::Present, _) => Plan::Apply(Action::Install),

        (DesiredState::Absent, None) => {
            Plan::Nothing(format!("Package {} is already absent", id))
        }
        (DesiredState::Absent, Some(pkg)) if !pinned(pkg) => Plan::Nothing(format!(
            "Package {} is already absent at version {} (installed: {})",
            id,
            spec.version.as_deref().unwrap_or_default(),
            pkg.version
        )),
        (DesiredState::Absent, Some(_)) => Plan::Apply(Action::Uninstall),

        // An updated package is a present one.
        (DesiredState::Updated, None) => Plan::Apply(Action::Install),
        (DesiredState::Updated, Some(pkg)) => match &spec.version {
            Some(_) if pinned(pkg) => Plan::Nothing(format!(
                "Package {} is already up to date (version {})",
                id, pkg.version
            )),
            Some(_) => Plan::Apply(Action::Upgrade),
            None => match &pkg.available {
                Some(available) if VersionMatcher::is_newer(available, &pkg.version) => {
                    Plan::Apply(Action::Upgrade)
                }
                _ => Plan::Nothing(format!(
                    "Package {} is already up to date (version {})",
                    id, pkg.version
                )),
            },
        },
    }
}

/// Reconcile action - queries, plans and applies for a single package.
pub struct Reconciler<'a, P: PackageManager> {
    manager: &'a P,
    check_mode: bool,
}

impl<'a, P: PackageManager> Reconciler<'a, P> {
    pub fn new(manager: &'a P) -> Self {
        Self {
            manager,
            check_mode: false,
        }
    }

    /// Report what would change without issuing mutating commands.
    pub fn check_mode(mut self, enabled: bool) -> Self {
        self.check_mode = enabled;
        self
    }

    /// Converge the package described by `spec`.
    pub fn reconcile(&self, spec: &PackageSpec) -> Result<Outcome> {
        let installed = self.manager.query(spec)?;
        let plan = plan(spec, installed.as_ref());
        debug!("Plan for {}: {:?}", spec, plan);

        let action = match plan {
            Plan::Nothing(msg) => {
                info!("{}", msg);
                return Ok(Outcome::unchanged(msg));
            }
            Plan::Apply(action) => action,
        };

        if self.check_mode {
            return Ok(Outcome::changed(format!(
                "Package would be {}",
                action.past_tense()
            )));
        }

        self.apply(action, spec)
    }

    fn apply(&self, action: Action, spec: &PackageSpec) -> Result<Outcome> {
        let performed = match action {
            Action::Install => self.manager.install(spec)?,
            Action::Uninstall => {
                self.manager.uninstall(spec)?;
                true
            }
            Action::Upgrade => self.manager.upgrade(spec)?,
        };

        if performed {
            Ok(Outcome::changed(format!(
                "Package {} successfully",
                action.past_tense()
            )))
        } else if action == Action::Upgrade {
            Ok(Outcome::unchanged(format!(
                "Package {} is already up to date",
                spec.app_id
            )))
        } else {
            Ok(Outcome::unchanged(format!(
                "Package {} is already present",
                spec.app_id
            )))
        }
    }
}
