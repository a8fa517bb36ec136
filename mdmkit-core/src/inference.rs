//! Heuristics deciding whether the device is managed, how the app was
//! distributed and which organization it belongs to.
//!
//! None of the signals is reliable on its own. The rules below combine them
//! in a fixed precedence; the asymmetries (a side-loaded app counts as
//! enterprise-distributed only when configuration was pushed to it) are
//! intentional and must be kept as is.

use crate::defaults::{ACCOUNT_DOMAIN_KEY, ACCOUNT_EMAIL_KEY, ENROLLMENT_UPN_KEY};
use crate::error::CapabilityResult;
use crate::installer::InstallerIdentity;
use crate::platform::Capabilities;
use crate::restrictions::RestrictionSet;
use crate::settings::MdmSettings;

/// Enrollment signals read from the OS for one query.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentSignal {
    /// The device administration capability exists.
    pub admin_available: bool,
    /// Some device administrator is active (not necessarily this app).
    pub has_active_administrators: bool,
    /// This app is the device owner.
    pub is_device_owner: bool,
    /// This app is the profile owner.
    pub is_profile_owner: bool,
    /// Classified installer of this app.
    pub installer: InstallerIdentity,
    /// The managed configuration holds at least one key.
    pub has_non_empty_restrictions: bool,
}

/// Turns a failed read into an absent signal.
fn absent_on_error<T: Default>(result: CapabilityResult<T>, what: &str) -> T {
    result.unwrap_or_else(|err| {
        if !err.is_unavailable() {
            log::warn!("treating {what} as absent: {err}");
        }
        T::default()
    })
}

impl EnrollmentSignal {
    /// Reads every signal from the platform. Failures count as absent.
    pub(crate) fn gather(
        caps: &Capabilities,
        restrictions: &RestrictionSet,
        settings: &MdmSettings,
    ) -> Self {
        let admin_available = caps.admin.is_available();
        let (has_active_administrators, is_device_owner, is_profile_owner) =
            if admin_available {
                (
                    absent_on_error(
                        caps.admin.has_active_administrators(),
                        "active administrators",
                    ),
                    absent_on_error(caps.admin.is_device_owner(), "device owner"),
                    absent_on_error(caps.admin.is_profile_owner(), "profile owner"),
                )
            } else {
                (false, false, false)
            };

        let installer = match caps.package.installer_package() {
            Ok(name) => InstallerIdentity::classify(name.as_deref(), settings),
            Err(err) => {
                log::warn!("installer package unreadable: {err}");
                InstallerIdentity::Unknown
            }
        };

        Self {
            admin_available,
            has_active_administrators,
            is_device_owner,
            is_profile_owner,
            installer,
            has_non_empty_restrictions: !restrictions.is_empty(),
        }
    }

    /// This app holds device or profile ownership.
    #[must_use]
    pub const fn is_app_owner(&self) -> bool {
        self.admin_available && (self.is_device_owner || self.is_profile_owner)
    }

    /// Whether the app arrived through an enterprise distribution channel.
    #[must_use]
    pub const fn downloaded_from_managed_channel(&self) -> bool {
        match self.installer {
            InstallerIdentity::EnterpriseStore => true,
            InstallerIdentity::PlayStore => false,
            InstallerIdentity::Sideloaded => self.has_non_empty_restrictions,
            InstallerIdentity::Unknown => self.is_app_owner(),
        }
    }

    /// Whether the device (or this app's profile) is under management.
    ///
    /// Other administrators being active does not count; only this app's
    /// ownership does.
    #[must_use]
    pub const fn is_managed(&self) -> bool {
        self.has_non_empty_restrictions
            || self.is_app_owner()
            || self.downloaded_from_managed_channel()
    }
}

/// Organization domain from the configuration, first match wins:
/// `AccountDomain`, then the domain part of `AccountEmail`, then of
/// `IntuneMAMUPN`.
#[must_use]
pub fn company_domain(restrictions: &RestrictionSet) -> Option<String> {
    restrictions
        .get(ACCOUNT_DOMAIN_KEY)
        .filter(|domain| !domain.is_empty())
        .or_else(|| restrictions.get(ACCOUNT_EMAIL_KEY).and_then(domain_part))
        .or_else(|| restrictions.get(ENROLLMENT_UPN_KEY).and_then(domain_part))
        .map(ToString::to_string)
}

/// The part after the single `@` of an address, if non-empty.
fn domain_part(address: &str) -> Option<&str> {
    let (_, domain) = address.split_once('@')?;
    (!domain.is_empty() && !domain.contains('@')).then_some(domain)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::platform::memory::MemoryPlatform;

    fn signal(installer: InstallerIdentity) -> EnrollmentSignal {
        EnrollmentSignal {
            admin_available: true,
            has_active_administrators: false,
            is_device_owner: false,
            is_profile_owner: false,
            installer,
            has_non_empty_restrictions: false,
        }
    }

    #[test_case(InstallerIdentity::PlayStore)]
    #[test_case(InstallerIdentity::EnterpriseStore)]
    #[test_case(InstallerIdentity::Sideloaded)]
    #[test_case(InstallerIdentity::Unknown)]
    fn test_restrictions_always_mean_managed(installer: InstallerIdentity) {
        let s = EnrollmentSignal {
            has_non_empty_restrictions: true,
            ..signal(installer)
        };
        assert!(s.is_managed());
    }

    #[test]
    fn test_public_store_without_other_signals_is_unmanaged() {
        let s = signal(InstallerIdentity::PlayStore);
        assert!(!s.is_managed());
        assert!(!s.downloaded_from_managed_channel());
    }

    #[test]
    fn test_other_administrators_do_not_imply_managed() {
        let s = EnrollmentSignal {
            has_active_administrators: true,
            ..signal(InstallerIdentity::PlayStore)
        };
        assert!(!s.is_managed());
    }

    #[test_case(false, false ; "no restrictions, no ownership")]
    #[test_case(true, false ; "restrictions pushed")]
    #[test_case(false, true ; "device owner")]
    fn test_enterprise_installer_always_managed_channel(restrictions: bool, owner: bool) {
        let s = EnrollmentSignal {
            has_non_empty_restrictions: restrictions,
            is_device_owner: owner,
            ..signal(InstallerIdentity::EnterpriseStore)
        };
        assert!(s.downloaded_from_managed_channel());
        assert!(s.is_managed());
    }

    #[test]
    fn test_public_store_denies_even_for_device_owner() {
        let s = EnrollmentSignal {
            is_device_owner: true,
            ..signal(InstallerIdentity::PlayStore)
        };
        assert!(!s.downloaded_from_managed_channel());
        // ownership still makes the device managed
        assert!(s.is_managed());
    }

    #[test]
    fn test_sideloaded_depends_only_on_restrictions() {
        let owner = EnrollmentSignal {
            is_profile_owner: true,
            ..signal(InstallerIdentity::Sideloaded)
        };
        assert!(!owner.downloaded_from_managed_channel());

        let configured = EnrollmentSignal {
            has_non_empty_restrictions: true,
            ..signal(InstallerIdentity::Sideloaded)
        };
        assert!(configured.downloaded_from_managed_channel());
    }

    #[test]
    fn test_unknown_installer_falls_back_to_ownership() {
        assert!(!signal(InstallerIdentity::Unknown).downloaded_from_managed_channel());
        let owner = EnrollmentSignal {
            is_profile_owner: true,
            ..signal(InstallerIdentity::Unknown)
        };
        assert!(owner.downloaded_from_managed_channel());
    }

    #[test]
    fn test_ownership_requires_admin_capability() {
        let s = EnrollmentSignal {
            admin_available: false,
            is_device_owner: true,
            ..signal(InstallerIdentity::Unknown)
        };
        assert!(!s.is_app_owner());
        assert!(!s.is_managed());
    }

    #[test_case(&[("AccountDomain", "acme.com")], Some("acme.com") ; "direct domain")]
    #[test_case(&[("AccountEmail", "a@b.com")], Some("b.com") ; "email")]
    #[test_case(&[("IntuneMAMUPN", "u@c.org")], Some("c.org") ; "upn")]
    #[test_case(&[], None ; "empty")]
    #[test_case(&[("AccountDomain", ""), ("AccountEmail", "a@b.com")], Some("b.com") ; "empty domain skipped")]
    #[test_case(&[("AccountDomain", "acme.com"), ("AccountEmail", "a@b.com")], Some("acme.com") ; "domain wins")]
    #[test_case(&[("AccountEmail", "a@b.com"), ("IntuneMAMUPN", "u@c.org")], Some("b.com") ; "email before upn")]
    #[test_case(&[("AccountEmail", "no-separator"), ("IntuneMAMUPN", "u@c.org")], Some("c.org") ; "malformed email")]
    #[test_case(&[("AccountEmail", "a@")], None ; "empty suffix")]
    #[test_case(&[("AccountEmail", "a@b@c.com")], None ; "two separators")]
    fn test_company_domain(pairs: &[(&str, &str)], expected: Option<&str>) {
        let restrictions: RestrictionSet = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<std::collections::HashMap<_, _>>()
            .into();
        assert_eq!(company_domain(&restrictions).as_deref(), expected);
    }

    #[test]
    fn test_gather_degrades_failures() {
        let platform = MemoryPlatform::new();
        platform.admin.set_device_owner(true);
        platform.admin.fail_reads("dpm crashed");
        platform.package.fail_installer("package manager gone");
        let caps = Capabilities::from_provider(&platform);

        let s = EnrollmentSignal::gather(&caps, &RestrictionSet::default(), &MdmSettings::default());
        assert!(s.admin_available);
        assert!(!s.is_device_owner);
        assert_eq!(s.installer, InstallerIdentity::Unknown);
        assert!(!s.is_managed());
    }

    #[test]
    fn test_gather_skips_absent_admin() {
        let platform = MemoryPlatform::new();
        platform.admin.set_available(false);
        platform.admin.set_device_owner(true);
        let caps = Capabilities::from_provider(&platform);

        let s = EnrollmentSignal::gather(&caps, &RestrictionSet::default(), &MdmSettings::default());
        assert!(!s.admin_available);
        assert!(!s.is_device_owner);
    }
}
