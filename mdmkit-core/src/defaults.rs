//! Constants shared with the host and default heuristic tables.

/// Name under which the module is registered with the host bridge.
pub const MODULE_NAME: &str = "MobileDeviceManager";

/// Event channel for managed configuration changes.
pub const APP_CONFIG_CHANGED: &str = "react-native-mdm/managedAppConfigDidChange";

/// Event channel for lock-task status changes.
pub const APP_LOCK_STATUS_CHANGED: &str = "react-native-mdm/appLockStatusDidChange";

/// Installer packages that only distribute apps on behalf of an enterprise.
pub const ENTERPRISE_INSTALLERS: &[&str] = &[
    "com.microsoft.windowsintune.companyportal",
    "com.google.android.apps.work.clouddpc",
    "com.android.managedprovisioning",
    "com.google.android.apps.work.oobconfig",
    "com.airwatch.androidagent",
    "com.mobileiron",
    "com.blackberry.uem.client",
];

/// The public store and the generic OS installers.
pub const PUBLIC_INSTALLERS: &[&str] = &[
    "com.android.vending",
    "com.google.android.packageinstaller",
    "com.android.packageinstaller",
];

/// Case-insensitive fragments marking a configuration key as MDM related.
pub const DIAGNOSTIC_SEARCH_TERMS: &[&str] = &["managed", "intune", "mdm", "policy", "account"];

/// Configuration keys commonly pushed by MDM vendors.
pub const WELL_KNOWN_KEYS: &[&str] = &[
    "com.google.android.work.configuration.managed",
    "AccountName",
    "AccountDomain",
    "AccountEmail",
    "IntuneComplianceStatus",
    "IntuneEnrollmentStatus",
    "IntuneMAMUPN",
    "ManagedConfiguration",
];

/// Key carrying the organization domain directly.
pub const ACCOUNT_DOMAIN_KEY: &str = "AccountDomain";

/// Key carrying the enrolled user's e-mail address.
pub const ACCOUNT_EMAIL_KEY: &str = "AccountEmail";

/// Key carrying the Intune MAM user principal name.
pub const ENROLLMENT_UPN_KEY: &str = "IntuneMAMUPN";

/// Package metadata entry an app may ship with its company domain.
pub const COMPANY_DOMAIN_METADATA_KEY: &str = "CompanyDomain";

/// Installer package name substrings that hint at enterprise distribution.
pub const ENTERPRISE_INSTALLER_HINTS: &[&str] = &["work", "enterprise", "intune"];

/// Package name of the public app store.
pub const PLAY_STORE_PACKAGE: &str = "com.android.vending";
