//! Fixed path catalogs probed on every target
//!
//! The traversal entries are kept verbatim: findings report the exact
//! signature that matched, and the request target carries the `..` segments
//! unnormalized (see [`crate::http::raw`]).

/// Locations where WordPress (or a misconfigured rewrite rule) exposes `debug.log`
pub const LOG_PATHS: &[&str] = &[
    "/wp-content/debug.log",
    "/debug.log",
    "/wp-admin/debug.log",
    "/wp-content/uploads/debug.log",
    "/wp-content/plugins/debug.log",
    "/wp-content/themes/debug.log",
    "/logs/debug.log",
    "/wp-content/logs/debug.log",
    "/../debug.log",
    "/wp-content/../debug.log",
];

/// `wp-config.php` and the backup or editor artifacts it commonly leaves behind
pub const CONFIG_PATHS: &[&str] = &[
    "/wp-config.php",
    "/wp-config.php.bak",
    "/wp-config.php.save",
    "/wp-config.php.old",
    "/wp-config.php.orig",
    "/wp-config.txt",
    "/wp-config.php.txt",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalogs_are_disjoint_and_unique() {
        let logs: HashSet<_> = LOG_PATHS.iter().collect();
        let configs: HashSet<_> = CONFIG_PATHS.iter().collect();
        assert_eq!(logs.len(), 10);
        assert_eq!(configs.len(), 7);
        assert!(logs.is_disjoint(&configs));
        assert!(LOG_PATHS.iter().chain(CONFIG_PATHS).all(|p| p.starts_with('/')));
    }
}
