//! LeakLens - WordPress debug log and wp-config exposure scanner
//!
//! Probes many targets concurrently for exposed `debug.log` files and
//! `wp-config.php` backups, classifying responses with light content
//! heuristics to keep soft-404 noise out of the results.

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod report;
pub mod scanner;
pub mod targets;
