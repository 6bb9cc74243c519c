//! Target list loading

use crate::error::{LeakLensError, Result};
use crate::models::Target;
use std::path::Path;
use tracing::{info, warn};

/// Parses target-list text: one host or URL per line, blank lines ignored.
/// Lines that cannot be turned into a URL are skipped with a warning.
pub fn parse_target_lines(content: &str) -> Vec<Target> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match Target::parse(line) {
            Ok(target) => Some(target),
            Err(e) => {
                warn!("Skipping target line '{line}': {e}");
                None
            }
        })
        .collect()
}

/// Loads targets from a file. An unreadable file is fatal.
pub fn load_targets_file(path: &Path) -> Result<Vec<Target>> {
    let content = std::fs::read_to_string(path).map_err(LeakLensError::IoError)?;
    let targets = parse_target_lines(&content);
    info!("Loaded {} targets from {}", targets.len(), path.display());
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_lines() {
        let targets = parse_target_lines("example.com\n\n   \nhttp://blog.example.org/\nhttps://a.test\n");
        let urls: Vec<&str> = targets.iter().map(Target::as_str).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com",
                "http://blog.example.org",
                "https://a.test"
            ]
        );
    }

    #[test]
    fn test_missing_file_is_error() {
        let path = std::env::temp_dir().join(format!("leaklens-missing-{}.txt", uuid::Uuid::new_v4()));
        assert!(matches!(
            load_targets_file(&path),
            Err(LeakLensError::IoError(_))
        ));
    }
}
