use crate::ConfigError;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// In-memory proxy addresses available for rotation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyPool {
    addresses: Vec<String>,
}

impl ProxyPool {
    /// Builds a pool, dropping duplicates while keeping first-seen order
    pub fn new(addresses: Vec<String>) -> Self {
        let mut seen = HashSet::new();
        let addresses = addresses
            .into_iter()
            .filter(|address| seen.insert(address.clone()))
            .collect();
        Self { addresses }
    }

    /// Merges the configured proxy services with addresses from a proxy file
    pub fn from_sources(services: &BTreeMap<String, String>, file_entries: Vec<String>) -> Self {
        let mut addresses: Vec<String> = services.values().cloned().collect();
        addresses.extend(file_entries);
        Self::new(addresses)
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Parses a proxy list: one address per non-blank line, `#` starts a comment line
pub fn parse_proxy_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Reads a proxy list file
pub fn load_proxy_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ProxyFile {
        path: path.display().to_string(),
        source,
    })?;

    let proxies = parse_proxy_list(&content);
    tracing::info!("Loaded {} proxies from {}", proxies.len(), path.display());
    Ok(proxies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_proxy_list_skips_blank_lines() {
        let content = "http://a:1\n\n   \n  http://b:2  \n# disabled\nsocks5://c:3\n";
        assert_eq!(
            parse_proxy_list(content),
            vec!["http://a:1", "http://b:2", "socks5://c:3"]
        );
    }

    #[test]
    fn test_load_proxy_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "http://a:1").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "http://b:2").unwrap();

        let proxies = load_proxy_file(file.path()).unwrap();
        assert_eq!(proxies.len(), 2);
    }

    #[test]
    fn test_load_missing_proxy_file() {
        let result = load_proxy_file(Path::new("/nonexistent/proxies.txt"));
        assert!(matches!(result, Err(ConfigError::ProxyFile { .. })));
    }

    #[test]
    fn test_from_sources_merges_and_dedups() {
        let mut services = BTreeMap::new();
        services.insert("alpha".to_string(), "http://a:1".to_string());

        let pool = ProxyPool::from_sources(
            &services,
            vec!["http://a:1".to_string(), "http://b:2".to_string()],
        );

        assert_eq!(pool.addresses(), &["http://a:1", "http://b:2"]);
        assert_eq!(pool.len(), 2);
        assert!(!pool.is_empty());
    }
}
