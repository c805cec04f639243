//! Identity rotation for outgoing sessions
//!
//! A fresh user agent (and, when proxies are available, a proxy) is drawn each
//! time the HTTP client or the browser session is built. Selection is uniform
//! and stateless beyond the input lists.

mod proxy_list;

pub use proxy_list::{load_proxy_file, parse_proxy_list, ProxyPool};

use crate::ConfigError;
use rand::seq::SliceRandom;
use rand::Rng;

/// Identity used to build one client or browser session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_agent: String,
    pub proxy: Option<String>,
}

/// Picks a user agent uniformly at random
///
/// Fails with `ConfigError::Validation` when the pool is empty.
pub fn select_user_agent(pool: &[String]) -> Result<String, ConfigError> {
    select_user_agent_with(pool, &mut rand::thread_rng())
}

/// Same as [`select_user_agent`], drawing from the given generator
pub fn select_user_agent_with<R: Rng + ?Sized>(
    pool: &[String],
    rng: &mut R,
) -> Result<String, ConfigError> {
    pool.choose(rng)
        .cloned()
        .ok_or_else(|| ConfigError::Validation("user agent pool is empty".to_string()))
}

/// Picks a proxy uniformly at random, or `None` for an empty pool
pub fn select_proxy(pool: &ProxyPool) -> Option<String> {
    select_proxy_with(pool, &mut rand::thread_rng())
}

/// Same as [`select_proxy`], drawing from the given generator
pub fn select_proxy_with<R: Rng + ?Sized>(pool: &ProxyPool, rng: &mut R) -> Option<String> {
    pool.addresses().choose(rng).cloned()
}

/// Draws a complete identity for one session
pub fn select_identity(user_agents: &[String], proxies: &ProxyPool) -> Result<Identity, ConfigError> {
    let mut rng = rand::thread_rng();
    Ok(Identity {
        user_agent: select_user_agent_with(user_agents, &mut rng)?,
        proxy: select_proxy_with(proxies, &mut rng),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn agents(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_user_agent_empty_pool() {
        let result = select_user_agent(&[]);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_select_user_agent_single() {
        assert_eq!(select_user_agent(&agents(&["UA1"])).unwrap(), "UA1");
    }

    #[test]
    fn test_select_user_agent_covers_pool() {
        let pool = agents(&["UA1", "UA2", "UA3"]);
        let mut rng = StdRng::seed_from_u64(7);
        let seen: HashSet<String> = (0..200)
            .map(|_| select_user_agent_with(&pool, &mut rng).unwrap())
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_select_proxy_empty_pool_is_none() {
        assert_eq!(select_proxy(&ProxyPool::default()), None);
    }

    #[test]
    fn test_select_proxy_from_pool() {
        let pool = ProxyPool::new(vec!["http://10.0.0.1:8080".to_string()]);
        assert_eq!(select_proxy(&pool), Some("http://10.0.0.1:8080".to_string()));
    }

    #[test]
    fn test_select_identity() {
        let identity = select_identity(&agents(&["UA1"]), &ProxyPool::default()).unwrap();
        assert_eq!(
            identity,
            Identity {
                user_agent: "UA1".to_string(),
                proxy: None
            }
        );
    }
}
