//! Connected social accounts
//!
//! The registry is the composer's view of which platforms can be posted to.
//! Connecting a platform runs a simulated OAuth handshake: a fixed delay,
//! after which the account is marked connected and an
//! [`Event::AccountConnected`] is emitted.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::events::{Event, EventBus};
use crate::types::{Platform, SocialAccount};
use crate::{Result, SocialFlowError};

/// Shared registry of social accounts
///
/// Cheap to clone; clones share the same accounts.
#[derive(Clone)]
pub struct AccountRegistry {
    accounts: Arc<RwLock<Vec<SocialAccount>>>,
    connecting: Arc<RwLock<HashSet<Platform>>>,
    oauth_delay: Duration,
    events: EventBus,
}

/// Removes a platform from the in-flight set when the connect ends,
/// including when the connect future is dropped midway
struct ConnectGuard {
    connecting: Arc<RwLock<HashSet<Platform>>>,
    platform: Platform,
}

impl Drop for ConnectGuard {
    fn drop(&mut self) {
        self.connecting
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.platform);
    }
}

impl AccountRegistry {
    pub fn new(accounts: Vec<SocialAccount>, oauth_delay: Duration, events: EventBus) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(accounts)),
            connecting: Arc::new(RwLock::new(HashSet::new())),
            oauth_delay,
            events,
        }
    }

    pub fn from_config(config: &Config, events: EventBus) -> Result<Self> {
        Ok(Self::new(
            config.accounts.clone(),
            config.simulation.oauth_delay()?,
            events,
        ))
    }

    /// Snapshot of every account
    pub fn accounts(&self) -> Vec<SocialAccount> {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, platform: Platform) -> Option<SocialAccount> {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|a| a.platform == platform)
            .cloned()
    }

    pub fn is_connected(&self, platform: Platform) -> bool {
        self.get(platform).is_some_and(|a| a.is_connected)
    }

    /// Connected platforms in catalogue order
    pub fn connected_platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self
            .accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|a| a.is_connected)
            .map(|a| a.platform)
            .collect();
        platforms.sort();
        platforms.dedup();
        platforms
    }

    pub fn is_connecting(&self, platform: Platform) -> bool {
        self.connecting
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&platform)
    }

    /// Connect a platform through the simulated OAuth flow
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the platform has no account in the registry or a
    /// connect for it is already running.
    #[instrument(skip(self), fields(delay = ?self.oauth_delay))]
    pub async fn connect(&self, platform: Platform) -> Result<SocialAccount> {
        if self.get(platform).is_none() {
            return Err(SocialFlowError::InvalidInput(format!(
                "No {} account is configured",
                platform
            )));
        }

        let _guard = {
            let mut connecting = self
                .connecting
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if !connecting.insert(platform) {
                return Err(SocialFlowError::InvalidInput(format!(
                    "{} is already connecting",
                    platform
                )));
            }
            ConnectGuard {
                connecting: Arc::clone(&self.connecting),
                platform,
            }
        };

        debug!("Starting OAuth handshake");
        tokio::time::sleep(self.oauth_delay).await;

        let account = {
            let mut accounts = self
                .accounts
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let account = accounts
                .iter_mut()
                .find(|a| a.platform == platform)
                .ok_or_else(|| {
                    SocialFlowError::InvalidInput(format!("No {} account is configured", platform))
                })?;
            account.is_connected = true;
            account.username = format!("@connected_{}", platform.as_str().to_lowercase());
            account.last_sync = Some(Utc::now());
            account.clone()
        };

        info!(username = %account.username, "Account connected");
        self.events.emit(Event::AccountConnected {
            platform,
            username: account.username.clone(),
        });

        Ok(account)
    }

    /// Connect several platforms concurrently
    ///
    /// Every handshake runs to completion; the first error is returned after
    /// all of them finish. Duplicate platforms are connected once.
    pub async fn connect_all(&self, platforms: &[Platform]) -> Result<Vec<SocialAccount>> {
        let mut unique = platforms.to_vec();
        unique.sort();
        unique.dedup();

        let results = join_all(unique.into_iter().map(|p| self.connect(p))).await;
        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_accounts;

    fn registry(events: EventBus) -> AccountRegistry {
        AccountRegistry::new(default_accounts(), Duration::from_millis(2000), events)
    }

    #[test]
    fn test_connected_platforms_from_defaults() {
        let registry = registry(EventBus::default());
        assert_eq!(
            registry.connected_platforms(),
            vec![Platform::LinkedIn, Platform::Facebook, Platform::Instagram]
        );
        assert!(!registry.is_connected(Platform::Twitter));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_waits_then_marks_connected() {
        let events = EventBus::default();
        let mut rx = events.subscribe();
        let registry = registry(events);

        let started = tokio::time::Instant::now();
        let account = registry.connect(Platform::Twitter).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(2000));
        assert!(account.is_connected);
        assert_eq!(account.username, "@connected_twitter");
        assert!(account.last_sync.is_some());
        assert!(registry.is_connected(Platform::Twitter));

        assert_eq!(
            rx.recv().await.unwrap(),
            Event::AccountConnected {
                platform: Platform::Twitter,
                username: "@connected_twitter".to_string(),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_unknown_platform_is_invalid() {
        let registry = registry(EventBus::default());
        let err = registry.connect(Platform::TikTok).await.unwrap_err();
        assert!(matches!(err, SocialFlowError::InvalidInput(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_connect_in_flight_per_platform() {
        let registry = registry(EventBus::default());

        let first = tokio::spawn({
            let registry = registry.clone();
            async move { registry.connect(Platform::Twitter).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(registry.is_connecting(Platform::Twitter));

        let second = registry.connect(Platform::Twitter).await;
        assert!(matches!(second, Err(SocialFlowError::InvalidInput(_))));

        assert!(first.await.unwrap().is_ok());
        assert!(!registry.is_connecting(Platform::Twitter));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_connect_releases_platform() {
        let registry = registry(EventBus::default());

        let pending = tokio::time::timeout(
            Duration::from_millis(100),
            registry.connect(Platform::Twitter),
        )
        .await;
        assert!(pending.is_err());
        assert!(!registry.is_connecting(Platform::Twitter));
        assert!(!registry.is_connected(Platform::Twitter));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_all_runs_handshakes_together() {
        let mut accounts = default_accounts();
        for account in &mut accounts {
            account.is_connected = false;
        }
        let registry = AccountRegistry::new(accounts, Duration::from_millis(2000), EventBus::default());

        let started = tokio::time::Instant::now();
        let connected = registry
            .connect_all(&[Platform::Twitter, Platform::LinkedIn, Platform::Twitter])
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_millis(4000));
        assert_eq!(
            connected.iter().map(|a| a.platform).collect::<Vec<_>>(),
            vec![Platform::LinkedIn, Platform::Twitter]
        );
        assert!(registry.is_connected(Platform::LinkedIn));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_all_reports_unknown_platform() {
        let registry = registry(EventBus::default());
        let result = registry.connect_all(&[Platform::Twitter, Platform::Pinterest]).await;

        assert!(matches!(result, Err(SocialFlowError::InvalidInput(_))));
        assert!(registry.is_connected(Platform::Twitter));
    }
}
