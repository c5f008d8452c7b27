//! Target platforms and the preview platform

use tracing::debug;

use crate::types::{Platform, SocialAccount};

/// Which platforms a draft targets and which one is being previewed
///
/// Targets keep selection order and never contain duplicates. The preview
/// platform is independent of the targets: any platform may be previewed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformSelection {
    targets: Vec<Platform>,
    preview: Option<Platform>,
}

impl PlatformSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> &[Platform] {
        &self.targets
    }

    pub fn preview(&self) -> Option<Platform> {
        self.preview
    }

    pub fn is_selected(&self, platform: Platform) -> bool {
        self.targets.contains(&platform)
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Add or remove a platform from the targets
    ///
    /// When no preview platform is set, the toggled platform becomes the
    /// preview regardless of direction. Deselecting the preview platform
    /// does not clear the preview. Returns true if the platform is now
    /// selected.
    pub fn toggle(&mut self, platform: Platform) -> bool {
        let selected = if let Some(pos) = self.targets.iter().position(|p| *p == platform) {
            self.targets.remove(pos);
            false
        } else {
            self.targets.push(platform);
            true
        };

        if self.preview.is_none() {
            self.preview = Some(platform);
        }

        debug!(%platform, selected, preview = ?self.preview, "Toggled platform");
        selected
    }

    /// Target every platform with a connected account
    ///
    /// Platforms keep the account registry order. The first one becomes the
    /// preview; with no connected accounts the preview is left as it was.
    pub fn select_all_connected(&mut self, accounts: &[SocialAccount]) {
        let mut targets = Vec::new();
        for account in accounts.iter().filter(|a| a.is_connected) {
            if !targets.contains(&account.platform) {
                targets.push(account.platform);
            }
        }

        if let Some(first) = targets.first() {
            self.preview = Some(*first);
        }
        self.targets = targets;

        debug!(targets = ?self.targets, preview = ?self.preview, "Selected all connected platforms");
    }

    /// Preview any platform, selected or not
    pub fn set_preview(&mut self, platform: Platform) {
        self.preview = Some(platform);
    }

    /// Forget targets and preview
    pub fn clear(&mut self) {
        self.targets.clear();
        self.preview = None;
    }
}
