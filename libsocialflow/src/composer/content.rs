//! Master content and per-platform overrides
//!
//! Every platform owns a slot that is either [`PlatformContent::Inherited`]
//! (it shows the master content and media) or
//! [`PlatformContent::Overridden`] (it shows its own copy). Slots are kept in
//! platform order so iteration and serialization are deterministic.

use std::collections::BTreeMap;

use crate::types::{MediaItem, Platform, PostOverride};

/// Content source of a single platform
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlatformContent {
    #[default]
    Inherited,
    Overridden(PostOverride),
}

impl PlatformContent {
    pub fn as_override(&self) -> Option<&PostOverride> {
        match self {
            PlatformContent::Inherited => None,
            PlatformContent::Overridden(o) => Some(o),
        }
    }
}

static INHERITED: PlatformContent = PlatformContent::Inherited;

/// Override slots for every platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideMap {
    slots: BTreeMap<Platform, PlatformContent>,
}

impl Default for OverrideMap {
    fn default() -> Self {
        Self::new()
    }
}

impl OverrideMap {
    /// All platforms inherit the master
    pub fn new() -> Self {
        Self {
            slots: Platform::ALL
                .into_iter()
                .map(|p| (p, PlatformContent::Inherited))
                .collect(),
        }
    }

    pub fn slot(&self, platform: Platform) -> &PlatformContent {
        self.slots.get(&platform).unwrap_or(&INHERITED)
    }

    pub fn get(&self, platform: Platform) -> Option<&PostOverride> {
        self.slot(platform).as_override()
    }

    pub fn has_override(&self, platform: Platform) -> bool {
        self.get(platform).is_some()
    }

    /// True when no platform diverges from the master
    pub fn is_empty(&self) -> bool {
        self.slots
            .values()
            .all(|slot| matches!(slot, PlatformContent::Inherited))
    }

    /// Number of overridden platforms
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Overridden platforms in platform order
    pub fn iter(&self) -> impl Iterator<Item = (Platform, &PostOverride)> {
        self.slots
            .iter()
            .filter_map(|(p, slot)| slot.as_override().map(|o| (*p, o)))
    }

    /// Create an override that starts equal to the master
    ///
    /// Does nothing if the platform already has one. Returns true if a new
    /// override was created.
    pub fn seed(&mut self, platform: Platform, master_content: &str, master_media: &[MediaItem]) -> bool {
        if self.has_override(platform) {
            return false;
        }
        self.slots.insert(
            platform,
            PlatformContent::Overridden(PostOverride {
                content: master_content.to_string(),
                media: master_media.to_vec(),
            }),
        );
        true
    }

    /// Mutable access to a platform's override, seeding it from the master
    /// on first use
    pub fn entry(
        &mut self,
        platform: Platform,
        master_content: &str,
        master_media: &[MediaItem],
    ) -> &mut PostOverride {
        let slot = self.slots.entry(platform).or_default();
        if let PlatformContent::Inherited = slot {
            *slot = PlatformContent::Overridden(PostOverride {
                content: master_content.to_string(),
                media: master_media.to_vec(),
            });
        }
        match slot {
            PlatformContent::Overridden(o) => o,
            PlatformContent::Inherited => unreachable!("slot was just overridden"),
        }
    }

    /// Drop every override
    pub fn clear(&mut self) {
        for slot in self.slots.values_mut() {
            *slot = PlatformContent::Inherited;
        }
    }

    /// Apply an upload progress report to every copy of a media item
    pub fn apply_progress(&mut self, media_id: &str, percent: u8) -> bool {
        let mut changed = false;
        for slot in self.slots.values_mut() {
            if let PlatformContent::Overridden(o) = slot {
                for item in o.media.iter_mut().filter(|m| m.id == media_id) {
                    changed |= item.apply_progress(percent);
                }
            }
        }
        changed
    }

    /// Snapshot of the overridden platforms among `targets`, as carried by a
    /// finalized post
    pub fn to_post_overrides(&self, targets: &[Platform]) -> BTreeMap<Platform, PostOverride> {
        self.iter()
            .filter(|(p, _)| targets.contains(p))
            .map(|(p, o)| (p, o.clone()))
            .collect()
    }
}

/// Content platform `platform` shows: its override if one exists, else the master
pub fn effective_content<'a>(
    platform: Platform,
    master_content: &'a str,
    overrides: &'a OverrideMap,
) -> &'a str {
    overrides
        .get(platform)
        .map(|o| o.content.as_str())
        .unwrap_or(master_content)
}

/// Media platform `platform` shows: its override if one exists, else the master
pub fn effective_media<'a>(
    platform: Platform,
    master_media: &'a [MediaItem],
    overrides: &'a OverrideMap,
) -> &'a [MediaItem] {
    overrides
        .get(platform)
        .map(|o| o.media.as_slice())
        .unwrap_or(master_media)
}
