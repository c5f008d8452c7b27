//! Content validation
//!
//! Checks the draft against each target platform's requirements and reports
//! errors and warnings per platform. The report is advisory: finalizing a
//! post is only blocked when no platform is selected.
//!
//! # Example
//!
//! ```
//! use libsocialflow::types::Platform;
//! use libsocialflow::validation::validate_for_platform;
//!
//! let result = validate_for_platform(Platform::Twitter, &"a".repeat(300), &[]);
//! assert!(!result.valid);
//! assert!(result.errors[0].contains("280"));
//! ```

use serde::Serialize;

use crate::composer::ComposerState;
use crate::types::{MediaItem, Platform};

/// Share of the character limit above which a warning is raised
const NEAR_LIMIT_RATIO: f64 = 0.9;

/// Validation result for every target platform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Whether every platform passed without errors
    pub valid: bool,
    pub results: Vec<PlatformValidation>,
}

impl ValidationReport {
    pub fn for_platform(&self, platform: Platform) -> Option<&PlatformValidation> {
        self.results.iter().find(|r| r.platform == platform)
    }

    pub fn has_warnings(&self) -> bool {
        self.results.iter().any(|r| !r.warnings.is_empty())
    }
}

/// Validation result for a single platform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformValidation {
    pub platform: Platform,
    pub valid: bool,
    pub errors: Vec<String>,
    /// Non-blocking findings
    pub warnings: Vec<String>,
}

/// Validate the draft for every target platform
///
/// Uses the same content resolution as the preview: overrides count only
/// while tuning is on.
pub fn validate(state: &ComposerState) -> ValidationReport {
    let results: Vec<PlatformValidation> = state
        .targets()
        .iter()
        .map(|&platform| {
            validate_for_platform(
                platform,
                state.resolved_content(platform),
                state.resolved_media(platform),
            )
        })
        .collect();

    ValidationReport {
        valid: results.iter().all(|r| r.valid),
        results,
    }
}

/// Validate content and media for one platform
pub fn validate_for_platform(platform: Platform, content: &str, media: &[MediaItem]) -> PlatformValidation {
    let spec = platform.spec();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if content.trim().is_empty() {
        errors.push("Content cannot be empty or whitespace-only".to_string());
    }

    let char_count = content.chars().count();
    if char_count > spec.max_chars {
        errors.push(format!(
            "Content length ({} characters) exceeds {} limit of {} characters",
            char_count, platform, spec.max_chars
        ));
    } else if char_count as f64 > spec.max_chars as f64 * NEAR_LIMIT_RATIO {
        warnings.push(format!(
            "Content length ({} characters) is close to the {} limit of {} characters",
            char_count, platform, spec.max_chars
        ));
    }

    for item in media.iter().filter(|m| !spec.accepts(m.kind)) {
        warnings.push(format!("{} does not support {} media ({})", platform, item.kind, item.id));
    }

    if spec.requires_media() && media.is_empty() {
        warnings.push(format!("{} posts need at least one image or video", platform));
    }

    PlatformValidation {
        platform,
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}
