//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Critical:  red bold (critical risk and findings)
//!   - High/Warn: yellow   (high risk, warnings)
//!   - Medium:    magenta
//!   - Low/Info:  green / blue
//!   - Reference: cyan     (asset IDs, the root marker)
//!   - Muted:     dimmed   (field labels, connectors)
//!   - Emphasis:  bold     (section headers)

use crate::domain::{RiskLevel, Severity};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Colorize an asset ID (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Colorize a risk level label.
pub(crate) fn colorize_risk(level: RiskLevel, config: &OutputConfig) -> String {
    let text = level.to_string().to_uppercase();
    if !config.use_colors {
        return text;
    }
    match level {
        RiskLevel::Critical => text.red().bold().to_string(),
        RiskLevel::High => text.yellow().bold().to_string(),
        RiskLevel::Medium => text.magenta().to_string(),
        RiskLevel::Low => text.green().to_string(),
    }
}

/// Colorize a severity label.
pub(crate) fn colorize_severity(severity: Severity, config: &OutputConfig) -> String {
    let text = severity.to_string();
    if !config.use_colors {
        return text;
    }
    match severity {
        Severity::Critical => text.red().bold().to_string(),
        Severity::Warning => text.yellow().to_string(),
        Severity::Info => text.blue().to_string(),
    }
}

/// Severity icon, with ASCII fallback support.
pub(crate) fn severity_icon(severity: Severity, config: &OutputConfig) -> String {
    let icon = if config.use_ascii {
        match severity {
            Severity::Critical => "x",
            Severity::Warning => "!",
            Severity::Info => "i",
        }
    } else {
        match severity {
            Severity::Critical => "✗",
            Severity::Warning => "⚠",
            Severity::Info => "ℹ",
        }
    };

    if !config.use_colors {
        return icon.to_string();
    }
    match severity {
        Severity::Critical => icon.red().to_string(),
        Severity::Warning => icon.yellow().to_string(),
        Severity::Info => icon.blue().to_string(),
    }
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::control::set_override;
    use std::sync::{Mutex, MutexGuard};

    static GLOBAL_STATE_MUTEX: Mutex<()> = Mutex::new(());

    struct ColorGuard<'a> {
        _guard: MutexGuard<'a, ()>,
    }

    impl ColorGuard<'_> {
        fn new() -> Self {
            let guard = GLOBAL_STATE_MUTEX
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            set_override(true);
            Self { _guard: guard }
        }
    }

    impl Drop for ColorGuard<'_> {
        fn drop(&mut self) {
            set_override(false);
        }
    }

    #[test]
    fn test_colorize_risk_contains_ansi_codes() {
        let _guard = ColorGuard::new();
        let config = OutputConfig::new(80, false, true);

        for level in [
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Critical,
        ] {
            let text = colorize_risk(level, &config);
            assert!(text.contains(&level.to_string().to_uppercase()));
            assert!(text.contains("\x1b["), "{level} should have ANSI codes");
        }
    }

    #[test]
    fn test_plain_when_colors_disabled() {
        let config = OutputConfig::new(80, false, false);

        assert_eq!(colorize_risk(RiskLevel::High, &config), "HIGH");
        assert_eq!(colorize_severity(Severity::Warning, &config), "warning");
        assert_eq!(colorize_id("p.d.t", &config), "p.d.t");
        assert_eq!(bold("Header", &config), "Header");
    }

    #[test]
    fn test_severity_icon_ascii_fallback() {
        let ascii = OutputConfig::new(80, true, false);
        let unicode = OutputConfig::new(80, false, false);

        assert_eq!(severity_icon(Severity::Critical, &ascii), "x");
        assert_eq!(severity_icon(Severity::Warning, &ascii), "!");
        assert_eq!(severity_icon(Severity::Critical, &unicode), "✗");
        assert!(!severity_icon(Severity::Info, &unicode).is_ascii());
    }
}
