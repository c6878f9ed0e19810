//! Severity mapping between the two loggers.
//!
//! Both directions are total and monotonic: a more severe input never maps
//! to a less severe output. Round trips preserve order but may collapse
//! neighbouring values (platform `MESSAGE` and `INFO` both become hierarchy
//! `INFO`, for example).
use crate::hierarchy::Level as HierarchyLevel;
use crate::platform::Level as PlatformLevel;

/// Maps a platform level to the hierarchy.
///
/// The platform's `ERROR` is fatal, so it lands on the most severe hierarchy
/// level; `CRITICAL` lands one below it.
pub const fn to_hierarchy(level: PlatformLevel) -> HierarchyLevel {
    match level {
        PlatformLevel::Error => HierarchyLevel::CRITICAL,
        PlatformLevel::Critical => HierarchyLevel::ERROR,
        PlatformLevel::Warning => HierarchyLevel::WARNING,
        PlatformLevel::Message | PlatformLevel::Info => HierarchyLevel::INFO,
        PlatformLevel::Debug => HierarchyLevel::DEBUG,
    }
}

/// Maps a hierarchy level to the platform.
///
/// Never yields [`PlatformLevel::Error`]: the platform aborts on it. Values
/// between the named levels fall to the tier below; values under `INFO`,
/// including `NOTSET`, become `DEBUG`.
pub const fn to_platform(level: HierarchyLevel) -> PlatformLevel {
    let value = level.value();
    if value >= HierarchyLevel::ERROR.value() {
        PlatformLevel::Critical
    } else if value >= HierarchyLevel::WARNING.value() {
        PlatformLevel::Warning
    } else if value >= HierarchyLevel::INFO.value() {
        PlatformLevel::Info
    } else {
        PlatformLevel::Debug
    }
}

/// Maps a journald priority (`0` emergency to `7` debug) to the hierarchy.
///
/// Priorities above 7 are treated as debug.
pub const fn priority_to_hierarchy(priority: u8) -> HierarchyLevel {
    match priority {
        0..=2 => HierarchyLevel::CRITICAL,
        3 => HierarchyLevel::ERROR,
        4 => HierarchyLevel::WARNING,
        5 | 6 => HierarchyLevel::INFO,
        _ => HierarchyLevel::DEBUG,
    }
}

/// Parses a `PRIORITY` field value and maps it to the hierarchy.
///
/// Returns `None` when the value is not a number.
pub fn parse_priority(value: &str) -> Option<HierarchyLevel> {
    let priority: u32 = value.trim().parse().ok()?;
    let clamped = u8::try_from(priority).unwrap_or(u8::MAX);
    if clamped > 7 {
        bridge_debug!(name: "Level.PriorityClamped", priority = priority);
    }
    Some(priority_to_hierarchy(clamped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PlatformLevel::Error, HierarchyLevel::CRITICAL)]
    #[case(PlatformLevel::Critical, HierarchyLevel::ERROR)]
    #[case(PlatformLevel::Warning, HierarchyLevel::WARNING)]
    #[case(PlatformLevel::Message, HierarchyLevel::INFO)]
    #[case(PlatformLevel::Info, HierarchyLevel::INFO)]
    #[case(PlatformLevel::Debug, HierarchyLevel::DEBUG)]
    fn platform_to_hierarchy(#[case] input: PlatformLevel, #[case] expected: HierarchyLevel) {
        assert_eq!(to_hierarchy(input), expected);
    }

    #[rstest]
    #[case(HierarchyLevel::NOTSET, PlatformLevel::Debug)]
    #[case(HierarchyLevel::new(5), PlatformLevel::Debug)]
    #[case(HierarchyLevel::DEBUG, PlatformLevel::Debug)]
    #[case(HierarchyLevel::new(19), PlatformLevel::Debug)]
    #[case(HierarchyLevel::INFO, PlatformLevel::Info)]
    #[case(HierarchyLevel::new(25), PlatformLevel::Info)]
    #[case(HierarchyLevel::WARNING, PlatformLevel::Warning)]
    #[case(HierarchyLevel::ERROR, PlatformLevel::Critical)]
    #[case(HierarchyLevel::CRITICAL, PlatformLevel::Critical)]
    #[case(HierarchyLevel::new(1000), PlatformLevel::Critical)]
    fn hierarchy_to_platform(#[case] input: HierarchyLevel, #[case] expected: PlatformLevel) {
        assert_eq!(to_platform(input), expected);
    }

    #[test]
    fn platform_error_is_never_produced() {
        for value in 0..=200 {
            assert_ne!(to_platform(HierarchyLevel::new(value)), PlatformLevel::Error);
        }
    }

    #[test]
    fn mappings_are_monotonic() {
        for pair in PlatformLevel::ALL.windows(2) {
            assert!(to_hierarchy(pair[0]) <= to_hierarchy(pair[1]));
        }
        for value in 0..200 {
            assert!(
                to_platform(HierarchyLevel::new(value))
                    <= to_platform(HierarchyLevel::new(value + 1))
            );
        }
    }

    #[test]
    fn round_trips_preserve_order() {
        for a in PlatformLevel::ALL {
            for b in PlatformLevel::ALL {
                if a <= b {
                    assert!(to_platform(to_hierarchy(a)) <= to_platform(to_hierarchy(b)));
                }
            }
        }
    }

    #[rstest]
    #[case(0, HierarchyLevel::CRITICAL)]
    #[case(2, HierarchyLevel::CRITICAL)]
    #[case(3, HierarchyLevel::ERROR)]
    #[case(4, HierarchyLevel::WARNING)]
    #[case(5, HierarchyLevel::INFO)]
    #[case(6, HierarchyLevel::INFO)]
    #[case(7, HierarchyLevel::DEBUG)]
    #[case(42, HierarchyLevel::DEBUG)]
    fn journald_priorities(#[case] priority: u8, #[case] expected: HierarchyLevel) {
        assert_eq!(priority_to_hierarchy(priority), expected);
    }

    #[test]
    fn parses_priority_fields() {
        assert_eq!(parse_priority("3"), Some(HierarchyLevel::ERROR));
        assert_eq!(parse_priority(" 6 "), Some(HierarchyLevel::INFO));
        assert_eq!(parse_priority("100000"), Some(HierarchyLevel::DEBUG));
        assert_eq!(parse_priority("warning"), None);
    }
}
