//! Debug output selection by namespace.
//!
//! The platform hides debug records unless their domain is listed in
//! `G_MESSAGES_DEBUG`. [`DebugFilter`] applies the same rule on either side
//! of the bridge so that enabling `net` shows the debug output of `net`,
//! `net-io` and `net.io` alike, whichever logger it came from.
use std::fmt;
use std::sync::Arc;

use crate::hierarchy::{Filter, Level as HierarchyLevel, LoggerHierarchy, Record, ROOT_LOGGER};
use crate::level;
use crate::namespace::{NameMapping, DOMAIN_SEPARATOR};
use crate::platform::Level as PlatformLevel;

/// Environment variable holding the enabled debug namespaces.
pub const DEBUG_NAMESPACES_ENV: &str = "G_MESSAGES_DEBUG";

/// Configuration value enabling every namespace.
pub const ALL_NAMESPACES: &str = "all";

/// The parsed set of namespaces whose debug output is enabled.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DebugNamespaceSet {
    all: bool,
    namespaces: Vec<String>,
}

impl DebugNamespaceSet {
    /// Parses a whitespace-separated list of domains.
    ///
    /// Only a configuration that is exactly `all` enables everything; inside
    /// a longer list `all` is an ordinary domain name.
    pub fn parse(config: &str) -> Self {
        let config = config.trim();
        if config == ALL_NAMESPACES {
            return DebugNamespaceSet {
                all: true,
                namespaces: Vec::new(),
            };
        }
        let mut namespaces: Vec<String> = Vec::new();
        for token in config.split_whitespace() {
            if !namespaces.iter().any(|n| n == token) {
                namespaces.push(token.to_owned());
            }
        }
        DebugNamespaceSet {
            all: false,
            namespaces,
        }
    }

    /// Reads and parses [`DEBUG_NAMESPACES_ENV`]. Unset means nothing is
    /// enabled.
    pub fn from_env() -> Self {
        std::env::var(DEBUG_NAMESPACES_ENV)
            .map(|value| DebugNamespaceSet::parse(&value))
            .unwrap_or_default()
    }

    /// Enables every namespace.
    pub fn all() -> Self {
        DebugNamespaceSet::parse(ALL_NAMESPACES)
    }

    /// Whether every namespace is enabled.
    pub fn is_all(&self) -> bool {
        self.all
    }

    /// Whether nothing is enabled.
    pub fn is_empty(&self) -> bool {
        !self.all && self.namespaces.is_empty()
    }

    /// The listed namespaces. Empty when [`is_all`](Self::is_all) holds.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(String::as_str)
    }

    /// Whether debug output of `domain` is enabled.
    ///
    /// A domain is enabled when it is listed or one of its dash-separated
    /// ancestors is. Records without a domain are only enabled by `all`.
    pub fn is_enabled(&self, domain: Option<&str>) -> bool {
        self.is_enabled_with_separator(domain, DOMAIN_SEPARATOR)
    }

    /// Like [`is_enabled`](Self::is_enabled) for domains whose segments are
    /// separated by `separator`.
    pub fn is_enabled_with_separator(&self, domain: Option<&str>, separator: char) -> bool {
        if self.all {
            return true;
        }
        let Some(domain) = domain else {
            return false;
        };
        self.namespaces.iter().any(|namespace| {
            domain
                .strip_prefix(namespace.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(separator))
        })
    }
}

impl fmt::Debug for DebugNamespaceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.all {
            f.write_str("DebugNamespaceSet(all)")
        } else {
            f.debug_tuple("DebugNamespaceSet")
                .field(&self.namespaces)
                .finish()
        }
    }
}

/// Drops debug records of namespaces that are not enabled.
///
/// Records above the debug tier always pass.
#[derive(Debug, Clone)]
pub struct DebugFilter {
    namespaces: DebugNamespaceSet,
    mapping: NameMapping,
}

impl DebugFilter {
    /// Creates a filter for an explicit namespace set.
    pub fn new(namespaces: DebugNamespaceSet) -> Self {
        bridge_debug!(
            name: "DebugFilter.Created",
            all = namespaces.is_all(),
            namespaces = namespaces.namespaces.len()
        );
        DebugFilter {
            namespaces,
            mapping: NameMapping::default(),
        }
    }

    /// Creates a filter from [`DEBUG_NAMESPACES_ENV`].
    pub fn from_env() -> Self {
        DebugFilter::new(DebugNamespaceSet::from_env())
    }

    /// Sets how logger names are turned into domains before matching.
    pub fn with_name_mapping(mut self, mapping: NameMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// The namespace set.
    pub fn namespaces(&self) -> &DebugNamespaceSet {
        &self.namespaces
    }

    /// Whether a platform record of `level` in `domain` passes.
    pub fn should_pass_platform(&self, level: PlatformLevel, domain: Option<&str>) -> bool {
        level != PlatformLevel::Debug || self.namespaces.is_enabled(domain)
    }

    /// Whether a hierarchy record of `level` on the logger `name` passes.
    pub fn should_pass_hierarchy(&self, level: HierarchyLevel, name: &str) -> bool {
        let level = level::to_platform(level);
        if level != PlatformLevel::Debug {
            return true;
        }
        let domain = self.mapping.to_domain(name);
        self.namespaces
            .is_enabled_with_separator(domain.as_deref(), self.mapping.separator())
    }

    /// Installs this filter on the root of `hierarchy` and lowers the level
    /// of every enabled namespace's logger to `DEBUG`.
    ///
    /// With `all`, the root itself is lowered. Loggers outside the enabled
    /// namespaces keep their levels, and namespaces that no logger maps to
    /// under the name mapping are skipped.
    pub fn register_for_all_namespaces<H>(&self, hierarchy: &H)
    where
        H: LoggerHierarchy + ?Sized,
    {
        hierarchy.add_filter(ROOT_LOGGER, Arc::new(self.clone()));
        if self.namespaces.is_all() {
            hierarchy.set_level(ROOT_LOGGER, HierarchyLevel::DEBUG);
            return;
        }
        for namespace in self.namespaces.iter() {
            match self.mapping.source_logger_name(namespace) {
                Some(name) => hierarchy.set_level(&name, HierarchyLevel::DEBUG),
                None => {
                    bridge_debug!(
                        name: "DebugFilter.Register.Skipped",
                        namespace = namespace
                    );
                }
            }
        }
    }
}

impl Filter for DebugFilter {
    fn filter(&self, record: &Record) -> bool {
        self.should_pass_hierarchy(record.level, &record.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LoggerTree;
    use rstest::rstest;

    #[rstest]
    #[case("", None, false)]
    #[case("", Some("net"), false)]
    #[case("all", Some("net"), true)]
    #[case("all", None, true)]
    #[case("  all\n", Some("anything-at-all"), true)]
    #[case("net sys", Some("net"), true)]
    #[case("net sys", Some("net-io"), true)]
    #[case("net sys", Some("sys-fs-ext4"), true)]
    #[case("net sys", Some("network"), false)]
    #[case("net sys", Some("ui"), false)]
    #[case("net sys", None, false)]
    #[case("app.network all", Some("ui"), false)]
    #[case("app.network all", Some("all"), true)]
    #[case("net-io", Some("net"), false)]
    fn namespace_matching(
        #[case] config: &str,
        #[case] domain: Option<&str>,
        #[case] expected: bool,
    ) {
        assert_eq!(DebugNamespaceSet::parse(config).is_enabled(domain), expected);
    }

    #[test]
    fn parse_keeps_unique_tokens() {
        let set = DebugNamespaceSet::parse(" net\tsys  net ");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["net", "sys"]);
        assert!(!set.is_all());
        assert!(!set.is_empty());
        assert!(DebugNamespaceSet::parse("   ").is_empty());
        assert!(DebugNamespaceSet::all().is_all());
    }

    #[test]
    fn reads_environment() {
        temp_env::with_var(DEBUG_NAMESPACES_ENV, Some("net sys"), || {
            let set = DebugNamespaceSet::from_env();
            assert!(set.is_enabled(Some("net-io")));
            assert!(!set.is_enabled(Some("ui")));
        });
        temp_env::with_var(DEBUG_NAMESPACES_ENV, Some("all"), || {
            assert!(DebugFilter::from_env().namespaces().is_all());
        });
        temp_env::with_var_unset(DEBUG_NAMESPACES_ENV, || {
            assert!(DebugNamespaceSet::from_env().is_empty());
        });
    }

    #[rstest]
    #[case(PlatformLevel::Debug, Some("net-io"), true)]
    #[case(PlatformLevel::Debug, Some("ui"), false)]
    #[case(PlatformLevel::Debug, None, false)]
    #[case(PlatformLevel::Info, Some("ui"), true)]
    #[case(PlatformLevel::Critical, None, true)]
    fn platform_records(
        #[case] level: PlatformLevel,
        #[case] domain: Option<&str>,
        #[case] expected: bool,
    ) {
        let filter = DebugFilter::new(DebugNamespaceSet::parse("net sys"));
        assert_eq!(filter.should_pass_platform(level, domain), expected);
    }

    #[rstest]
    #[case(HierarchyLevel::DEBUG, "net.io", true)]
    #[case(HierarchyLevel::DEBUG, "ui", false)]
    #[case(HierarchyLevel::new(15), "ui", false)]
    #[case(HierarchyLevel::DEBUG, "", false)]
    #[case(HierarchyLevel::INFO, "ui", true)]
    #[case(HierarchyLevel::ERROR, "", true)]
    fn hierarchy_records(#[case] level: HierarchyLevel, #[case] name: &str, #[case] expected: bool) {
        let filter = DebugFilter::new(DebugNamespaceSet::parse("net sys"));
        let record = Record::new(name, level, "message");
        assert_eq!(filter.filter(&record), expected);
    }

    #[test]
    fn name_mapping_applies_before_matching() {
        let filter = DebugFilter::new(DebugNamespaceSet::parse("py-net"))
            .with_name_mapping(NameMapping::new().with_prefix("py-"));
        assert!(filter.should_pass_hierarchy(HierarchyLevel::DEBUG, "net.io"));
        assert!(!filter.should_pass_hierarchy(HierarchyLevel::DEBUG, "ui"));
    }

    #[test]
    fn registers_on_enabled_namespaces() {
        let tree = LoggerTree::new();
        tree.set_level("ui", HierarchyLevel::ERROR);
        DebugFilter::new(DebugNamespaceSet::parse("net sys-fs")).register_for_all_namespaces(&tree);

        assert_eq!(tree.level("net"), HierarchyLevel::DEBUG);
        assert_eq!(tree.level("sys.fs"), HierarchyLevel::DEBUG);
        assert_eq!(tree.level("ui"), HierarchyLevel::ERROR);
        assert_eq!(tree.level(ROOT_LOGGER), HierarchyLevel::WARNING);
        assert_eq!(tree.effective_level("net.io"), HierarchyLevel::DEBUG);
        assert_eq!(tree.filter_count(ROOT_LOGGER), 1);
    }

    #[test]
    fn registers_through_a_prefixed_mapping() {
        let tree = LoggerTree::new();
        let filter = DebugFilter::new(DebugNamespaceSet::parse("py-net other"))
            .with_name_mapping(NameMapping::new().with_prefix("py-"));
        filter.register_for_all_namespaces(&tree);

        assert_eq!(tree.level("net"), HierarchyLevel::DEBUG);
        assert_eq!(tree.level("py.net"), HierarchyLevel::NOTSET);
        assert_eq!(tree.level("other"), HierarchyLevel::NOTSET);
        assert!(tree.is_enabled_for("net.io", HierarchyLevel::DEBUG));
        assert!(filter.should_pass_hierarchy(HierarchyLevel::DEBUG, "net.io"));
    }

    #[test]
    fn custom_separator_matches_ancestors() {
        let filter = DebugFilter::new(DebugNamespaceSet::parse("net"))
            .with_name_mapping(NameMapping::new().with_separator('_'));
        assert!(filter.should_pass_hierarchy(HierarchyLevel::DEBUG, "net.io"));
        assert!(filter.should_pass_hierarchy(HierarchyLevel::DEBUG, "net"));
        assert!(!filter.should_pass_hierarchy(HierarchyLevel::DEBUG, "network"));

        let tree = LoggerTree::new();
        filter.register_for_all_namespaces(&tree);
        assert_eq!(tree.effective_level("net.io"), HierarchyLevel::DEBUG);
    }

    #[test]
    fn registers_root_for_all() {
        let tree = LoggerTree::new();
        DebugFilter::new(DebugNamespaceSet::all()).register_for_all_namespaces(&tree);
        assert_eq!(tree.level(ROOT_LOGGER), HierarchyLevel::DEBUG);
        assert_eq!(tree.effective_level("anything.below"), HierarchyLevel::DEBUG);
    }
}
