//! Name translation between logger names and platform domains.
//!
//! Logger names separate segments with `.` (`net.io`), platform domains with
//! `-` (`net-io`). The root logger `""` corresponds to "no domain".
use std::borrow::Cow;

/// Separator of hierarchy logger names.
pub const LOGGER_SEPARATOR: char = '.';

/// Default separator of platform domains.
pub const DOMAIN_SEPARATOR: char = '-';

/// Converts a logger name to a platform domain.
///
/// The root logger has no domain.
pub fn dots_to_dashes(name: &str) -> Option<String> {
    NameMapping::default().to_domain(name)
}

/// Converts a platform domain to a logger name.
///
/// A record without a domain belongs to the root logger.
pub fn dashes_to_dots(domain: Option<&str>) -> String {
    NameMapping::default().to_logger_name(domain)
}

/// How names are rewritten when crossing the bridge.
///
/// The prefix and suffix are added to the translated name on the output side:
/// to the domain when going to the platform, to the logger name when going to
/// the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMapping {
    prefix: Cow<'static, str>,
    suffix: Cow<'static, str>,
    separator: char,
}

impl Default for NameMapping {
    fn default() -> Self {
        NameMapping {
            prefix: Cow::Borrowed(""),
            suffix: Cow::Borrowed(""),
            separator: DOMAIN_SEPARATOR,
        }
    }
}

impl NameMapping {
    /// Creates a mapping without prefix or suffix.
    pub fn new() -> Self {
        NameMapping::default()
    }

    /// Prepends `prefix` to every translated name.
    pub fn with_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Appends `suffix` to every translated name.
    pub fn with_suffix(mut self, suffix: impl Into<Cow<'static, str>>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Uses `separator` instead of `-` between domain segments.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// The prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The suffix.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The domain separator.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Translates a logger name to a platform domain.
    ///
    /// Returns `None` when the result is empty.
    pub fn to_domain(&self, name: &str) -> Option<String> {
        let mut domain = String::with_capacity(self.prefix.len() + name.len() + self.suffix.len());
        domain.push_str(&self.prefix);
        domain.extend(name.chars().map(|c| {
            if c == LOGGER_SEPARATOR {
                self.separator
            } else {
                c
            }
        }));
        domain.push_str(&self.suffix);
        (!domain.is_empty()).then_some(domain)
    }

    /// Translates a platform domain to a logger name.
    pub fn to_logger_name(&self, domain: Option<&str>) -> String {
        let domain = domain.unwrap_or_default();
        let mut name = String::with_capacity(self.prefix.len() + domain.len() + self.suffix.len());
        name.push_str(&self.prefix);
        name.extend(domain.chars().map(|c| {
            if c == self.separator {
                LOGGER_SEPARATOR
            } else {
                c
            }
        }));
        name.push_str(&self.suffix);
        name
    }

    /// The logger name that [`to_domain`](Self::to_domain) turns into
    /// `domain`.
    ///
    /// Returns `None` when `domain` lacks the prefix or the suffix, since no
    /// logger maps to it.
    pub fn source_logger_name(&self, domain: &str) -> Option<String> {
        let inner = domain
            .strip_prefix(&*self.prefix)?
            .strip_suffix(&*self.suffix)?;
        Some(
            inner
                .chars()
                .map(|c| if c == self.separator { LOGGER_SEPARATOR } else { c })
                .collect(),
        )
    }
}
