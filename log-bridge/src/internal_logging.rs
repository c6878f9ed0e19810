//! Self-diagnostics.
//!
//! The bridge reports what it does to itself (writer swaps, clamped levels,
//! journal failures) as `tracing` events under the crate's target when the
//! `internal-logs` feature is on. Bridged records never go through here.
//!
//! Unit tests print the events as well; run them with `--nocapture` to see
//! them.

/// Debug event with one or more key/value fields, recorded with `Display`.
///
/// ```ignore
/// bridge_debug!(name: "Level.PriorityClamped", priority = 12);
/// ```
macro_rules! bridge_debug {
    (name: $name:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        #[cfg(feature = "internal-logs")]
        $crate::_private::debug!(
            name: $name,
            target: env!("CARGO_PKG_NAME"),
            $($key = %$value),+
        );
        #[cfg(test)]
        println!(
            "bridge_debug {}{}",
            $name,
            [$(format!(" {}={}", stringify!($key), $value)),+].concat()
        );
        #[cfg(not(any(feature = "internal-logs", test)))]
        let _ = ($name, $($value),+);
    }};
}

/// Warning event carrying only its name.
macro_rules! bridge_warn {
    (name: $name:expr $(,)?) => {{
        #[cfg(feature = "internal-logs")]
        $crate::_private::warn!(name: $name, target: env!("CARGO_PKG_NAME"), "{}", $name);
        #[cfg(test)]
        println!("bridge_warn {}", $name);
        #[cfg(not(any(feature = "internal-logs", test)))]
        let _ = $name;
    }};
}
