pub mod probe;
pub mod result;

pub mod prelude {
    pub use super::probe::{HttpProber, Probe, probe_url};
    pub use super::result::{ProbeRequest, ProbeResult};
}

use std::fmt::Write;

/// Flattens an error and its sources into one line, e.g.
/// `error sending request: client error (Connect): Connection refused`.
fn error_chain(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_chain_joins_sources() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let outer = crate::error::ConfigError::Read {
            path: "targets.yml".into(),
            source: inner,
        };
        let line = error_chain(&outer);
        assert!(line.starts_with("failed to read config file targets.yml"));
        assert!(line.ends_with(": refused"));
        assert!(!line.contains('\n'));
    }
}
