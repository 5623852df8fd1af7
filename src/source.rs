//! Line-oriented job source: one target per line.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use url::Url;

use crate::error::SourceError;
use crate::http_probe::result::ProbeRequest;

const BOM: char = '\u{feff}';

/// Reads targets and turns them into probe requests, in input order.
///
/// Lines are trimmed; blank lines and `#` comments are skipped. Lines that are
/// not valid URLs are passed through unless `strict` is set, so the probe
/// reports them like any other failure. The same goes for lines that are not
/// valid UTF-8: bad bytes are replaced in lenient mode and rejected in strict
/// mode. A leading byte order mark is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobSource {
    strict: bool,
}

impl JobSource {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn read_file(&self, path: &Path) -> Result<Vec<ProbeRequest>, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let jobs = self.read(BufReader::new(file))?;
        log::info!("Read {} targets from {}", jobs.len(), path.display());
        Ok(jobs)
    }

    pub fn read<R: BufRead>(&self, mut reader: R) -> Result<Vec<ProbeRequest>, SourceError> {
        let mut jobs = Vec::new();
        let mut buf = Vec::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| SourceError::Io {
                    line: line_no + 1,
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_no += 1;

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => Cow::Borrowed(line),
                Err(err) => {
                    if self.strict {
                        return Err(SourceError::Malformed {
                            line: line_no,
                            reason: format!("invalid UTF-8: {err}"),
                        });
                    }
                    log::warn!("Line {line_no} is not valid UTF-8 ({err}), replacing bad bytes");
                    String::from_utf8_lossy(&buf)
                }
            };
            let line = if line_no == 1 {
                line.trim_start_matches(BOM)
            } else {
                &*line
            };

            let target = line.trim();
            if target.is_empty() || target.starts_with('#') {
                continue;
            }
            if let Err(err) = Url::parse(target) {
                if self.strict {
                    return Err(SourceError::Malformed {
                        line: line_no,
                        reason: err.to_string(),
                    });
                }
                log::warn!("Line {line_no}: {target:?} is not a valid URL ({err}), probing anyway");
            }
            jobs.push(ProbeRequest::new(target));
        }
        Ok(jobs)
    }
}
