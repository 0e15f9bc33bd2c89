//! Plain source loading.
//!
//! [`load_plain`] reads one `.conf` file and parses it. It performs blocking
//! I/O and is meant to run on a blocking worker, never on the task that
//! commits and presents results.

use std::io;

use tracing::debug;
use wgi_core::{ImportError, ImportErrorKind, SourceId, SourceOutcome};

use crate::messages;

/// Reads and parses one plain source.
///
/// - Read failures become [`ImportErrorKind::SourceUnreadable`]. When the
///   operating system reported the failure, or the content is not UTF-8, the
///   error's own text is the message. Anything else gets a generic "could not
///   be read" message naming the file.
/// - Parse failures become [`ImportErrorKind::ConfigMalformed`].
///
/// The tunnel is named after the file's base name, whitespace-trimmed.
pub fn load_plain(source: &SourceId) -> SourceOutcome {
    let file_name = source.file_name();

    let text = match std::fs::read_to_string(source.path().as_std_path()) {
        Ok(text) => text,
        Err(e) => {
            debug!(source = %source, error = %e, "Failed to read source");
            return SourceOutcome::Failure(unreadable(file_name, &e));
        }
    };

    match wgi_quick::parse(&text, source.base_name()) {
        Ok(config) => SourceOutcome::single(config),
        Err(e) => {
            debug!(source = %source, error = %e, "Source is not a valid tunnel");
            SourceOutcome::Failure(ImportError {
                kind: ImportErrorKind::ConfigMalformed,
                alert: messages::bad_config(file_name),
            })
        }
    }
}

fn unreadable(file_name: &str, error: &io::Error) -> ImportError {
    let described = error.raw_os_error().is_some() || error.kind() == io::ErrorKind::InvalidData;
    let alert = if described {
        wgi_core::AlertText::new(messages::CANT_OPEN_FILE_TITLE, error.to_string())
    } else {
        messages::cant_open_file(file_name)
    };
    ImportError {
        kind: ImportErrorKind::SourceUnreadable,
        alert,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    const VALID: &str = "[Interface]\nPrivateKey = yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=\n";

    fn write(dir: &TempDir, name: &str, contents: &[u8]) -> SourceId {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        SourceId::new(Utf8PathBuf::from_path_buf(path).unwrap())
    }

    #[test]
    fn test_load_valid_uses_trimmed_base_name() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, " office .conf", VALID.as_bytes());

        match load_plain(&source) {
            SourceOutcome::Success(slots) => {
                assert_eq!(slots.len(), 1);
                assert_eq!(slots[0].as_ref().map(|c| c.name.as_str()), Some("office"));
            }
            SourceOutcome::Failure(e) => panic!("unexpected failure: {e}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let source = SourceId::new("/nonexistent/dir/home.conf");
        match load_plain(&source) {
            SourceOutcome::Failure(e) => {
                assert_eq!(e.kind, ImportErrorKind::SourceUnreadable);
                assert_eq!(e.alert.title, messages::CANT_OPEN_FILE_TITLE);
            }
            SourceOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_load_non_utf8_describes_encoding() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "binary.conf", &[0xff, 0xfe, 0x00]);
        match load_plain(&source) {
            SourceOutcome::Failure(e) => {
                assert_eq!(e.kind, ImportErrorKind::SourceUnreadable);
                assert_eq!(e.alert.title, messages::CANT_OPEN_FILE_TITLE);
                assert!(e.alert.message.contains("UTF-8"), "{}", e.alert.message);
            }
            SourceOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_load_malformed() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "junk.conf", b"hello world");
        match load_plain(&source) {
            SourceOutcome::Failure(e) => {
                assert_eq!(e.kind, ImportErrorKind::ConfigMalformed);
                assert!(e.alert.message.contains("junk.conf"));
            }
            SourceOutcome::Success(_) => panic!("expected failure"),
        }
    }
}
