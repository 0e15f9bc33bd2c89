//! User-facing alert text.
//!
//! Every message the importer can show is built here so wording stays in one
//! place. File names are quoted with single curly quotes.

use wgi_core::AlertText;

/// Title used whenever a plain source cannot be read.
pub const CANT_OPEN_FILE_TITLE: &str = "Unable to import from file";

/// Generic alert for a plain source that could not be read.
#[must_use]
pub fn cant_open_file(file_name: &str) -> AlertText {
    AlertText::new(
        CANT_OPEN_FILE_TITLE,
        format!("The file ‘{file_name}’ could not be read."),
    )
}

/// Alert for a plain source that is not a valid tunnel configuration.
#[must_use]
pub fn bad_config(file_name: &str) -> AlertText {
    AlertText::new(
        "Unable to import tunnel",
        format!("The file ‘{file_name}’ does not contain a valid WireGuard configuration"),
    )
}

/// Alert for an archive whose expansion stopped without an answer.
#[must_use]
pub fn cant_read_archive() -> AlertText {
    AlertText::new("Unable to read zip archive", "The zip archive could not be read.")
}

/// Alert for a source that did not finish before its deadline.
#[must_use]
pub fn source_timed_out(file_name: &str) -> AlertText {
    AlertText::new(
        CANT_OPEN_FILE_TITLE,
        format!("Reading ‘{file_name}’ took too long and was abandoned."),
    )
}

/// Summary after importing a single archive.
#[must_use]
pub fn imported_from_zip(successful: usize, total: usize) -> AlertText {
    AlertText::new(
        format!("Imported {successful} tunnels"),
        format!("Imported {successful} of {total} tunnels from zip archive"),
    )
}

/// Summary after importing several sources.
#[must_use]
pub fn imported_from_multiple_files(successful: usize, total: usize) -> AlertText {
    AlertText::new(
        format!("Imported {successful} tunnels"),
        format!("Imported {successful} of {total} tunnels from files"),
    )
}

/// Rejection for a tunnel with a blank name.
#[must_use]
pub fn tunnel_name_empty() -> AlertText {
    AlertText::new("No name provided", "Cannot create tunnel with an empty name")
}

/// Rejection for a tunnel whose name is already taken.
#[must_use]
pub fn tunnel_already_exists() -> AlertText {
    AlertText::new("Name already exists", "A tunnel with that name already exists")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cant_open_file() {
        insta::assert_snapshot!(cant_open_file("office.conf").to_string(), @"Unable to import from file: The file ‘office.conf’ could not be read.");
    }

    #[test]
    fn test_bad_config() {
        insta::assert_snapshot!(bad_config("x.conf").message, @"The file ‘x.conf’ does not contain a valid WireGuard configuration");
    }

    #[test]
    fn test_summaries() {
        insta::assert_snapshot!(imported_from_zip(2, 3).to_string(), @"Imported 2 tunnels: Imported 2 of 3 tunnels from zip archive");
        insta::assert_snapshot!(imported_from_multiple_files(1, 3).message, @"Imported 1 of 3 tunnels from files");
    }
}
