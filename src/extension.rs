//! File extension extraction.
//!
//! The destination folder for a file is derived from its extension: the
//! lower-cased text following the last `.` in the file name. A name with no
//! dot, or a name ending in a dot, has no extension and is never organized.

/// Returns the lower-cased extension of a file name, if it has one.
///
/// The extension is everything after the final `.` in the name, without the
/// dot itself. Matching is case-insensitive, so `photo.JPG` and `photo.jpg`
/// land in the same destination folder.
///
/// # Examples
///
/// ```
/// use extidy::extension::extension_of;
///
/// assert_eq!(extension_of("photo.JPG"), Some("jpg".to_string()));
/// assert_eq!(extension_of("archive.tar.gz"), Some("gz".to_string()));
/// assert_eq!(extension_of("Makefile"), None);
/// assert_eq!(extension_of("trailing."), None);
/// ```
pub fn extension_of(file_name: &str) -> Option<String> {
    let (_, suffix) = file_name.rsplit_once('.')?;
    if suffix.is_empty() {
        return None;
    }
    Some(suffix.to_lowercase())
}
