//! Native-to-WSL path translation.
//!
//! The transcription command runs inside WSL, where a native Windows drive is
//! mounted under `/mnt/<letter>`. Translation is a pure string transform:
//! no filesystem access, total over all valid native paths, and idempotent on
//! paths already in WSL form.

use std::path::Path;

/// Convert a native path to the form the WSL environment sees.
///
/// `X:\a\b` becomes `/mnt/x/a/b`; backslashes become forward slashes; any
/// path without a drive-letter prefix passes through unchanged.
pub fn to_wsl_path(path: &Path) -> String {
    let unix_slashes = path.to_string_lossy().replace('\\', "/");
    let bytes = unix_slashes.as_bytes();

    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        format!(
            "/mnt/{}{}",
            bytes[0].to_ascii_lowercase() as char,
            &unix_slashes[2..]
        )
    } else {
        unix_slashes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn translates_drive_letter_path() {
        let path = PathBuf::from(r"C:\data\watch\memo.m4a");
        assert_eq!(to_wsl_path(&path), "/mnt/c/data/watch/memo.m4a");
    }

    #[test]
    fn lowercases_the_drive_letter() {
        let path = PathBuf::from(r"D:\Recordings\a.wav");
        assert_eq!(to_wsl_path(&path), "/mnt/d/Recordings/a.wav");
    }

    #[test]
    fn idempotent_on_wsl_form() {
        let once = to_wsl_path(Path::new(r"C:\data\memo.m4a"));
        let twice = to_wsl_path(Path::new(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn unix_path_passes_through() {
        let path = PathBuf::from("/home/user/watch/memo.m4a");
        assert_eq!(to_wsl_path(&path), "/home/user/watch/memo.m4a");
    }

    #[test]
    fn relative_path_passes_through() {
        let path = PathBuf::from(r"watch\memo.m4a");
        assert_eq!(to_wsl_path(&path), "watch/memo.m4a");
    }
}
