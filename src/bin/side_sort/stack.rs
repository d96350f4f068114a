use std::path::{Path, PathBuf};

use sidecar_tools::{path_to_file_extension_string, path_to_filename_string};

/// Media format classes used when picking the primary file of a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaKind {
    Jpeg,
    Raw,
    Heif,
    ImageOther,
    Video,
    Other,
}

impl MediaKind {
    fn from_path(path: &Path) -> Self {
        match path_to_file_extension_string(path).as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "raw" => Self::Raw,
            "heif" => Self::Heif,
            "png" | "gif" => Self::ImageOther,
            "mp4" | "webm" | "mkv" => Self::Video,
            _ => Self::Other,
        }
    }
}

/// Choose the primary file of a media stack.
///
/// A single linear scan where the last applicable rule wins:
/// the first JPEG becomes primary, any raw/HEIF/other-image/video file takes
/// over unconditionally, and a later JPEG only replaces a JPEG primary when
/// its basename is strictly shorter. When several non-JPEG formats appear
/// the result depends on input order; that order dependence matches the
/// indexer's own selection heuristic and is kept as is.
///
/// Note that the heuristic cannot tell a burst (one shot, safe to treat as
/// one item) from visually similar shots stacked under one sidecar; for the
/// latter the chosen primary is arbitrary.
///
/// Returns `None` for an empty stack.
pub fn select_primary(stack: &[PathBuf]) -> Option<&PathBuf> {
    let mut primary: Option<&PathBuf> = None;

    for candidate in stack {
        match MediaKind::from_path(candidate) {
            MediaKind::Jpeg => {
                if let Some(current) = primary {
                    let shorter = path_to_filename_string(candidate).chars().count()
                        < path_to_filename_string(current).chars().count();
                    if MediaKind::from_path(current) == MediaKind::Jpeg && shorter {
                        primary = Some(candidate);
                    }
                } else {
                    primary = Some(candidate);
                }
            }
            MediaKind::Raw | MediaKind::Heif | MediaKind::ImageOther | MediaKind::Video => {
                primary = Some(candidate);
            }
            MediaKind::Other => {}
        }
    }

    primary
}
