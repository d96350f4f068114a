use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use sidecar_tools::{first_dot_stem, os_str_to_string, path_to_filename_string, strip_extension};

/// A sidecar file together with the media stack it describes.
///
/// The stack holds several paths when the item is a burst sequence or the
/// same shot in multiple formats.
#[derive(Debug)]
pub struct SidecarMedia {
    pub sidecar_path: PathBuf,
    pub media_paths: Vec<PathBuf>,
}

/// The two mirrored directory trees of the photo library.
#[derive(Debug)]
pub struct Library {
    pub(crate) originals_root: PathBuf,
    pub(crate) sidecar_root: PathBuf,
}

impl Library {
    pub const fn new(originals_root: PathBuf, sidecar_root: PathBuf) -> Self {
        Self {
            originals_root,
            sidecar_root,
        }
    }

    /// Recursively collect all sidecar files under the sidecar root.
    /// Returned paths are sorted for a deterministic processing order.
    pub fn collect_sidecars(&self, extensions: &[String]) -> Result<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = WalkDir::new(&self.sidecar_root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| !sidecar_tools::is_hidden(entry))
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|path| {
                let extension = sidecar_tools::path_to_file_extension_string(path);
                extensions.iter().any(|e| *e == extension)
            })
            .collect();

        paths.sort_unstable();
        Ok(paths)
    }

    /// Find every media file matching the given sidecar.
    ///
    /// The media is assumed to live in the mirrored directory under the
    /// originals root. A missing directory means the sidecar is an orphan
    /// candidate and yields an empty list, not an error. Matching is done on
    /// extensionless basename prefix so burst suffixes like `.00002` still
    /// group under the one sidecar of the burst.
    ///
    /// Result order follows the directory listing and is unspecified.
    pub fn locate_media(&self, sidecar_path: &Path) -> Result<Vec<PathBuf>> {
        let relative = sidecar_path.strip_prefix(&self.sidecar_root).with_context(|| {
            format!(
                "Sidecar path {} does not start with the sidecar root {}",
                sidecar_path.display(),
                self.sidecar_root.display()
            )
        })?;

        let Some(media_dir) = self.originals_root.join(relative).parent().map(Path::to_path_buf) else {
            return Ok(Vec::new());
        };
        if !media_dir.exists() {
            return Ok(Vec::new());
        }

        let sidecar_name = path_to_filename_string(sidecar_path);
        let sidecar_stem = strip_extension(&sidecar_name);

        let mut matches = Vec::new();
        for entry in fs::read_dir(&media_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            let file_name = os_str_to_string(&entry.file_name());
            if strip_extension(&file_name).starts_with(sidecar_stem) {
                matches.push(entry.path());
            }
        }

        Ok(matches)
    }

    /// Group each sidecar path with its media stack.
    pub fn media_stacks(&self, sidecar_paths: &[PathBuf]) -> Result<Vec<SidecarMedia>> {
        sidecar_paths
            .iter()
            .map(|sidecar_path| {
                Ok(SidecarMedia {
                    sidecar_path: sidecar_path.clone(),
                    media_paths: self.locate_media(sidecar_path)?,
                })
            })
            .collect()
    }

    /// Report sidecar files with no matching media anywhere under the originals root.
    ///
    /// The originals tree is walked once and indexed by first-dot stem,
    /// so burst members still count as a match for their shared sidecar.
    pub fn find_orphans(&self, sidecar_paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let media_stems: HashSet<String> = WalkDir::new(&self.originals_root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| first_dot_stem(&os_str_to_string(entry.file_name())).to_string())
            .collect();

        let orphans = sidecar_paths
            .iter()
            .filter(|sidecar_path| {
                let name = path_to_filename_string(sidecar_path);
                !media_stems.contains(first_dot_stem(&name))
            })
            .cloned()
            .collect();

        Ok(orphans)
    }
}
