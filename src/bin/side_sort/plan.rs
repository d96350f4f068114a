use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Datelike;

use sidecar_tools::{
    append_extension_to_path, format_size, get_normalized_file_name_and_extension, path_to_filename_string,
    print_warning, strip_extension,
};

use crate::library::{Library, SidecarMedia};
use crate::sidecar::SidecarFile;
use crate::stack::select_primary;

/// One pending relocation, produced and consumed within a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub current: PathBuf,
    pub target: PathBuf,
}

/// Plan date-bucketed moves for the given stacks.
///
/// Private and archived items keep their current location. The target keeps
/// each file's own name and only changes the directory to
/// `<originals>/<year>/<month>`. Files already in place are left out,
/// so a second run plans nothing.
pub fn plan_moves(library: &Library, stacks: &[SidecarMedia]) -> Result<Vec<MovePlan>> {
    let mut plans = Vec::new();

    for stack in stacks {
        let sidecar = SidecarFile::read(&stack.sidecar_path)?;
        if sidecar.is_excluded() {
            continue;
        }

        let taken_at = sidecar.taken_at(&stack.sidecar_path)?;
        let bucket = library
            .originals_root
            .join(taken_at.year().to_string())
            .join(format!("{:02}", taken_at.month()));

        for media_path in &stack.media_paths {
            let target = bucket.join(path_to_filename_string(media_path));
            if *media_path != target {
                plans.push(MovePlan {
                    current: media_path.clone(),
                    target,
                });
            }
        }
    }

    Ok(plans)
}

/// Plan canonical renames for every stack under the given sidecars.
///
/// The canonical base name is the capture timestamp plus the CRC-32C
/// checksum of the primary file, e.g. `20160101_120000_90F599E3`.
/// Every stack member converges on that base name while keeping its own
/// extension and any burst numbering between the stem and the extension.
/// Members already named correctly are left out, so repeat runs reach a
/// fixed point. A sidecar without any media is skipped, not an error.
pub fn plan_renames(library: &Library, sidecar_paths: &[PathBuf], verbose: bool) -> Result<Vec<MovePlan>> {
    let mut plans = Vec::new();

    for sidecar_path in sidecar_paths {
        let media_paths = library.locate_media(sidecar_path)?;
        let Some(primary) = select_primary(&media_paths) else {
            if verbose {
                print_warning!("No media found for {}", sidecar_path.display());
            }
            continue;
        };

        let sidecar = SidecarFile::read(sidecar_path)?;
        let taken_at = sidecar.taken_at(sidecar_path)?;

        let content = fs::read(primary).with_context(|| format!("Failed to read {}", primary.display()))?;
        let checksum = crc32c::crc32c(&content);
        if verbose {
            println!("Hashed {} ({})", primary.display(), format_size(content.len() as u64));
        }

        let canonical = format!("{}{checksum:08X}", taken_at.format("%Y%m%d_%H%M%S_"));

        let sidecar_name = path_to_filename_string(sidecar_path);
        let sidecar_stem = strip_extension(&sidecar_name);

        for media_path in &media_paths {
            let (stem, extension) = get_normalized_file_name_and_extension(media_path)?;
            // Keep burst numbering like `.00002` sitting between the shared
            // stem and the extension.
            let burst_suffix = stem.strip_prefix(sidecar_stem).unwrap_or_default();
            let target_stem = format!("{canonical}{burst_suffix}");
            if stem == target_stem {
                continue;
            }

            let Some(parent) = media_path.parent() else {
                continue;
            };
            let target = if extension.is_empty() {
                parent.join(&target_stem)
            } else {
                append_extension_to_path(parent.join(&target_stem), &extension)
            };
            plans.push(MovePlan {
                current: media_path.clone(),
                target,
            });
        }
    }

    Ok(plans)
}

/// Plan moves of private or archived media into a flat holding directory
/// under the originals root. Files already in that directory are left out.
pub fn plan_stash(
    library: &Library,
    sidecar_paths: &[PathBuf],
    folder: &str,
    include_private: bool,
    include_archived: bool,
) -> Result<Vec<MovePlan>> {
    let stash_dir = library.originals_root.join(folder);
    let mut plans = Vec::new();

    for sidecar_path in sidecar_paths {
        let sidecar = SidecarFile::read(sidecar_path)?;
        let matches = (include_private && sidecar.private) || (include_archived && sidecar.is_archived());
        if !matches {
            continue;
        }

        for media_path in library.locate_media(sidecar_path)? {
            if media_path.parent() == Some(stash_dir.as_path()) {
                continue;
            }
            let target = stash_dir.join(path_to_filename_string(&media_path));
            plans.push(MovePlan {
                current: media_path,
                target,
            });
        }
    }

    Ok(plans)
}

#[cfg(test)]
mod plan_tests {
    use super::*;

    use std::fs::{self, File};
    use std::path::Path;

    use tempfile::TempDir;

    fn create_library() -> (TempDir, Library) {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let originals = temp_dir.path().join("originals");
        let sidecar = temp_dir.path().join("storage").join("sidecar");
        fs::create_dir_all(&originals).expect("Failed to create originals root");
        fs::create_dir_all(&sidecar).expect("Failed to create sidecar root");
        let library = Library::new(originals, sidecar);
        (temp_dir, library)
    }

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, content).expect("Failed to write file");
    }

    fn create_file(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        File::create(path).expect("Failed to create file");
    }

    const TAKEN_2016: &str = "TakenAt: 2016-01-01T12:00:00Z\nPrivate: false\n";

    #[test]
    fn plans_move_into_year_month_bucket() {
        let (_temp, library) = create_library();
        let sidecar_path = library.sidecar_root.join("foo.yml");
        write_file(&sidecar_path, TAKEN_2016);
        let media = library.originals_root.join("foo.png");
        create_file(&media);

        let stacks = vec![SidecarMedia {
            sidecar_path,
            media_paths: vec![media.clone()],
        }];
        let plans = plan_moves(&library, &stacks).unwrap();

        assert_eq!(
            plans,
            vec![MovePlan {
                current: media,
                target: library.originals_root.join("2016").join("01").join("foo.png"),
            }]
        );
    }

    #[test]
    fn plans_move_for_every_stack_member() {
        let (_temp, library) = create_library();
        let sidecar_path = library.sidecar_root.join("foo.yml");
        write_file(&sidecar_path, TAKEN_2016);
        let png = library.originals_root.join("foo.png");
        let jpg = library.originals_root.join("foo.jpg");
        create_file(&png);
        create_file(&jpg);

        let stacks = vec![SidecarMedia {
            sidecar_path,
            media_paths: vec![png.clone(), jpg.clone()],
        }];
        let plans = plan_moves(&library, &stacks).unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].current, png);
        assert_eq!(
            plans[0].target,
            library.originals_root.join("2016").join("01").join("foo.png")
        );
        assert_eq!(plans[1].current, jpg);
        assert_eq!(
            plans[1].target,
            library.originals_root.join("2016").join("01").join("foo.jpg")
        );
    }

    #[test]
    fn skips_file_already_in_place() {
        let (_temp, library) = create_library();
        let sidecar_path = library.sidecar_root.join("foo.yml");
        write_file(&sidecar_path, TAKEN_2016);
        let media = library.originals_root.join("2016").join("01").join("foo.png");
        create_file(&media);

        let stacks = vec![SidecarMedia {
            sidecar_path,
            media_paths: vec![media],
        }];
        let plans = plan_moves(&library, &stacks).unwrap();
        assert!(plans.is_empty());
    }

    #[test]
    fn skips_private_items() {
        let (_temp, library) = create_library();
        let sidecar_path = library.sidecar_root.join("foo.yml");
        write_file(&sidecar_path, "TakenAt: 2016-01-01T12:00:00Z\nPrivate: true\n");
        let media = library.originals_root.join("foo.png");
        create_file(&media);

        let stacks = vec![SidecarMedia {
            sidecar_path,
            media_paths: vec![media],
        }];
        let plans = plan_moves(&library, &stacks).unwrap();
        assert!(plans.is_empty());
    }

    #[test]
    fn skips_archived_items() {
        let (_temp, library) = create_library();
        let sidecar_path = library.sidecar_root.join("foo.yml");
        write_file(
            &sidecar_path,
            "TakenAt: 2016-01-01T12:00:00Z\nPrivate: false\nDeletedAt: 2020-01-01T12:00:00Z\n",
        );
        let media = library.originals_root.join("foo.png");
        create_file(&media);

        let stacks = vec![SidecarMedia {
            sidecar_path,
            media_paths: vec![media],
        }];
        let plans = plan_moves(&library, &stacks).unwrap();
        assert!(plans.is_empty());
    }

    #[test]
    fn rename_uses_timestamp_and_primary_checksum() {
        let (_temp, library) = create_library();
        let sidecar_path = library.sidecar_root.join("foo.yml");
        write_file(&sidecar_path, "TakenAt: 2016-01-01T12:00:00Z\n");
        // CRC-32C of "1" is 0x90F599E3.
        write_file(&library.originals_root.join("foo.png"), "1");

        let plans = plan_renames(&library, &[sidecar_path], false).unwrap();

        assert_eq!(
            plans,
            vec![MovePlan {
                current: library.originals_root.join("foo.png"),
                target: library.originals_root.join("20160101_120000_90F599E3.png"),
            }]
        );
    }

    #[test]
    fn rename_converges_stack_members_on_one_base_name() {
        let (_temp, library) = create_library();
        let sidecar_path = library.sidecar_root.join("foo.yml");
        write_file(&sidecar_path, "TakenAt: 2016-01-01T12:00:00Z\n");
        // The PNG is the primary, so its content decides the checksum.
        write_file(&library.originals_root.join("foo.png"), "1");
        write_file(&library.originals_root.join("foo.jpg"), "2");

        let mut plans = plan_renames(&library, &[sidecar_path], false).unwrap();
        plans.sort_by(|a, b| a.current.cmp(&b.current));

        assert_eq!(
            plans,
            vec![
                MovePlan {
                    current: library.originals_root.join("foo.jpg"),
                    target: library.originals_root.join("20160101_120000_90F599E3.jpg"),
                },
                MovePlan {
                    current: library.originals_root.join("foo.png"),
                    target: library.originals_root.join("20160101_120000_90F599E3.png"),
                },
            ]
        );
    }

    #[test]
    fn rename_keeps_burst_numbering() {
        let (_temp, library) = create_library();
        let sidecar_path = library.sidecar_root.join("foo.yml");
        write_file(&sidecar_path, "TakenAt: 2016-01-01T12:00:00Z\n");
        // Same content for both frames so the checksum does not depend on
        // which member the listing order makes primary.
        write_file(&library.originals_root.join("foo.1.png"), "1");
        write_file(&library.originals_root.join("foo.2.png"), "1");

        let mut plans = plan_renames(&library, &[sidecar_path], false).unwrap();
        plans.sort_by(|a, b| a.current.cmp(&b.current));

        assert_eq!(
            plans,
            vec![
                MovePlan {
                    current: library.originals_root.join("foo.1.png"),
                    target: library.originals_root.join("20160101_120000_90F599E3.1.png"),
                },
                MovePlan {
                    current: library.originals_root.join("foo.2.png"),
                    target: library.originals_root.join("20160101_120000_90F599E3.2.png"),
                },
            ]
        );
    }

    #[test]
    fn rename_is_idempotent_and_does_not_cross_stacks() {
        let (_temp, library) = create_library();
        let sidecar_path = library.sidecar_root.join("20160101_120000_90F599E3.yml");
        write_file(&sidecar_path, "TakenAt: 2016-01-01T12:00:00Z\n");
        write_file(&library.originals_root.join("20160101_120000_90F599E3.png"), "1");
        // A different item whose name happens to share the timestamp.
        write_file(&library.originals_root.join("20160101_120000_83A56A17.png"), "2");

        let plans = plan_renames(&library, &[sidecar_path], false).unwrap();
        assert!(plans.is_empty());
    }

    #[test]
    fn rename_skips_sidecar_without_media() {
        let (_temp, library) = create_library();
        let sidecar_path = library.sidecar_root.join("foo.yml");
        write_file(&sidecar_path, "TakenAt: 2016-01-01T12:00:00Z\n");

        let plans = plan_renames(&library, &[sidecar_path], false).unwrap();
        assert!(plans.is_empty());
    }

    #[test]
    fn stash_plans_matching_items_into_flat_folder() {
        let (_temp, library) = create_library();
        let private_sidecar = library.sidecar_root.join("foo.yml");
        write_file(&private_sidecar, "TakenAt: 2016-01-01T12:00:00Z\nPrivate: true\n");
        let public_sidecar = library.sidecar_root.join("bar.yml");
        write_file(&public_sidecar, TAKEN_2016);
        create_file(&library.originals_root.join("foo.png"));
        create_file(&library.originals_root.join("bar.png"));

        let plans = plan_stash(&library, &[private_sidecar, public_sidecar], "private", true, false).unwrap();

        assert_eq!(
            plans,
            vec![MovePlan {
                current: library.originals_root.join("foo.png"),
                target: library.originals_root.join("private").join("foo.png"),
            }]
        );
    }

    #[test]
    fn stash_skips_files_already_in_target_folder() {
        let (_temp, library) = create_library();
        let sidecar_path = library.sidecar_root.join("archived").join("foo.yml");
        write_file(
            &sidecar_path,
            "TakenAt: 2016-01-01T12:00:00Z\nDeletedAt: 2020-01-01T12:00:00Z\n",
        );
        create_file(&library.originals_root.join("archived").join("foo.png"));

        let plans = plan_stash(&library, &[sidecar_path], "archived", false, true).unwrap();
        assert!(plans.is_empty());
    }
}
