use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use walkdir::WalkDir;

use crate::runtime::ResolvedPaths;

pub const NOTE_EXTENSION: &str = "md";

/// Enumerate the target note files: `journals/*.md` first, then `pages/*.md`,
/// one directory level deep. Order within a directory is the filesystem
/// enumeration order. A missing directory contributes no files.
pub fn collect_note_files(paths: &ResolvedPaths) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for base in [&paths.journals_dir, &paths.pages_dir] {
        if !base.exists() {
            continue;
        }
        for entry in WalkDir::new(base)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
        {
            let entry = entry.with_context(|| format!("failed to walk {}", base.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(NOTE_EXTENSION) {
                continue;
            }
            validate_scoped_path(paths, path)?;
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

pub fn validate_scoped_path(paths: &ResolvedPaths, candidate: &Path) -> Result<()> {
    let absolute = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        paths.graph_root.join(candidate)
    };
    let normalized = normalize_pathbuf(&absolute);
    let allowed = [
        normalize_pathbuf(&paths.journals_dir),
        normalize_pathbuf(&paths.pages_dir),
    ];

    if allowed.iter().any(|prefix| normalized.starts_with(prefix)) {
        return Ok(());
    }

    bail!(
        "path escapes the graph note directories: {}\nallowed roots:\n  - {}\n  - {}",
        display_path(&normalized),
        display_path(&allowed[0]),
        display_path(&allowed[1])
    )
}

pub fn relative_from_root(paths: &ResolvedPaths, path: &Path) -> String {
    match path.strip_prefix(&paths.graph_root) {
        Ok(rel) => display_path(rel),
        Err(_) => display_path(path),
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn normalize_pathbuf(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Path::new(std::path::MAIN_SEPARATOR_STR)),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
