//! Single-file and directory conversion from PLY to XYZ.

use crate::error::Result;
use crate::ply::{TypePolicy, VertexDecoder, parse_header};
use crate::xyz::{write_atomically, write_points};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Points between progress messages in verbose mode.
pub const PROGRESS_INTERVAL: usize = 200_000;

/// Extension given to converted files.
pub const XYZ_EXTENSION: &str = "xyz";

/// Extension of files picked up by [`batch_convert`].
pub const PLY_EXTENSION: &str = "ply";

/// Conversion settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Log progress at info level.
    pub verbose: bool,
    /// Handling of unknown property types in the header.
    pub type_policy: TypePolicy,
    pub progress_interval: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            verbose: true,
            type_policy: TypePolicy::Strict,
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

impl ConvertOptions {
    /// Default options without progress output.
    pub fn quiet() -> Self {
        Self {
            verbose: false,
            ..Self::default()
        }
    }
}

/// `input` with its extension replaced by `.xyz`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension(XYZ_EXTENSION)
}

/// Convert one PLY file. Returns the path that was written.
///
/// `output` defaults to [`default_output_path`]. An existing file at the
/// output path is replaced; on failure nothing is written.
#[tracing::instrument(skip_all, fields(path = %input.display()))]
pub fn convert_ply_to_xyz(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
) -> Result<PathBuf> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));
    let verbose = options.verbose;

    if verbose {
        info!("Reading: {}", input.display());
    }

    let metadata = parse_header(input, options.type_policy)?;
    let decoder = VertexDecoder::new(&metadata)?;

    if verbose {
        info!("Vertex count: {}", decoder.count());
        info!("Properties: {}", decoder.property_count());
    }

    let payload = decoder.read_payload(input)?;
    let points = decoder.points(&payload)?;

    if verbose {
        info!("Has color data: {}", decoder.has_color());
        info!("Writing: {}", output.display());
    }

    let progress = verbose.then_some(options.progress_interval);
    write_atomically(&output, |writer| {
        write_points(points, writer, decoder.count(), progress)?;
        Ok(())
    })?;

    if verbose {
        info!("Done! Output: {}", output.display());
    }

    Ok(output)
}

/// Convert every `*.ply` file directly inside `input_dir`.
///
/// Outputs go to `output_dir` (default: `input_dir`, created if missing) as
/// `<stem>.xyz`. Files are processed in file-name order and the first failure
/// aborts the batch.
#[tracing::instrument(skip_all, fields(path = %input_dir.display()))]
pub fn batch_convert(
    input_dir: &Path,
    output_dir: Option<&Path>,
    options: &ConvertOptions,
) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.unwrap_or(input_dir);
    fs::create_dir_all(output_dir)?;

    let ply_files = find_ply_files(input_dir)?;
    if options.verbose {
        info!("Found {} PLY files", ply_files.len());
    }

    let mut outputs = Vec::with_capacity(ply_files.len());
    for (i, ply_file) in ply_files.iter().enumerate() {
        let Some(name) = ply_file.file_name() else {
            continue;
        };
        if options.verbose {
            info!(
                "[{}/{}] Processing {}",
                i + 1,
                ply_files.len(),
                name.to_string_lossy()
            );
        }

        let output = default_output_path(&output_dir.join(name));
        outputs.push(convert_ply_to_xyz(ply_file, Some(output.as_path()), options)?);
    }

    Ok(outputs)
}

/// Files in `dir` (not recursive) whose extension is exactly `ply`, sorted.
///
/// Symlinks are followed, so a link to a regular file counts as one.
pub fn find_ply_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == PLY_EXTENSION) && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("scenes/room.ply")),
            PathBuf::from("scenes/room.xyz")
        );
        assert_eq!(
            default_output_path(Path::new("a.b.ply")),
            PathBuf::from("a.b.xyz")
        );
        assert_eq!(default_output_path(Path::new("cloud")), PathBuf::from("cloud.xyz"));
    }

    #[test]
    fn test_find_ply_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.ply", "a.ply", "notes.txt", "c.PLY", "ply"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.ply")).unwrap();

        let files = find_ply_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.ply", "b.ply"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_find_ply_files_follows_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("cloud.bin");
        fs::write(&target, b"").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("linked.ply")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling.ply"))
            .unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("sub"), dir.path().join("dir.ply")).unwrap();

        let files = find_ply_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("linked.ply")]);
    }

    #[test]
    fn test_quiet_options() {
        let options = ConvertOptions::quiet();
        assert!(!options.verbose);
        assert_eq!(options.type_policy, TypePolicy::Strict);
        assert_eq!(options.progress_interval, PROGRESS_INTERVAL);
    }
}
