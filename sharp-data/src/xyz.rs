//! XYZ point cloud output.
//!
//! One point per line: `x y z r g b`.

use crate::error::Result;
use crate::types::Point;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Write `points` as XYZ lines. Returns the number of lines written.
///
/// With `progress_interval`, a progress line is logged every that many points;
/// `total` is only used for that message.
pub fn write_points<W, I>(
    points: I,
    writer: &mut W,
    total: usize,
    progress_interval: Option<usize>,
) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Point>,
{
    let mut written = 0;
    for point in points {
        writeln!(writer, "{point}")?;
        written += 1;

        if let Some(interval) = progress_interval {
            if interval > 0 && written % interval == 0 {
                info!("  Processed {}/{} vertices...", written, total);
            }
        }
    }
    Ok(written)
}

/// Create `path` through a temporary file in the same directory.
///
/// `write` fills the file; only if it succeeds is the temporary renamed over
/// `path`, replacing any existing file. On error the temporary is removed and
/// `path` is left untouched.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }

    // Temporary files are created owner-only; outputs should look like any other file.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }

    debug!("Moving {} into place", tmp.path().display());
    tmp.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlyError;
    use crate::types::ScalarValue;
    use std::sync::{Arc, Mutex};

    fn point(x: f64, color: u8) -> Point {
        Point::new(
            [
                ScalarValue::Float(x),
                ScalarValue::Float(0.5),
                ScalarValue::Int(-1),
            ],
            [color; 3],
        )
    }

    #[test]
    fn test_write_points() {
        let mut out = Vec::new();
        let n = write_points([point(1.0, 0), point(2.25, 255)], &mut out, 2, None).unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1.0 0.5 -1 0 0 0\n2.25 0.5 -1 255 255 255\n"
        );
    }

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a subscriber that records formatted events, and return them.
    fn capture_logs(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_write_points_with_progress() {
        let mut out = Vec::new();
        let logs = capture_logs(|| {
            let points = (0..5).map(|i| point(i as f64, 1));
            let n = write_points(points, &mut out, 5, Some(2)).unwrap();
            assert_eq!(n, 5);
        });

        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 5);
        let progress: Vec<&str> = logs.lines().filter(|l| l.contains("Processed")).collect();
        assert_eq!(progress.len(), 2, "{logs}");
        assert!(progress[0].ends_with("Processed 2/5 vertices..."), "{logs}");
        assert!(progress[1].ends_with("Processed 4/5 vertices..."), "{logs}");
    }

    #[test]
    fn test_write_points_without_progress_is_silent() {
        let mut out = Vec::new();
        let logs = capture_logs(|| {
            let points = (0..5).map(|i| point(i as f64, 1));
            write_points(points, &mut out, 5, None).unwrap();
        });
        assert!(!logs.contains("Processed"), "{logs}");
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.xyz");
        std::fs::write(&path, "old contents\n").unwrap();

        write_atomically(&path, |w| {
            write_points([point(3.0, 10)], w, 1, None)?;
            Ok(())
        })
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "3.0 0.5 -1 10 10 10\n"
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_atomic_write_failure_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.xyz");

        let result = write_atomically(&path, |w| {
            write_points([point(3.0, 10)], w, 1, None)?;
            Err(PlyError::MissingVertexElement)
        });

        assert!(result.is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
