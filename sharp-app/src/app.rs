//! Application setup and dispatch with builder pattern.

use sharp_data::{ConvertOptions, TypePolicy, batch_convert, convert_ply_to_xyz};
use std::error::Error;
use std::path::{Path, PathBuf};

/// Errors raised by the application itself, before any conversion starts.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{} does not exist", .0.display())]
    InputNotFound(PathBuf),
}

/// Logging configuration.
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Builder for configuring and running a conversion.
pub struct AppBuilder {
    input: PathBuf,
    output: Option<PathBuf>,
    options: ConvertOptions,
    logging: LoggingConfig,
}

impl AppBuilder {
    /// Create a new AppBuilder for `input` with default settings.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            options: ConvertOptions::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Set the output file (single input) or directory (directory input).
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Suppress progress output; only warnings and errors are logged.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.options.verbose = !quiet;
        if quiet {
            self.logging.level = "warn".to_string();
        }
        self
    }

    /// Set how unknown property types are handled.
    pub fn with_type_policy(mut self, policy: TypePolicy) -> Self {
        self.options.type_policy = policy;
        self
    }

    /// Initialize logging and run the conversion. Returns the written paths.
    pub fn run(self) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        self.init_logging();
        convert_input(&self.input, self.output.as_deref(), &self.options)
    }

    fn init_logging(&self) {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&self.logging.level)),
            )
            .with_target(false)
            .init();
    }
}

/// Convert a directory in batch or a single file, depending on what `input` is.
pub fn convert_input(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    if input.is_dir() {
        Ok(batch_convert(input, output, options)?)
    } else if input.is_file() {
        Ok(vec![convert_ply_to_xyz(input, output, options)?])
    } else {
        Err(AppError::InputNotFound(input.to_path_buf()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_cloud(path: &Path) {
        let mut data = b"ply\nformat binary_little_endian 1.0\nelement vertex 1\n\
            property float x\nproperty float y\nproperty float z\nend_header\n"
            .to_vec();
        for v in [1.0f32, 2.0, 3.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        fs::write(path, data).unwrap();
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.ply");
        let err = convert_input(&missing, None, &ConvertOptions::quiet()).unwrap_err();
        assert_eq!(err.to_string(), format!("{} does not exist", missing.display()));
    }

    #[test]
    fn test_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cloud.ply");
        write_cloud(&input);

        let outputs = convert_input(&input, None, &ConvertOptions::quiet()).unwrap();
        assert_eq!(outputs, vec![dir.path().join("cloud.xyz")]);
        assert_eq!(
            fs::read_to_string(&outputs[0]).unwrap(),
            "1.0 2.0 3.0 128 128 128\n"
        );
    }

    #[test]
    fn test_directory_with_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_cloud(&dir.path().join("a.ply"));
        write_cloud(&dir.path().join("b.ply"));
        let out = dir.path().join("out");

        let outputs =
            convert_input(dir.path(), Some(out.as_path()), &ConvertOptions::quiet()).unwrap();
        assert_eq!(outputs, vec![out.join("a.xyz"), out.join("b.xyz")]);
    }

    #[test]
    fn test_builder_settings() {
        let builder = AppBuilder::new("scan.ply")
            .with_output("scan.xyz")
            .with_quiet(true)
            .with_type_policy(TypePolicy::Lenient);
        assert_eq!(builder.output, Some(PathBuf::from("scan.xyz")));
        assert!(!builder.options.verbose);
        assert_eq!(builder.options.type_policy, TypePolicy::Lenient);
        assert_eq!(builder.logging.level, "warn");
    }
}
