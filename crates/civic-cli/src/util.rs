use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::NaiveDate;
use civic_analysis::complaint::ComplaintCollection;
use serde::Serialize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Where a command writes its result: a file, or stdout without a path.
pub struct Output {
    writer: Box<dyn Write>,
    path: Option<PathBuf>,
}

impl Output {
    pub fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let writer: Box<dyn Write> = match path {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file: {}", path.display()))?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(io::stdout().lock()),
        };
        Ok(Self {
            writer,
            path: path.map(Path::to_path_buf),
        })
    }

    fn destination(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| "stdout".to_owned(), |path| path.display().to_string())
    }

    /// Pretty-printed JSON followed by a newline.
    pub fn write_json<T>(mut self, value: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        serde_json::to_writer_pretty(&mut self.writer, value)
            .with_context(|| format!("Failed to write JSON to {}", self.destination()))?;
        self.write_text("\n")
    }

    pub fn write_text(mut self, text: &str) -> anyhow::Result<()> {
        self.writer
            .write_all(text.as_bytes())
            .and_then(|()| self.writer.flush())
            .with_context(|| format!("Failed to write to {}", self.destination()))?;
        if let Some(path) = &self.path {
            tracing::info!(path = %path.display(), "output saved");
        }
        Ok(())
    }
}

pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    Output::create(path)?.write_json(value)
}

pub fn save_text(text: &str, path: Option<&Path>) -> anyhow::Result<()> {
    Output::create(path)?.write_text(text)
}

/// Read a complaint collection from a JSON file
///
/// The collection's cutoff date is replaced by `cutoff` when given.
///
/// # Errors
///
/// Returns error if file cannot be opened or parsed
pub fn read_complaints_file(
    path: &Path,
    cutoff: Option<NaiveDate>,
) -> anyhow::Result<ComplaintCollection> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open complaints file: {}", path.display()))?;
    let collection = serde_json::from_reader::<_, ComplaintCollection>(BufReader::new(file))
        .with_context(|| format!("Failed to parse complaints JSON file: {}", path.display()))?
        .with_cutoff(cutoff);

    tracing::info!(
        path = %path.display(),
        complaints = collection.complaints.len(),
        cutoff = %collection.cutoff,
        "loaded complaint collection"
    );
    Ok(collection)
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` takes precedence over the default level.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}

/// One decimal place, `N/A` when undefined.
pub fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_owned(), |value| format!("{value:.1}"))
}

/// Percentage with one decimal place, `N/A` when undefined.
pub fn fmt_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_owned(), |value| format!("{value:.1}%"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("civic-cli-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_formatting_undefined_values() {
        assert_eq!(fmt_opt(Some(12.345)), "12.3");
        assert_eq!(fmt_opt(None), "N/A");
        assert_eq!(fmt_percent(Some(50.0)), "50.0%");
        assert_eq!(fmt_percent(None), "N/A");
    }

    #[test]
    fn test_save_json_to_file() {
        let path = temp_path("value.json");
        save_json(&serde_json::json!({ "median": null }), Some(path.as_path())).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(written, "{\n  \"median\": null\n}\n");
    }

    #[test]
    fn test_read_complaints_with_cutoff_override() {
        let path = temp_path("complaints.json");
        save_text(
            r#"{"cutoff": "2014-07-13", "complaints": [{"csr": 1, "date_received": "2014-01-01"}]}"#,
            Some(path.as_path()),
        )
        .unwrap();

        let collection = read_complaints_file(&path, None).unwrap();
        assert_eq!(collection.complaints.len(), 1);
        assert_eq!(collection.cutoff, NaiveDate::from_ymd_opt(2014, 7, 13).unwrap());

        let overridden = NaiveDate::from_ymd_opt(2015, 1, 1);
        let collection = read_complaints_file(&path, overridden).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(Some(collection.cutoff), overridden);

        assert!(read_complaints_file(&path, None).is_err());
    }
}
