//! Launcher settings. Everything comes from the command line; no environment
//! variables are consulted.
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "flat-rate-tracker", version, about = "Log and total flat rate hours")]
pub struct Settings {
    /// SQLite file holding the entry snapshot
    #[arg(long, default_value = "flat_rate_hours.db")]
    pub db: PathBuf,

    /// Directory exports are written to
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Log file (stdout belongs to the terminal UI)
    #[arg(long, default_value = "flat_rate_hours.log")]
    pub log_file: PathBuf,

    /// Log filter directive, e.g. `info` or `flat_rate_tracker=debug`
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::parse_from(["flat-rate-tracker"]);
        assert_eq!(settings.db, PathBuf::from("flat_rate_hours.db"));
        assert_eq!(settings.export_dir, PathBuf::from("."));
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::parse_from([
            "flat-rate-tracker",
            "--db",
            "/tmp/x.db",
            "--export-dir",
            "/tmp/out",
            "--log-level",
            "debug",
        ]);
        assert_eq!(settings.db, PathBuf::from("/tmp/x.db"));
        assert_eq!(settings.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(settings.log_level, "debug");
    }
}
