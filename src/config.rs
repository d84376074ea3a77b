use crate::cli::Cli;
use anyhow::{Result, bail};
use clap::ValueEnum;
use dirs::home_dir;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const OUTPUT_DIR_ENV: &str = "STREAMSHARE_OUTPUT_DIR";
pub const DEFAULT_STUB: &str = "endsong";
pub const DEFAULT_DATA_DIR: &str = "../data";
pub const DEFAULT_CUTOFF: f64 = 0.33;
const OUTPUT_DIR_NAME: &str = "output";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Artists,
    Albums,
    Tracks,
}

impl Group {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Artists => "artists",
            Self::Albums => "albums",
            Self::Tracks => "tracks",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Self::Artists => "artist",
            Self::Albums => "album",
            Self::Tracks => "track",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Artists => "Artist",
            Self::Albums => "Album",
            Self::Tracks => "Track",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub year: i32,
    pub stub: String,
    pub data_dir: PathBuf,
    pub group: Group,
    pub cutoff: f64,
    pub output_dir: PathBuf,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let cutoff = validate_cutoff(cli.cutoff)?;
        let data_dir = expand_home(&cli.path);
        let output_dir = std::env::var(OUTPUT_DIR_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| expand_home(&value))
            .unwrap_or_else(|| default_output_dir(&data_dir));

        Ok(Self {
            year: cli.year,
            stub: cli.stub.clone(),
            data_dir,
            group: cli.group,
            cutoff,
            output_dir,
        })
    }

    pub fn echo(&self) -> String {
        format!(
            "year={}\nstub={}\npath={}\ngroup={}\ncutoff={}",
            self.year,
            self.stub,
            self.data_dir.display(),
            self.group,
            self.cutoff
        )
    }
}

pub fn validate_cutoff(cutoff: f64) -> Result<f64> {
    if !(cutoff > 0.0 && cutoff <= 1.0) {
        bail!("cutoff must be in (0, 1], got {cutoff}");
    }

    Ok(cutoff)
}

pub fn default_output_dir(data_dir: &Path) -> PathBuf {
    data_dir
        .parent()
        .map(|parent| parent.join(OUTPUT_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(OUTPUT_DIR_NAME))
}

pub fn expand_home(raw: &str) -> PathBuf {
    raw.strip_prefix("~/")
        .and_then(|stripped| home_dir().map(|home| home.join(stripped)))
        .unwrap_or_else(|| PathBuf::from(raw))
}
