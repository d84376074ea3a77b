use crate::config::{DEFAULT_CUTOFF, DEFAULT_DATA_DIR, DEFAULT_STUB, Group};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "streamshare",
    about = "Yearly listening share of your top artists, albums and tracks"
)]
pub struct Cli {
    /// The year of data to plot
    pub year: i32,

    /// Beginning of the file name of the data to load (endsong or StreamingHistory)
    #[arg(short, long, default_value = DEFAULT_STUB)]
    pub stub: String,

    /// Directory holding the exported JSON files
    #[arg(short, long, default_value = DEFAULT_DATA_DIR)]
    pub path: String,

    /// Data to plot
    #[arg(short, long, value_enum, default_value_t = Group::Artists)]
    pub group: Group,

    /// Minimum share (between 0 and 1) of the top entity's minutes to plot
    #[arg(short, long, default_value_t = DEFAULT_CUTOFF)]
    pub cutoff: f64,
}
