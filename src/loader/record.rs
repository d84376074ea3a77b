use crate::config::Group;
use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};

pub type RawRecord = Map<String, Value>;

const LEGACY_PREFIX: &str = "streaminghistory";
const NAIVE_TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Extended,
    Legacy,
}

impl ExportFormat {
    pub fn from_stub(stub: &str) -> Self {
        if stub.to_lowercase().starts_with(LEGACY_PREFIX) {
            Self::Legacy
        } else {
            Self::Extended
        }
    }

    fn source_keys(self, field: Field) -> &'static [&'static str] {
        match (self, field) {
            (Self::Extended, Field::EndTime) => &["ts"],
            (Self::Extended, Field::MsPlayed) => &["ms_played"],
            (Self::Extended, Field::Artist) => &["master_metadata_album_artist_name"],
            (Self::Extended, Field::Album) => &[
                "master_metadata_album_album_name",
                "master_metadata_album_name",
            ],
            (Self::Extended, Field::Track) => &["master_metadata_track_name"],
            (Self::Legacy, Field::EndTime) => &["endTime"],
            (Self::Legacy, Field::MsPlayed) => &["msPlayed"],
            (Self::Legacy, Field::Artist) => &["artistName"],
            (Self::Legacy, Field::Album) => &["albumName"],
            (Self::Legacy, Field::Track) => &["trackName"],
        }
    }

    fn lookup<'a>(self, record: &'a RawRecord, field: Field) -> Option<&'a Value> {
        self.source_keys(field)
            .iter()
            .find_map(|key| record.get(*key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    EndTime,
    MsPlayed,
    Artist,
    Album,
    Track,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::EndTime,
        Field::MsPlayed,
        Field::Artist,
        Field::Album,
        Field::Track,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::EndTime => "end_time",
            Self::MsPlayed => "ms_played",
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Track => "track",
        }
    }

    pub fn for_group(group: Group) -> Self {
        match group {
            Group::Artists => Self::Artist,
            Group::Albums => Self::Album,
            Group::Tracks => Self::Track,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    pub end_time: Option<NaiveDateTime>,
    pub ms_played: f64,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track: Option<String>,
}

impl PlayEvent {
    pub fn from_record(format: ExportFormat, record: &RawRecord) -> Self {
        let text = |field| {
            format
                .lookup(record, field)
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
        };

        Self {
            end_time: format
                .lookup(record, Field::EndTime)
                .and_then(Value::as_str)
                .and_then(parse_timestamp),
            ms_played: format
                .lookup(record, Field::MsPlayed)
                .and_then(Value::as_f64)
                .unwrap_or_default(),
            artist: text(Field::Artist),
            album: text(Field::Album),
            track: text(Field::Track),
        }
    }

    pub fn entity(&self, group: Group) -> Option<&str> {
        match group {
            Group::Artists => self.artist.as_deref(),
            Group::Albums => self.album.as_deref(),
            Group::Tracks => self.track.as_deref(),
        }
    }

    pub fn minutes_played(&self) -> f64 {
        self.ms_played / 1000.0 / 60.0
    }
}

pub fn present_fields(
    format: ExportFormat,
    record: &RawRecord,
) -> impl Iterator<Item = Field> + '_ {
    Field::ALL
        .into_iter()
        .filter(move |field| format.lookup(record, *field).is_some())
}

// Offsets are not applied: the wall-clock time as written is kept.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.naive_local())
        .ok()
        .or_else(|| {
            NAIVE_TIMESTAMP_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        })
}
