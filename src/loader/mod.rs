pub mod record;

use crate::config::Group;
use crate::error::LoadError;
use crate::loader::record::{ExportFormat, Field, PlayEvent, RawRecord, present_fields};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub fn load_streaming_history(
    dir: &Path,
    stub: &str,
    group: Group,
) -> Result<Vec<PlayEvent>, LoadError> {
    let files = find_export_files(dir, stub)?;
    let format = ExportFormat::from_stub(stub);

    let records = files
        .iter()
        .map(|path| read_export_file(path))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    let present = records
        .iter()
        .flat_map(|record| present_fields(format, record))
        .collect::<BTreeSet<_>>();
    ensure_required_fields(&present, group)?;

    let events = records
        .iter()
        .map(|record| PlayEvent::from_record(format, record))
        .collect::<Vec<_>>();

    info!(
        files = files.len(),
        events = events.len(),
        export = ?format,
        "streaming history loaded"
    );

    Ok(events)
}

pub fn find_export_files(dir: &Path, stub: &str) -> Result<Vec<PathBuf>, LoadError> {
    let not_found = || LoadError::InputNotFound {
        dir: dir.to_path_buf(),
        stub: stub.to_string(),
    };

    let mut files = fs::read_dir(dir)
        .map_err(|_| not_found())?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_str()?;

            (path.is_file() && name.starts_with(stub) && name.ends_with(".json"))
                .then(|| path.clone())
        })
        .collect::<Vec<_>>();

    if files.is_empty() {
        return Err(not_found());
    }

    files.sort();
    Ok(files)
}

fn read_export_file(path: &Path) -> Result<Vec<RawRecord>, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records: Vec<RawRecord> =
        serde_json::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), records = records.len(), "export file parsed");
    Ok(records)
}

fn ensure_required_fields(present: &BTreeSet<Field>, group: Group) -> Result<(), LoadError> {
    let missing = [
        Field::EndTime,
        Field::MsPlayed,
        Field::Artist,
        Field::Track,
        Field::for_group(group),
    ]
    .into_iter()
    .collect::<BTreeSet<_>>()
    .into_iter()
    .filter(|field| !present.contains(field))
    .map(Field::name)
    .collect::<Vec<_>>();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::Schema { missing })
    }
}
