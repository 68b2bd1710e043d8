//! CSV sources for screening lists and the ownership graph

use crate::error::{LoaderError, Result};
use compliance_engine::OwnershipGraph;
use csv::Reader;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

// Fold a csv error into the loader's error type, surfacing I/O problems
// (typically a missing file) as their own variant.
fn csv_error(path: &Path, err: csv::Error) -> LoaderError {
    let display = path.display().to_string();
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => LoaderError::Io {
            path: display,
            source: io,
        },
        _ => LoaderError::Csv {
            path: display,
            message,
        },
    }
}

fn open(path: &Path) -> Result<Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| csv_error(path, err))
}

fn column_index(
    reader: &mut Reader<std::fs::File>,
    path: &Path,
    names: &[&'static str],
) -> Result<usize> {
    let headers = reader.headers().map_err(|err| csv_error(path, err))?;
    for name in names {
        if let Some(index) = headers.iter().position(|h| h == *name) {
            return Ok(index);
        }
    }
    Err(LoaderError::MissingColumn {
        path: path.display().to_string(),
        column: names[0],
    })
}

fn collect_column(path: &Path, names: &[&'static str]) -> Result<HashSet<String>> {
    let mut reader = open(path)?;
    let index = column_index(&mut reader, path, names)?;
    let mut ids = HashSet::new();
    for record in reader.records() {
        let record = record.map_err(|err| csv_error(path, err))?;
        if let Some(value) = record.get(index) {
            if !value.is_empty() {
                ids.insert(value.to_string());
            }
        }
    }
    Ok(ids)
}

/// Load the PEP list: a CSV with a `customer_id` column.
pub fn load_pep_list(path: impl AsRef<Path>) -> Result<HashSet<String>> {
    let path = path.as_ref();
    let ids = collect_column(path, &["customer_id"])?;
    info!(path = %path.display(), entries = ids.len(), "loaded PEP list");
    Ok(ids)
}

/// Load the OFAC list: a CSV with an `account` column, falling back to
/// `entity_name` for feeds keyed by entity.
pub fn load_ofac_list(path: impl AsRef<Path>) -> Result<HashSet<String>> {
    let path = path.as_ref();
    let ids = collect_column(path, &["account", "entity_name"])?;
    info!(path = %path.display(), entries = ids.len(), "loaded OFAC list");
    Ok(ids)
}

/// Load the ownership graph: a CSV of `parent_id,child_id` edges
/// (`parent`/`child` headers are accepted as well).
pub fn load_ownership_graph(path: impl AsRef<Path>) -> Result<OwnershipGraph> {
    let path = path.as_ref();
    let mut reader = open(path)?;
    let parent_index = column_index(&mut reader, path, &["parent_id", "parent"])?;
    let child_index = column_index(&mut reader, path, &["child_id", "child"])?;

    let mut graph = OwnershipGraph::new();
    for record in reader.records() {
        let record = record.map_err(|err| csv_error(path, err))?;
        if let (Some(parent), Some(child)) = (record.get(parent_index), record.get(child_index)) {
            if !parent.is_empty() && !child.is_empty() {
                graph.insert_edge(parent, child);
            }
        }
    }
    info!(path = %path.display(), parents = graph.parent_count(), "loaded ownership graph");
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_pep_list() {
        let file = csv_file("customer_id,name\nC1,Alice\nC2,Bob\n,Empty\n");
        let ids = load_pep_list(file.path()).unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("C1") && ids.contains("C2"));
    }

    #[test]
    fn test_load_ofac_list_falls_back_to_entity_name() {
        let file = csv_file("entity_name\nShell Holdings\n");
        let ids = load_ofac_list(file.path()).unwrap();
        assert!(ids.contains("Shell Holdings"));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let file = csv_file("something_else\nX\n");
        let err = load_pep_list(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn { column: "customer_id", .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_pep_list("definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }

    #[test]
    fn test_load_ownership_graph() {
        let file = csv_file("parent_id,child_id\nHOLDCO,C1\nHOLDCO,C2\nPARENT2,C1\n");
        let graph = load_ownership_graph(file.path()).unwrap();
        assert_eq!(graph.parent_count(), 2);
        let index = graph.reverse_index();
        assert_eq!(index.parents_of("C1").len(), 2);
    }
}
