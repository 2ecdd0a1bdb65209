//! Format readers: one module per on-disk encoding, unified behind [`read_table`].
//!
//! Every reader takes a byte source (or, for columnar, a path) and a [`TableConfig`] and
//! returns the table's rows. Chunking of those rows for the streaming executors lives in
//! [`crate::reader`]; this module only knows how to turn bytes into [`Row`]s.

pub mod columnar;
pub mod delimited;
pub mod document_list;
pub mod object_array;
pub mod object_stream;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use flate2::read::GzDecoder;

use crate::config::{Format, TableConfig};
use crate::error::EngineError;
use crate::row::Row;

/// Opens `config.file_path`, applying transparent gzip decompression when the path ends in
/// `.gz`, and decodes it with the reader matching `config.format`.
///
/// Columnar files are opened by path directly (Parquet requires random access) rather than
/// funneled through the gzip/buffered-reader path used by every other format.
///
/// # Errors
///
/// Returns [`EngineError::Io`] on a file-system failure and format-specific parse errors
/// otherwise.
pub fn read_table(config: &TableConfig) -> Result<Vec<Row>, EngineError> {
    let path = Path::new(&config.file_path);

    if config.format == Format::Columnar {
        return columnar::read_rows(path, config);
    }

    let file = File::open(path)?;
    if config.is_gzipped() {
        let decoder = BufReader::new(GzDecoder::new(file));
        read_decoded(decoder, config)
    } else {
        read_decoded(BufReader::new(file), config)
    }
}

fn read_decoded(reader: impl std::io::BufRead, config: &TableConfig) -> Result<Vec<Row>, EngineError> {
    match config.format {
        Format::Delimited => delimited::read_rows(reader, config),
        Format::ObjectArray => object_array::read_rows(reader, config),
        Format::ObjectStream => object_stream::read_rows(reader, config),
        Format::DocumentList => document_list::read_rows(reader, config),
        Format::Columnar => unreachable!("columnar files are opened by path in read_table"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_for(path: &str, format: Format) -> TableConfig {
        TableConfig {
            name: "t".to_string(),
            file_path: path.to_string(),
            format,
            delimiter: ",".to_string(),
            has_header: true,
            columns: Vec::new(),
            quote: "\"".to_string(),
            escape: "\\".to_string(),
            max_columns: 0,
            trim_spaces: true,
            allow_quoted: true,
            strict_quotes: false,
            skip_empty_lines: true,
            parallel_reading: false,
            worker_threads: 0,
            chunk_size: 0,
            buffer_size: 0,
        }
    }

    #[test]
    fn test_read_table_dispatches_delimited() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "id,name").unwrap();
        writeln!(file, "1,Ada").unwrap();
        let config = config_for(file.path().to_str().unwrap(), Format::Delimited);
        let rows = read_table(&config).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&Value::Text("Ada".to_string())));
    }

    #[test]
    fn test_read_table_dispatches_object_stream() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{\"id\":1}}").unwrap();
        let config = config_for(file.path().to_str().unwrap(), Format::ObjectStream);
        let rows = read_table(&config).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_read_table_decompresses_gzip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let file = NamedTempFile::new().unwrap();
        let path = format!("{}.csv.gz", file.path().to_str().unwrap());
        {
            let out = File::create(&path).unwrap();
            let mut encoder = GzEncoder::new(out, Compression::default());
            encoder.write_all(b"id,name\n1,Ada\n").unwrap();
            encoder.finish().unwrap();
        }
        let mut config = config_for(&path, Format::Delimited);
        config.file_path = path.clone();
        let rows = read_table(&config).unwrap();
        assert_eq!(rows.len(), 1);
        std::fs::remove_file(&path).ok();
    }
}
