//! Presentation of command results as a table, JSON lines or CSV.

use csv_core::WriteResult;
use std::path::PathBuf;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Table,
    Jsonl,
    Csv,
}

#[derive(clap::Parser, Clone, Debug)]
#[group(id = "output::Args")]
pub struct Args {
    /// Write the results to this file instead of the standard output.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
    #[arg(long, short = 'f', value_enum, default_value_t = Format::Table)]
    format: Format,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not open the specified output file at {1:?}")]
    OpenOutputFile(#[source] std::io::Error, PathBuf),
    #[error("could not write results to the output file at {1:?}")]
    WriteFile(#[source] std::io::Error, PathBuf),
    #[error("could not write results to the terminal")]
    WriteStdout(#[source] std::io::Error),
    #[error("could not serialize a result to JSON")]
    SerializeJson(#[source] serde_json::Error),
}

impl Args {
    pub fn to_output(self) -> Result<Output, Error> {
        let io: Box<dyn std::io::Write> = match &self.output {
            None => Box::new(std::io::stdout().lock()),
            Some(path) => Box::new(
                std::fs::OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)
                    .map_err(|e| Error::OpenOutputFile(e, path.clone()))?,
            ),
        };
        Ok(Output::new(self.format, io, self.output))
    }
}

pub struct Output {
    path: Option<PathBuf>,
    io: Box<dyn std::io::Write>,
    formatter: Formatter,
}

enum Formatter {
    Table { comfy: comfy_table::Table, headers: Vec<&'static str> },
    Jsonl,
    Csv { writer: csv_core::Writer, buffer: Vec<u8> },
}

impl Output {
    pub fn new(format: Format, io: Box<dyn std::io::Write>, path: Option<PathBuf>) -> Self {
        let formatter = match format {
            Format::Table => Formatter::Table { comfy: new_table(), headers: Vec::new() },
            Format::Jsonl => Formatter::Jsonl,
            Format::Csv => Formatter::Csv { writer: csv_core::Writer::new(), buffer: vec![0; 256] },
        };
        Self { path, io, formatter }
    }

    /// Set the column names. Must be called before any results are produced.
    pub fn headers(&mut self, headers: &[&'static str]) -> Result<(), Error> {
        match &mut self.formatter {
            Formatter::Table { comfy, headers: stored } => {
                *stored = headers.to_vec();
                comfy.set_header(headers.to_vec());
                Ok(())
            }
            Formatter::Jsonl => Ok(()),
            Formatter::Csv { .. } => self.csv_row(headers),
        }
    }

    /// Output a single result.
    ///
    /// `row` produces the cells for the table and CSV formats, `record` the object for JSON.
    pub fn result<R: serde::Serialize>(
        &mut self,
        row: impl FnOnce() -> Vec<String>,
        record: impl FnOnce() -> R,
    ) -> Result<(), Error> {
        match &mut self.formatter {
            Formatter::Table { comfy, .. } => {
                comfy.add_row(row());
                Ok(())
            }
            Formatter::Csv { .. } => self.csv_row(&row()),
            Formatter::Jsonl => {
                serde_json::to_writer(&mut self.io, &record()).map_err(Error::SerializeJson)?;
                writeln!(self.io).map_err(|e| self.write_error(e))
            }
        }
    }

    fn csv_row<V: AsRef<str>>(&mut self, values: &[V]) -> Result<(), Error> {
        let Formatter::Csv { writer, buffer } = &mut self.formatter else {
            return Ok(());
        };
        let mut line = Vec::new();
        for (i, value) in values.iter().enumerate() {
            if i != 0 {
                csv_drive(buffer, &mut line, |out| writer.delimiter(out));
            }
            let mut input = value.as_ref().as_bytes();
            csv_drive(buffer, &mut line, |out| {
                let (result, read, written) = writer.field(input, out);
                input = &input[read..];
                (result, written)
            });
        }
        csv_drive(buffer, &mut line, |out| writer.terminator(out));
        self.io.write_all(&line).map_err(|e| self.write_error(e))
    }

    fn write_error(&self, e: std::io::Error) -> Error {
        match &self.path {
            None => Error::WriteStdout(e),
            Some(p) => Error::WriteFile(e, p.clone()),
        }
    }

    /// Write out the results produced so far and keep going.
    ///
    /// Tables are only rendered once complete, so the following results start a new table.
    pub fn checkpoint(&mut self) -> Result<(), Error> {
        if let Formatter::Table { comfy, headers } = &mut self.formatter {
            let mut table = new_table();
            table.set_header(headers.clone());
            let complete = std::mem::replace(comfy, table);
            writeln!(self.io, "{complete}").map_err(|e| self.write_error(e))?;
        }
        self.io.flush().map_err(|e| self.write_error(e))
    }

    pub fn commit(mut self) -> Result<(), Error> {
        if let Formatter::Table { comfy, .. } = &self.formatter {
            if comfy.row_iter().next().is_some() {
                writeln!(self.io, "{comfy}").map_err(|e| self.write_error(e))?;
            }
        }
        self.io.flush().map_err(|e| self.write_error(e))
    }
}

fn new_table() -> comfy_table::Table {
    let mut comfy = comfy_table::Table::new();
    comfy.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    comfy
}

/// Repeat a `csv_core` write step until it is done, growing `buffer` whenever it is too small.
fn csv_drive(
    buffer: &mut Vec<u8>,
    line: &mut Vec<u8>,
    mut step: impl FnMut(&mut [u8]) -> (WriteResult, usize),
) {
    loop {
        let (result, written) = step(buffer);
        line.extend_from_slice(&buffer[..written]);
        match result {
            WriteResult::InputEmpty => return,
            WriteResult::OutputFull => {
                let new_len = buffer.len() * 2;
                buffer.resize(new_len, 0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Shared {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn render(format: Format) -> String {
        let shared = Shared::default();
        let mut output = Output::new(format, Box::new(shared.clone()), None);
        output.headers(&["Name", "Value"]).unwrap();
        output
            .result(
                || vec!["SENSOR_OAT".into(), "-5".into()],
                || serde_json::json!({"name": "SENSOR_OAT", "value": -5.0}),
            )
            .unwrap();
        output
            .result(
                || vec!["TC_SP".into(), "quoted, \"text\"".into()],
                || serde_json::json!({"name": "TC_SP", "value": 21.0}),
            )
            .unwrap();
        output.commit().unwrap();
        let bytes = shared.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn csv_quotes_fields_when_necessary() {
        assert_eq!(
            render(Format::Csv),
            "Name,Value\nSENSOR_OAT,-5\nTC_SP,\"quoted, \"\"text\"\"\"\n"
        );
    }

    #[test]
    fn jsonl_is_one_object_per_line() {
        let text = render(Format::Jsonl);
        let lines: Vec<serde_json::Value> =
            text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["name"], "TC_SP");
    }

    #[test]
    fn table_includes_headers_and_rows() {
        let text = render(Format::Table);
        assert!(text.contains("Name") && text.contains("SENSOR_OAT") && text.contains("TC_SP"));
    }
}
