//! Shared fixtures for integration tests
//!
//! `FakeCodec` treats a point cloud as a text file: the first line is the header, every
//! following line is one point. A line reading `!corrupt` makes the reader fail when it
//! reaches it.

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use lazconv::services::{BlockReader, BlockWriter, CodecError, PointCodec};
use lazconv::{Converter, RunConfig, RunCounters, RunEvent};
use std::collections::{HashMap, VecDeque};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::sync::Mutex;
use std::sync::mpsc;
use tempfile::TempDir;

pub const CORRUPT_MARKER: &str = "!corrupt";

#[derive(Default)]
pub struct FakeCodec {
    writes: Mutex<Vec<(Utf8PathBuf, bool)>>,
    gates: Mutex<HashMap<String, mpsc::Receiver<()>>>,
}

impl FakeCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block `open_reader` for the file named `file_name` until the returned sender
    /// fires (or is dropped).
    pub fn gate(&self, file_name: &str) -> mpsc::Sender<()> {
        let (tx, rx) = mpsc::channel();
        self.gates
            .lock()
            .unwrap()
            .insert(file_name.to_string(), rx);
        tx
    }

    /// Every destination opened for writing, with its compression flag.
    pub fn writes(&self) -> Vec<(Utf8PathBuf, bool)> {
        self.writes.lock().unwrap().clone()
    }
}

pub struct FakeReader {
    header: String,
    points: VecDeque<String>,
}

impl BlockReader for FakeReader {
    type Header = String;
    type Point = String;

    fn header(&self) -> &String {
        &self.header
    }

    fn read_block(&mut self, max_points: usize, block: &mut Vec<String>) -> Result<usize, CodecError> {
        let mut read = 0;
        while read < max_points {
            match self.points.pop_front() {
                Some(point) if point == CORRUPT_MARKER => {
                    return Err(CodecError::Read("corrupt point record".to_string()));
                }
                Some(point) => {
                    block.push(point);
                    read += 1;
                }
                None => break,
            }
        }
        Ok(read)
    }
}

pub struct FakeWriter {
    out: BufWriter<File>,
}

impl BlockWriter for FakeWriter {
    type Point = String;

    fn write_block(&mut self, block: &mut Vec<String>) -> Result<(), CodecError> {
        for point in block.drain(..) {
            writeln!(self.out, "{}", point).map_err(|e| CodecError::Write(e.to_string()))?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<(), CodecError> {
        self.out.flush().map_err(|e| CodecError::Close(e.to_string()))
    }
}

impl PointCodec for FakeCodec {
    type Header = String;
    type Point = String;
    type Reader = FakeReader;
    type Writer = FakeWriter;

    fn open_reader(&self, path: &Utf8Path) -> Result<FakeReader, CodecError> {
        let gate = path
            .file_name()
            .and_then(|name| self.gates.lock().unwrap().remove(name));
        if let Some(gate) = gate {
            let _ = gate.recv();
        }

        let text = fs::read_to_string(path).map_err(|e| CodecError::Open {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let mut lines = text.lines().map(str::to_string);
        let header = lines.next().ok_or_else(|| CodecError::Open {
            path: path.to_string(),
            message: "missing header".to_string(),
        })?;

        Ok(FakeReader {
            header,
            points: lines.collect(),
        })
    }

    fn open_writer(&self, path: &Utf8Path, header: &String, compress: bool) -> Result<FakeWriter, CodecError> {
        let file = File::create(path).map_err(|e| CodecError::Open {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), compress));

        let mut out = BufWriter::new(file);
        writeln!(out, "{}", header).map_err(|e| CodecError::Write(e.to_string()))?;
        Ok(FakeWriter { out })
    }
}

/// Temporary input/output folder pair.
pub struct Workspace {
    _temp: TempDir,
    pub input: Utf8PathBuf,
    pub output: Utf8PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        let input = root.join("in");
        fs::create_dir(&input).unwrap();
        Self {
            _temp: temp,
            input,
            output: root.join("out"),
        }
    }

    /// Write a fake cloud at `relative` under the input folder.
    pub fn cloud(&self, relative: &str, header: &str, points: &[&str]) -> Utf8PathBuf {
        let path = self.input.join(relative);
        write_cloud(&path, header, points);
        path
    }

    pub fn config(&self) -> RunConfig {
        RunConfig::new(self.input.clone(), self.output.clone())
    }
}

pub fn write_cloud(path: &Utf8Path, header: &str, points: &[&str]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut text = format!("{}\n", header);
    for point in points {
        text.push_str(point);
        text.push('\n');
    }
    fs::write(path, text).unwrap();
}

/// Everything a finished run reported.
pub struct Finished {
    pub events: Vec<RunEvent>,
    pub counters: RunCounters,
    pub log_path: Utf8PathBuf,
}

impl Finished {
    pub fn log_lines(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RunEvent::LogLine(line) => Some(line.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn progress(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RunEvent::Progress(index) => Some(*index),
                _ => None,
            })
            .collect()
    }

    pub fn totals(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RunEvent::Total(total) => Some(*total),
                _ => None,
            })
            .collect()
    }

    pub fn has_line(&self, needle: &str) -> bool {
        self.log_lines().iter().any(|line| line.contains(needle))
    }
}

/// Start a run and block until it reports `Done`.
pub fn run_to_end<C: PointCodec>(converter: &Converter<C>, config: RunConfig) -> Finished {
    let mut channel = converter.start(config).unwrap();
    let events = channel.collect_until_done();
    finished(events)
}

pub fn finished(events: Vec<RunEvent>) -> Finished {
    let Some(RunEvent::Done { counters, log_path }) = events.last().cloned() else {
        panic!("run did not end with Done: {:?}", events);
    };
    Finished {
        events,
        counters,
        log_path,
    }
}
