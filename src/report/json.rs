//! JSON report: tree rows and the computed chart geometry

use crate::chart::ChartView;
use crate::hierarchy::layout::NodeRow;
use crate::hierarchy::StreamSelection;
use crate::report::{ReportData, Summary};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct JsonReport<'a> {
    generated: &'a str,
    source: &'a str,
    summary: Summary,
    tree: &'a [NodeRow],
    streams: Vec<JsonStream<'a>>,
}

#[derive(Serialize)]
struct JsonStream<'a> {
    index: usize,
    title: &'a str,
    selection: &'a StreamSelection,
    acceleration: ChartView,
    fft: ChartView,
    errors: &'a [String],
}

pub fn write<W: Write>(writer: &mut W, data: &ReportData) -> io::Result<()> {
    let report = JsonReport {
        generated: &data.generated,
        source: &data.source,
        summary: Summary::from_streams(&data.streams),
        tree: &data.rows,
        streams: data
            .streams
            .iter()
            .map(|s| JsonStream {
                index: s.index,
                title: &s.title,
                selection: &s.selection,
                acceleration: s.acceleration.view(),
                fft: s.fft.view(),
                errors: &s.errors,
            })
            .collect(),
    };

    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)
}
