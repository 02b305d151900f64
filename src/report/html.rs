//! HTML report: tree plus every stream's charts as inline SVG

use crate::chart::svg;
use crate::hierarchy::layout::escape;
use crate::report::{ReportData, StreamReport, Summary};
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, data: &ReportData) -> io::Result<()> {
    let summary = Summary::from_streams(&data.streams);

    write!(writer, r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>accelview report</title>
    <style>
        :root {{
            --bg: #0d1117;
            --card: #161b22;
            --border: #30363d;
            --text: #e6edf3;
            --dim: #7d8590;
            --ok: #3fb950;
            --error: #f85149;
            --accent: #58a6ff;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }}
        .container {{ max-width: 1600px; margin: 0 auto; padding: 2rem; }}
        .header {{
            display: flex;
            align-items: baseline;
            gap: 1rem;
            margin-bottom: 2rem;
            padding-bottom: 1rem;
            border-bottom: 1px solid var(--border);
        }}
        .logo {{ font-size: 2.5rem; font-weight: 800; color: var(--accent); }}
        .subtitle {{ color: var(--dim); font-size: 1rem; }}
        .stats {{
            display: grid;
            grid-template-columns: repeat(4, 1fr);
            gap: 1rem;
            margin-bottom: 2rem;
        }}
        .stat {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.5rem;
            text-align: center;
        }}
        .stat-value {{ font-size: 3rem; font-weight: 700; line-height: 1; }}
        .stat-label {{ color: var(--dim); font-size: 0.875rem; text-transform: uppercase; letter-spacing: 0.05em; margin-top: 0.5rem; }}
        .stat.failed .stat-value {{ color: var(--error); }}
        .card {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.5rem;
            margin-bottom: 2rem;
        }}
        .card h2 {{ font-size: 1.1rem; margin-bottom: 1rem; }}
        .card h2 .file {{ color: var(--dim); font-weight: 400; font-size: 0.875rem; margin-left: 0.5rem; }}
        .svg-box {{ background: #fff; border-radius: 8px; padding: 0.5rem; overflow: auto; }}
        .charts {{ display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }}
        .errors {{ color: var(--error); font-size: 0.875rem; margin-top: 0.75rem; }}
        @media (max-width: 1300px) {{ .charts {{ grid-template-columns: 1fr; }} }}
    </style>
</head>
<body>
<div class="container">
    <div class="header">
        <span class="logo">accelview</span>
        <span class="subtitle">{source} &middot; generated {generated}</span>
    </div>

    <div class="stats">
        <div class="stat"><div class="stat-value">{streams}</div><div class="stat-label">Streams</div></div>
        <div class="stat"><div class="stat-value">{samples}</div><div class="stat-label">Samples</div></div>
        <div class="stat"><div class="stat-value">{bins}</div><div class="stat-label">FFT bins</div></div>
        <div class="stat failed"><div class="stat-value">{failed}</div><div class="stat-label">Failed</div></div>
    </div>

    <div class="card">
        <h2>Data sets</h2>
        <div class="svg-box">{tree}</div>
    </div>
"#,
        source = escape(&data.source),
        generated = escape(&data.generated),
        streams = summary.streams,
        samples = summary.samples,
        bins = summary.fft_bins,
        failed = summary.failed,
        tree = data.tree_svg,
    )?;

    for stream in &data.streams {
        write_stream(writer, stream)?;
    }

    writeln!(writer, "</div>\n</body>\n</html>")
}

fn write_stream<W: Write>(writer: &mut W, stream: &StreamReport) -> io::Result<()> {
    writeln!(writer, r#"    <div class="card" id="stream-{}">"#, stream.index)?;
    writeln!(
        writer,
        r#"        <h2>{}<span class="file">{}</span></h2>"#,
        escape(&stream.title),
        escape(&stream.selection.file_name)
    )?;
    writeln!(writer, r#"        <div class="charts">"#)?;
    writeln!(writer, r#"            <div class="svg-box">{}</div>"#, svg::render(&stream.acceleration))?;
    writeln!(writer, r#"            <div class="svg-box">{}</div>"#, svg::render(&stream.fft))?;
    writeln!(writer, "        </div>")?;
    if !stream.errors.is_empty() {
        writeln!(writer, r#"        <div class="errors">"#)?;
        for e in &stream.errors {
            writeln!(writer, "            <div>{}</div>", escape(e))?;
        }
        writeln!(writer, "        </div>")?;
    }
    writeln!(writer, "    </div>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::report;

    fn render(data: &ReportData) -> String {
        let mut out = Vec::new();
        write(&mut out, data).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_document_structure() {
        let html = render(&report());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));
        assert!(html.contains(r#"class="tree""#));
        assert_eq!(html.matches(r#"id="acceleration-chart""#).count(), 2);
        assert_eq!(html.matches(r#"id="fft-chart""#).count(), 2);
    }

    #[test]
    fn test_stats_and_errors() {
        let html = render(&report());
        assert!(html.contains(r#"<div class="stat-value">2</div><div class="stat-label">Streams</div>"#));
        assert!(html.contains(r#"<div class="stat-value">8</div><div class="stat-label">Samples</div>"#));
        // b.tsv is missing from the source
        assert_eq!(html.matches(r#"class="errors""#).count(), 1);
        assert!(html.contains("b.tsv"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut data = report();
        data.source = "<script>".to_string();
        let html = render(&data);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
