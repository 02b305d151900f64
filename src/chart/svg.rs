//! Static SVG rendering of a chart

use super::engine::{ChartEngine, Emphasis};
use crate::hierarchy::layout::escape;
use std::io::{self, Write};

/// Line colors, cycled by series position
pub const SERIES_COLORS: [&str; 3] = ["Tomato", "MediumSeaGreen", "SteelBlue"];

/// Stroke for series pushed into the background while another is hovered
pub const GHOST_STROKE: &str = "#ddd";

pub fn series_color(index: usize) -> &'static str {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

pub fn write<W: Write>(writer: &mut W, engine: &ChartEngine) -> io::Result<()> {
    let config = engine.config();
    let view = engine.view();
    let id = view.kind.id();
    let [x0, x1] = config.domain_range();
    let [y1, y0] = config.value_range();

    writeln!(
        writer,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="{id}-chart" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="10">"#,
        w = config.width,
        h = config.height,
    )?;
    writeln!(
        writer,
        r#"<defs><clipPath id="{id}-clip"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath></defs>"#,
        x0,
        y0,
        x1 - x0,
        y1 - y0
    )?;

    // domain axis
    writeln!(writer, r#"<g class="x-axis" transform="translate(0,{})">"#, y1)?;
    writeln!(writer, r#"<path stroke="currentColor" d="M{},0H{}"/>"#, x0, x1)?;
    for tick in &view.domain_ticks {
        writeln!(
            writer,
            r#"<g class="tick" transform="translate({:.2},0)"><line stroke="currentColor" y2="6"/><text fill="currentColor" y="9" dy="0.71em" text-anchor="middle">{}</text></g>"#,
            tick.pixel,
            escape(&tick.label)
        )?;
    }
    writeln!(
        writer,
        r#"<text x="{}" y="{}" fill="currentColor" text-anchor="end">{}</text>"#,
        x1,
        config.margin_bottom - 4.0,
        escape(view.domain_label)
    )?;
    writeln!(writer, "</g>")?;

    // value axis with grid lines
    writeln!(writer, r#"<g class="y-axis" transform="translate({},0)">"#, x0)?;
    for tick in &view.value_ticks {
        writeln!(
            writer,
            r#"<g class="tick" transform="translate(0,{:.2})"><line stroke="currentColor" x2="-6"/><line stroke="currentColor" stroke-opacity="0.1" x2="{}"/><text fill="currentColor" x="-9" dy="0.32em" text-anchor="end">{}</text></g>"#,
            tick.pixel,
            x1 - x0,
            escape(&tick.label)
        )?;
    }
    writeln!(
        writer,
        r#"<text x="{}" y="10" fill="currentColor" text-anchor="start">{}</text>"#,
        -config.margin_left,
        escape(view.value_label)
    )?;
    writeln!(writer, "</g>")?;

    // series, the highlighted one drawn last so it sits on top
    writeln!(writer, r#"<g class="series" clip-path="url(#{id}-clip)" fill="none" stroke-width="1.5">"#)?;
    let mut order: Vec<usize> = (0..view.paths.len()).collect();
    order.sort_by_key(|&i| view.paths[i].emphasis == Emphasis::Highlighted);
    for i in order {
        let path = &view.paths[i];
        let stroke = match path.emphasis {
            Emphasis::Ghost => GHOST_STROKE,
            _ => series_color(i),
        };
        writeln!(
            writer,
            r#"<path class="line" data-series="{}" stroke="{}" stroke-linejoin="round" stroke-linecap="round" d="{}"/>"#,
            escape(&path.name),
            stroke,
            path.d
        )?;
    }
    writeln!(writer, "</g>")?;

    if let Some(hit) = &view.hover {
        writeln!(
            writer,
            r#"<g class="tooltip" transform="translate({:.2},{:.2})"><circle r="2.5" fill="{}"/><text text-anchor="middle" y="-8">"#,
            hit.px,
            hit.py,
            series_color(hit.series_index)
        )?;
        for (i, line) in hit.tooltip.iter().enumerate() {
            writeln!(writer, r#"<tspan x="0" y="{}em">{}</tspan>"#, i as f64 * 1.1 - 3.3, escape(line))?;
        }
        writeln!(writer, "</text></g>")?;
    }

    writeln!(writer, "</svg>")
}

pub fn render(engine: &ChartEngine) -> String {
    let mut out = Vec::new();
    // writing into a Vec cannot fail
    let _ = write(&mut out, engine);
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::series::{ChartKind, Series, SeriesSet};
    use crate::config::ChartConfig;

    fn engine() -> ChartEngine {
        let set = SeriesSet::new(
            ChartKind::Acceleration,
            vec![0.0, 1.0, 2.0, 3.0],
            vec![
                Series { name: "x".into(), values: vec![-10.0, -5.0, -8.0, -12.0] },
                Series { name: "y".into(), values: vec![4.0, 6.0, 5.0, 3.0] },
                Series { name: "z".into(), values: vec![1002.0, 998.0, 1000.0, 1001.0] },
            ],
        );
        ChartEngine::new(set, ChartConfig::default())
    }

    #[test]
    fn test_series_colors_cycle() {
        assert_eq!(series_color(0), "Tomato");
        assert_eq!(series_color(2), "SteelBlue");
        assert_eq!(series_color(3), "Tomato");
    }

    #[test]
    fn test_render_structure() {
        let svg = render(&engine());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"clip-path="url(#acceleration-clip)""#));
        assert_eq!(svg.matches(r#"class="line""#).count(), 3);
        assert!(svg.contains("Time [ms] →"));
        assert!(svg.contains("Tomato") && svg.contains("MediumSeaGreen") && svg.contains("SteelBlue"));
        assert!(!svg.contains("tooltip"));
    }

    #[test]
    fn test_render_hover() {
        let mut engine = engine();
        let px = engine.domain_scale().apply(1.0);
        let py = engine.value_scale().apply(998.0);
        engine.pointer_move(px, py);

        let svg = render(&engine);
        assert!(svg.contains(r#"class="tooltip""#));
        assert!(svg.contains("axis: Z"));
        assert!(svg.contains("acc: 998mg"));
        assert_eq!(svg.matches(GHOST_STROKE).count(), 2);

        // highlighted series is drawn last
        let last = svg.rfind(r#"class="line""#).unwrap();
        assert!(svg[last..].contains(r#"data-series="z""#));
    }

    #[test]
    fn test_render_empty_chart() {
        let svg = render(&ChartEngine::empty(ChartKind::Fft, ChartConfig::default()));
        assert!(svg.contains("fft-clip"));
        assert!(svg.contains("Frequency [Hz] →"));
        assert_eq!(svg.matches(r#"class="line""#).count(), 0);
    }
}
