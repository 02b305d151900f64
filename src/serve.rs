//! HTTP server for the interactive viewer
//!
//! `accelview serve` → starts server, opens browser, shows the data-set tree
//! and the two charts of whatever stream gets clicked.
//!
//! The loop is single-threaded: one request is handled to completion before
//! the next, so the [`ViewerSession`] needs no locking.

use crate::chart::{svg, ChartKind, ChartView, ZoomTransform};
use crate::client::PluginClient;
use crate::control;
use crate::hierarchy::layout::NodeRow;
use crate::hierarchy::StreamSelection;
use crate::session::{SelectionView, ViewerSession};
use crate::{Error, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;
use tiny_http::{Header, Method, Request, Response, Server};

// Embed the UI directly in the binary
const UI_HTML: &str = include_str!("ui.html");

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(error: &Error) -> Self {
        Self { ok: false, data: None, error: Some(error.to_string()) }
    }
}

/// Body plus content type of a successful request
#[derive(Debug)]
pub struct Reply {
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn json<T: Serialize>(data: T) -> Result<Self> {
        Ok(Self { content_type: "application/json", body: serde_json::to_string(&ApiResponse::success(data))? })
    }
}

#[derive(Serialize)]
struct TreePayload {
    nodes: usize,
    leaves: usize,
    rows: Vec<NodeRow>,
}

#[derive(Serialize)]
struct SelectPayload {
    #[serde(flatten)]
    view: SelectionView,
    acceleration_svg: String,
    fft_svg: String,
}

#[derive(Serialize)]
struct ChartPayload {
    generation: u64,
    view: ChartView,
    svg: String,
}

#[derive(Deserialize, Debug)]
struct SelectQuery {
    index: usize,
}

#[derive(Deserialize, Debug)]
struct ChartQuery {
    chart: ChartKind,
    generation: u64,
    x: Option<f64>,
    y: Option<f64>,
    k: Option<f64>,
    factor: Option<f64>,
    at: Option<f64>,
    dx: Option<f64>,
}

impl ChartQuery {
    fn require(value: Option<f64>, name: &str) -> Result<f64> {
        value.ok_or_else(|| Error::BadRequest(format!("missing parameter '{}'", name)))
    }
}

/// Everything the request loop owns
pub struct ServerState {
    pub session: ViewerSession,
    /// Plugin connection for the control endpoints; absent for data directories
    pub plugin: Option<PluginClient>,
}

impl ServerState {
    pub fn new(session: ViewerSession, plugin: Option<PluginClient>) -> Self {
        Self { session, plugin }
    }

    /// What the viewer is showing: plugin URL or data directory
    pub fn source_label(&self) -> String {
        self.session.source().describe()
    }

    fn plugin(&self) -> Result<&PluginClient> {
        self.plugin
            .as_ref()
            .ok_or_else(|| Error::BadRequest("not connected to the plugin".to_string()))
    }

    fn chart_payload(&self, kind: ChartKind) -> ChartPayload {
        let chart = self.session.chart(kind);
        ChartPayload {
            generation: self.session.generation(),
            view: chart.view(),
            svg: svg::render(chart),
        }
    }

    fn select_payload(&self, view: SelectionView) -> SelectPayload {
        SelectPayload {
            view,
            acceleration_svg: svg::render(self.session.chart(ChartKind::Acceleration)),
            fft_svg: svg::render(self.session.chart(ChartKind::Fft)),
        }
    }

    /// Dispatch one request
    pub fn route(&mut self, method: &Method, path: &str, query: &str, body: &str) -> Result<Reply> {
        match (method, path) {
            (&Method::Get, "/") => Ok(Reply { content_type: "text/html; charset=utf-8", body: UI_HTML.to_string() }),

            (&Method::Get, "/api/tree") => {
                let tree = self.session.load_tree()?;
                let (nodes, leaves) = (tree.node_count(), tree.leaf_count());
                Reply::json(TreePayload { nodes, leaves, rows: self.session.rows() })
            }

            (&Method::Get, "/api/tree.svg") => {
                self.session.load_tree()?;
                Ok(Reply { content_type: "image/svg+xml", body: self.session.tree_svg() })
            }

            (&Method::Get, "/api/select") | (&Method::Post, "/api/select") => {
                let view = if let Ok(q) = serde_urlencoded::from_str::<SelectQuery>(query) {
                    self.session.select_index(q.index)?
                } else if !body.trim().is_empty() {
                    let selection: StreamSelection = serde_json::from_str(body)
                        .map_err(|e| Error::BadRequest(format!("invalid selection: {}", e)))?;
                    self.session.select_stream(selection)
                } else {
                    return Err(Error::BadRequest("expected ?index=<n> or a selection body".to_string()));
                };
                Reply::json(self.select_payload(view))
            }

            (&Method::Get, "/api/pointer") => {
                let q = parse_chart_query(query)?;
                let (x, y) = (ChartQuery::require(q.x, "x")?, ChartQuery::require(q.y, "y")?);
                self.session.pointer(q.chart, q.generation, x, y)?;
                Reply::json(self.chart_payload(q.chart))
            }

            (&Method::Get, "/api/leave") => {
                let q = parse_chart_query(query)?;
                self.session.leave(q.chart, q.generation)?;
                Reply::json(self.chart_payload(q.chart))
            }

            (&Method::Get, "/api/zoom") => {
                let q = parse_chart_query(query)?;
                let transform = ZoomTransform::new(ChartQuery::require(q.k, "k")?, q.x.unwrap_or(0.0));
                self.session.zoom(q.chart, q.generation, transform)?;
                Reply::json(self.chart_payload(q.chart))
            }

            (&Method::Get, "/api/wheel") => {
                let q = parse_chart_query(query)?;
                let factor = ChartQuery::require(q.factor, "factor")?;
                let at = ChartQuery::require(q.at, "at")?;
                self.session.wheel(q.chart, q.generation, factor, at)?;
                Reply::json(self.chart_payload(q.chart))
            }

            (&Method::Get, "/api/pan") => {
                let q = parse_chart_query(query)?;
                self.session.pan(q.chart, q.generation, ChartQuery::require(q.dx, "dx")?)?;
                Reply::json(self.chart_payload(q.chart))
            }

            (&Method::Get, "/api/parameters") => {
                let response = self.plugin()?.parameters(&[])?;
                let p = &response.parameters;
                Reply::json(serde_json::json!({
                    "parameters": p,
                    "frequency_steps": p.frequency_steps(),
                    "zeta_steps": p.zeta_steps(),
                }))
            }

            (&Method::Get, "/api/estimate") => {
                let estimate = self.plugin()?.estimate()?;
                Reply::json(serde_json::json!({
                    "estimate": estimate.estimate,
                    "readable": estimate.estimate.map(control::seconds_to_readable),
                }))
            }

            (&Method::Post, "/api/set") => {
                let values: serde_json::Map<String, Value> = serde_json::from_str(body)
                    .map_err(|e| Error::BadRequest(format!("invalid values: {}", e)))?;
                Reply::json(self.plugin()?.set_values(&values)?)
            }

            (&Method::Post, "/api/start") => Reply::json(self.plugin()?.start_recording()?),

            (&Method::Post, "/api/abort") => Reply::json(self.plugin()?.abort_recording()?),

            (&Method::Post, "/api/process") => Reply::json(self.plugin()?.start_data_processing()?),

            _ => Err(Error::FileNotFound(path.to_string())),
        }
    }
}

fn parse_chart_query(query: &str) -> Result<ChartQuery> {
    serde_urlencoded::from_str(query).map_err(|e| Error::BadRequest(format!("invalid query: {}", e)))
}

/// Start server, open browser, serve UI
pub fn start(port: u16, mut state: ServerState, open_browser: bool) -> std::io::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let url = format!("http://localhost:{}", port);
    eprintln!("\n\x1b[1;32maccelview\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   Source: {}\n", state.source_label());
    info!("listening on {}", addr);

    if open_browser {
        let _ = open::that(&url);
    }

    // Handle requests
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &mut state) {
            warn!("failed to answer request: {}", e);
        }
    }

    Ok(())
}

fn handle_request(mut request: Request, state: &mut ServerState) -> std::io::Result<()> {
    let url = request.url().to_string();
    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    let method = request.method().clone();

    let mut body = String::new();
    if method == Method::Post {
        request.as_reader().read_to_string(&mut body)?;
    }
    debug!("{} {}", method, url);

    match state.route(&method, path, query, &body) {
        Ok(reply) => respond(request, 200, reply.content_type, reply.body),
        Err(e) => {
            let status = e.status_code();
            if status >= 500 {
                warn!("{} {}: {}", method, path, e);
            } else {
                debug!("{} {}: {}", method, path, e);
            }
            let json = serde_json::to_string(&ApiResponse::failure(&e))?;
            respond(request, status, "application/json", json)
        }
    }
}

fn respond(request: Request, status: u16, content_type: &str, body: String) -> std::io::Result<()> {
    let mut response = Response::from_string(body).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes()) {
        response.add_header(header);
    }
    request.respond(response)
}
