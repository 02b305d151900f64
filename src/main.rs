use accelview::chart::{svg, ChartEngine, ChartKind};
use accelview::client::{FilesListing, PluginClient};
use accelview::control::{self, PushMessage};
use accelview::hierarchy::{FftFiles, NodeType, StreamSelection};
use accelview::report::{self, ReportData};
use accelview::serve::{self, ServerState};
use accelview::session;
use accelview::{Config, DataSource, DirSource, Error, Result, ViewerSession};
use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "accelview")]
#[command(author, version, about = "Browse and chart accelerometer recordings")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Plugin URL (default: http://localhost:5000/plugin/octoprint_accelerometer)
    #[arg(long, global = true, env = "ACCELVIEW_BASE_URL")]
    base_url: Option<String>,

    /// OctoPrint API key
    #[arg(long, global = true, env = "ACCELVIEW_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Read recordings from a local directory instead of the plugin
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the interactive web viewer
    Serve {
        /// Port to listen on (default: from config, 3002)
        #[arg(short, long)]
        port: Option<u16>,

        /// Don't open a browser
        #[arg(long)]
        no_open: bool,
    },

    /// Print the data-set tree
    Tree {
        /// Also write the tree as SVG
        #[arg(long)]
        svg: Option<PathBuf>,
    },

    /// Render the charts of one stream file
    Chart {
        /// Stream file name as listed by the plugin
        file: String,

        /// Per-axis FFT files (x, y, z); a local spectrum is computed otherwise
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"])]
        fft: Option<Vec<String>>,

        /// Output prefix, writes <prefix>-acceleration.svg and <prefix>-fft.svg
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Export tree and charts (.html, .json, .csv)
    Report {
        /// Output report file
        output: Option<PathBuf>,

        /// Only these tree rows (see `tree`); all streams when omitted
        #[arg(short, long)]
        stream: Vec<usize>,

        /// Don't prompt to open the report
        #[arg(long)]
        no_open: bool,
    },

    /// Raw file listings of the plugin
    Files {
        /// Stream files only
        #[arg(long, conflicts_with = "ffts")]
        streams: bool,

        /// FFT files only
        #[arg(long)]
        ffts: bool,
    },

    /// Show recording parameters and the duration estimate
    Params {
        /// Only these parameters
        names: Vec<String>,
    },

    /// Change recording parameters
    Set {
        /// name=value pairs, e.g. start_frequency_hz=10 do_sample_x=true
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Start a recording
    Start,

    /// Abort the running recording
    Abort,

    /// Start post-processing of recorded streams
    Process,

    /// Decode a plugin push message
    Event {
        /// Message JSON (read from stdin when omitted)
        message: Option<String>,

        /// Start processing when the message says recording has ended
        #[arg(long)]
        auto_process: bool,
    },
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .init();

    // Set up thread pool
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    if let Err(e) = run(args) {
        eprintln!("\x1b[31mError:\x1b[0m {}", e);
        std::process::exit(1);
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(url) = &args.base_url {
        config = config.with_base_url(url);
    }
    if let Some(key) = &args.api_key {
        config = config.with_api_key(key);
    }
    Ok(config)
}

fn data_source(args: &Args, config: &Config) -> Result<Box<dyn DataSource>> {
    Ok(match &args.data_dir {
        Some(dir) => Box::new(DirSource::new(dir)),
        None => Box::new(PluginClient::new(config.clone())?),
    })
}

fn plugin(args: &Args, config: &Config) -> Result<PluginClient> {
    if let Some(dir) = &args.data_dir {
        return Err(Error::BadRequest(format!(
            "{} is a data directory; control commands need the plugin",
            dir.display()
        )));
    }
    PluginClient::new(config.clone())
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;

    match &args.command {
        Command::Serve { port, no_open } => {
            let port = port.unwrap_or(config.port);
            let source = data_source(&args, &config)?;
            let plugin = if args.data_dir.is_some() { None } else { Some(PluginClient::new(config.clone())?) };
            let state = ServerState::new(ViewerSession::new(source, config), plugin);
            serve::start(port, state, !no_open)?;
        }

        Command::Tree { svg } => {
            let mut session = ViewerSession::new(data_source(&args, &config)?, config);
            session.load_tree()?;
            print_tree(&session);
            if let Some(path) = svg {
                std::fs::write(path, session.tree_svg())?;
                eprintln!("\n\x1b[32mTree saved: {}\x1b[0m", path.display());
            }
        }

        Command::Chart { file, fft, out } => {
            let source = data_source(&args, &config)?;
            let selection = StreamSelection {
                file_name: file.clone(),
                fft_files: fft.as_ref().and_then(|f| match f.as_slice() {
                    [x, y, z] => Some(FftFiles { x: x.clone(), y: y.clone(), z: z.clone() }),
                    _ => None,
                }),
            };
            let charts = session::load_stream(source.as_ref(), &selection, &config.data);
            for e in &charts.errors {
                eprintln!("\x1b[33m!\x1b[0m {}", e);
            }
            let engines = [
                ChartEngine::new(charts.acceleration, config.chart),
                ChartEngine::new(charts.fft, config.chart),
            ];
            for engine in &engines {
                let view = engine.view();
                println!(
                    "{:<13} {:>6} points  domain [{}, {}]  values [{}, {}]",
                    engine.kind().id(),
                    view.points,
                    view.visible_domain[0],
                    view.visible_domain[1],
                    view.value_domain[0],
                    view.value_domain[1]
                );
            }
            if let Some(prefix) = out {
                for engine in &engines {
                    let path = chart_path(prefix, engine.kind());
                    std::fs::write(&path, svg::render(engine))?;
                    eprintln!("\x1b[32mChart saved: {}\x1b[0m", path.display());
                }
            }
        }

        Command::Report { output, stream, no_open } => {
            let mut session = ViewerSession::new(data_source(&args, &config)?, config.clone());
            session.load_tree()?;
            let tree = session.tree();

            eprintln!("\x1b[1maccelview report\x1b[0m");
            eprintln!("{}", "─".repeat(70));
            eprintln!("{} node(s), {} leaf row(s)\n", tree.node_count(), tree.leaf_count());

            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            let data = ReportData::collect(session.source(), &config, tree, stream, Some(&pb))?;
            pb.finish_and_clear();

            for s in &data.streams {
                let color = if s.errors.is_empty() { "\x1b[32m" } else { "\x1b[31m" };
                println!(
                    "{}{:>4}\x1b[0m  {:>6} samples  {:>6} bins  {}",
                    color,
                    s.index,
                    s.acceleration.data().len(),
                    s.fft.data().len(),
                    s.title
                );
            }

            let output_path = output.clone().unwrap_or_else(|| {
                let timestamp = Local::now().format("%Y%m%d_%H%M%S");
                PathBuf::from(format!("accelview_report_{}.html", timestamp))
            });
            report::generate(&output_path, &data)?;
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output_path.display());

            if !no_open {
                prompt_open(&output_path);
            }
        }

        Command::Files { streams, ffts } => {
            let which = if *streams {
                FilesListing::Streams
            } else if *ffts {
                FilesListing::Ffts
            } else {
                FilesListing::All
            };
            let listing = plugin(&args, &config)?.files_listing(which)?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }

        Command::Params { names } => {
            let client = plugin(&args, &config)?;
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let response = client.parameters(&names)?;
            let p = &response.parameters;

            if let serde_json::Value::Object(map) = serde_json::to_value(p)? {
                for (name, value) in map {
                    println!("{:<28} {}", name, value);
                }
            }
            println!("{:<28} {}", "device", p.device_label());
            if let Some(steps) = p.frequency_steps() {
                println!("{:<28} {}", "frequency steps", steps);
            }
            if let Some(steps) = p.zeta_steps() {
                println!("{:<28} {}", "zeta steps", steps);
            }
            let estimate = response.estimate.or(client.estimate()?.estimate);
            if let Some(seconds) = estimate {
                println!("{:<28} {}", "estimate", control::seconds_to_readable(seconds));
            }
        }

        Command::Set { values } => {
            let values = control::parse_assignments(values)?;
            plugin(&args, &config)?.set_values(&values)?;
            eprintln!("\x1b[32mUpdated {} parameter(s)\x1b[0m", values.len());
        }

        Command::Start => {
            plugin(&args, &config)?.start_recording()?;
            eprintln!("\x1b[32mRecording started\x1b[0m");
        }

        Command::Abort => {
            plugin(&args, &config)?.abort_recording()?;
            eprintln!("\x1b[33mRecording aborted\x1b[0m");
        }

        Command::Process => {
            plugin(&args, &config)?.start_data_processing()?;
            eprintln!("\x1b[32mData processing started\x1b[0m");
        }

        Command::Event { message, auto_process } => {
            let text = match message {
                Some(m) => m.clone(),
                None => io::read_to_string(io::stdin())?,
            };
            let event = PushMessage::parse(&text)?;
            println!("{}", event.summary());
            if *auto_process && event.wants_processing() {
                plugin(&args, &config)?.start_data_processing()?;
                eprintln!("\x1b[32mData processing started\x1b[0m");
            }
        }
    }

    Ok(())
}

fn print_tree(session: &ViewerSession) {
    for row in session.rows() {
        let color = match row.node_type {
            NodeType::Root => "\x1b[1m",
            NodeType::Run => "\x1b[36m",
            NodeType::Sequence => "\x1b[34m",
            NodeType::Stream => "\x1b[32m",
            NodeType::Fft => "\x1b[90m",
        };
        println!(
            "{:>5}  {}{}{}\x1b[0m  {}",
            row.index,
            "  ".repeat(row.depth),
            color,
            row.name,
            row.annotation()
        );
    }
    let tree = session.tree();
    eprintln!("\n{} node(s), {} leaf row(s)", tree.node_count(), tree.leaf_count());
}

fn chart_path(prefix: &Path, kind: ChartKind) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!("-{}.svg", kind.id()));
    PathBuf::from(name)
}

fn prompt_open(path: &Path) {
    eprint!("\nOpen report in browser? [Y/n] ");
    io::stderr().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_ok() {
        let input = input.trim().to_lowercase();
        if input.is_empty() || input == "y" || input == "yes" {
            if let Err(e) = open::that(path) {
                eprintln!("Failed to open report: {}", e);
            }
        }
    }
}
