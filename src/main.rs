use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tilecut::{EdgeClamp, ImageJob, RunObserver, RunOutcome, SliceConfig, SliceRunner};

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Cut images into a grid of (optionally overlapping) PNG slices"
)]
struct Args {
    /// Images to slice, processed in the order given
    #[arg(required = true, value_name = "IMAGE")]
    images: Vec<PathBuf>,

    /// JSON file with slicing settings; the flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory the slices are written to
    #[arg(short = 'o', long, value_name = "DIR")]
    dest: Option<PathBuf>,

    #[arg(long, value_name = "PX")]
    slice_width: Option<u32>,

    #[arg(long, value_name = "PX")]
    slice_height: Option<u32>,

    /// Pixels shared by horizontally adjacent slices
    #[arg(long, value_name = "PX")]
    overlap_width: Option<u32>,

    /// Pixels shared by vertically adjacent slices
    #[arg(long, value_name = "PX")]
    overlap_height: Option<u32>,

    #[arg(long)]
    right_to_left: bool,

    #[arg(long)]
    bottom_to_top: bool,

    /// Number slices down each column before moving to the next one
    #[arg(long)]
    column_order: bool,

    /// Put each image's slices in a sub directory named after the image
    #[arg(long)]
    per_image_subdir: bool,

    /// Let boundary slices reach the last row/column of the image
    #[arg(long)]
    exact_edges: bool,

    /// Print the planned slices for each image instead of writing them
    #[arg(long)]
    plan: bool,

    /// Print the effective settings as JSON before running
    #[arg(long)]
    print_config: bool,
}

fn build_config(args: &Args) -> tilecut::Result<SliceConfig> {
    let mut config = match &args.config {
        Some(path) => SliceConfig::load_json(path)?,
        None => SliceConfig::default(),
    };

    if let Some(dest) = &args.dest {
        config.destination_root = dest.clone();
    }
    if let Some(v) = args.slice_width {
        config.slice_width = v;
    }
    if let Some(v) = args.slice_height {
        config.slice_height = v;
    }
    if let Some(v) = args.overlap_width {
        config.overlap_width = v;
    }
    if let Some(v) = args.overlap_height {
        config.overlap_height = v;
    }
    if args.right_to_left {
        config.left_to_right = false;
    }
    if args.bottom_to_top {
        config.top_to_bottom = false;
    }
    if args.column_order {
        config.row_major = false;
    }
    if args.per_image_subdir {
        config.per_image_subdir = true;
    }
    if args.exact_edges {
        config.edge_clamp = EdgeClamp::Exact;
    }

    config.validate()?;
    Ok(config)
}

struct StdoutObserver;

impl RunObserver for StdoutObserver {
    fn on_log(&self, line: &str) {
        println!("{line}");
    }
}

/// Calls `on_interrupt` on the first SIGINT/SIGTERM; a second one exits
/// immediately. Dropping the guard stops listening.
#[cfg(unix)]
struct InterruptGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl InterruptGuard {
    fn new<F>(on_interrupt: F) -> std::io::Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            let mut interrupted = false;
            for signal in signals.forever() {
                if interrupted {
                    log::warn!("second interrupt, exiting without waiting");
                    std::process::exit(128 + signal);
                }
                interrupted = true;
                log::warn!("interrupt received, stopping after the current slice");
                on_interrupt();
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(not(unix))]
struct InterruptGuard;

#[cfg(not(unix))]
impl InterruptGuard {
    fn new<F>(_on_interrupt: F) -> std::io::Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        Ok(Self)
    }
}

fn print_plans(images: &[PathBuf], config: &SliceConfig) -> ExitCode {
    let mut errors = 0;
    for path in images {
        let planned = image::image_dimensions(path)
            .map_err(|e| e.to_string())
            .and_then(|(w, h)| tilecut::plan(w, h, config).map_err(|e| e.to_string()));

        match planned {
            Ok(plan) => {
                let job = ImageJob::new(path, config);
                println!(
                    "{}: {} slices ({} columns x {} rows)",
                    path.display(),
                    plan.len(),
                    plan.columns,
                    plan.rows
                );
                for rect in &plan {
                    let (x0, y0, x1, y1) = rect.bounds();
                    println!(
                        "  {:>4}  ({x0}, {y0})-({x1}, {y1})  {}x{}  {}",
                        rect.index,
                        rect.roi.w(),
                        rect.roi.h(),
                        job.slice_path(rect.index).display()
                    );
                }
            }
            Err(e) => {
                errors += 1;
                println!("{}: {e}", path.display());
            }
        }
    }

    if errors == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    if args.print_config {
        match serde_json::to_string_pretty(&config) {
            Ok(json) => println!("{json}"),
            Err(e) => log::warn!("cannot print config: {e}"),
        }
    }

    if args.plan {
        return print_plans(&args.images, &config);
    }

    let runner = SliceRunner::new();
    let canceler = runner.canceler();
    let _interrupt = InterruptGuard::new(move || canceler.cancel())
        .map_err(|e| log::warn!("cannot listen for interrupts: {e}"))
        .ok();

    let handle = match runner.start(args.images.clone(), config, Arc::new(StdoutObserver)) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    match handle.wait() {
        Ok(result) if result.images_failed == 0 && result.outcome == RunOutcome::Completed => {
            ExitCode::SUCCESS
        }
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
