use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use wadate_core::{Outcome, ProcessOptions};

#[derive(Parser)]
#[command(
    name = "wadate",
    version,
    about = "Normalize capture dates of chat-app media exports from their filenames"
)]
struct Cli {
    /// Root directory to scan for media files
    #[arg(long)]
    input_path: PathBuf,

    /// Directory receiving the rewritten copies
    #[arg(long)]
    output_path: PathBuf,

    /// Replace files already present in the output directory
    #[arg(long)]
    overwrite: bool,

    /// Allowed media extensions
    #[arg(long, value_delimiter = ',', default_value = "jpeg,jpg,mp4")]
    extensions: Vec<String>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let t_total = std::time::Instant::now();

    let options = ProcessOptions {
        input: cli.input_path,
        output: cli.output_path,
        overwrite: cli.overwrite,
        extensions: cli.extensions,
    };

    let bar: Arc<Mutex<Option<ProgressBar>>> = Arc::new(Mutex::new(None));
    let cb_bar = Arc::clone(&bar);
    let result = wadate_core::process(&options, &move |stage, current, total, message| {
        if stage != "process" {
            return;
        }
        let mut bar = cb_bar.lock().unwrap();
        let pb = bar.get_or_insert_with(|| {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{bar:40}] {pos}/{len} {msg}")
                    .unwrap(),
            );
            pb
        });
        pb.set_position(current + 1);
        pb.set_message(message.to_string());
    })?;
    if let Some(pb) = bar.lock().unwrap().take() {
        pb.finish_and_clear();
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    for fo in &result.outcomes {
        match &fo.outcome {
            Outcome::Processed { output } => println!("{}", output.display()),
            Outcome::Failed { reason } => {
                eprintln!("failed: {}: {}", fo.source.display(), reason)
            }
            _ => {}
        }
    }
    for w in &result.warnings {
        eprintln!("warning: {}", w);
    }

    // Per-file failures are reported above but leave the exit status at zero
    eprintln!(
        "Done! {} processed, {} had metadata, {} without date match, {} already existed, {} failed ({:.2}s)",
        result.processed,
        result.skipped_has_metadata,
        result.skipped_no_date_match,
        result.skipped_exists,
        result.failed,
        t_total.elapsed().as_secs_f64()
    );

    Ok(())
}
