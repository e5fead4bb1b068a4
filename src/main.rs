mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Args;
use retl_threads::{csv_escape, ThreadETL};

const PREVIEW_ROWS: usize = 5;

fn main() -> Result<()> {
    let args = Args::parse();
    let threads = args
        .threads
        .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(8));
    let output = args.output.clone();

    let etl = ThreadETL::new()
        .input_dir(&args.input_dir)
        .file_pattern(args.pattern.as_str())
        .recursive(args.recursive)
        .site_origin(args.site_origin.as_str())
        .timestamps_human_readable(args.human_timestamps)
        .parallelism(threads)
        .parallel_documents(!args.sequential)
        .progress(!args.no_progress)
        .progress_label("Flattening threads");

    let (outcome, summary) = etl.run_to(&output, args.export_format())?;

    println!("{summary}");
    for failure in &outcome.failures {
        println!("  failed: {failure}");
    }
    if !outcome.table.is_empty() {
        println!("\nCombined data saved to {}", output.display());
        println!("type,id,parent_id,author,body");
        for r in outcome.table.head(PREVIEW_ROWS) {
            let body: String = r.body.chars().take(60).collect();
            println!(
                "{},{},{},{},{}",
                r.kind,
                r.id.as_deref().unwrap_or(""),
                r.parent_id.as_deref().unwrap_or(""),
                r.author.as_deref().unwrap_or(""),
                csv_escape(&body)
            );
        }
    }
    Ok(())
}
