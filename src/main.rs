use anyhow::{bail, Context, Result};
use clap::Parser;
use img_shrink::batch::{BatchEvent, BatchOrchestrator, BatchOutcome, BatchStatus};
use img_shrink::cli::{Args, Commands, EncodeArgs};
use img_shrink::constants::{
    COMPRESSED_SIZE_PREFIX, DEFAULT_OUTPUT_DIR, INFO_PREFIX, ORIGINAL_SIZE_PREFIX, SUCCESS_PREFIX,
};
use img_shrink::encoder::{CompressionOptions, EncodeKind, EncodeResult, Encoder};
use img_shrink::logger;
use img_shrink::packager::{resolve_entry_names, Artifact, CollisionPolicy, Packager};
use img_shrink::queue::{BatchQueue, ItemStatus};
use img_shrink::utils::{create_progress_bar, format_file_size, print_compression_result};
use img_shrink::validation::{collect_image_files, intake, load_source_image, IntakeLimits};
use img_shrink::{error, info, verbose, warn};
use indicatif::ProgressDrawTarget;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args = Args::parse();
    logger::set_quiet_mode(args.quiet);
    logger::set_verbose_mode(args.verbose);
    logger::init_tracing(args.verbose);

    match args.command {
        Commands::Compress {
            input,
            output,
            encode,
        } => compress_single(&input, output_dir(output), &encode),
        Commands::Batch {
            input,
            output,
            recursive,
            no_archive,
            encode,
        } => compress_batch(&input, output_dir(output), recursive, no_archive, &encode),
    }
}

fn output_dir(output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

fn compression_options(encode: &EncodeArgs) -> Result<CompressionOptions> {
    CompressionOptions::from_percentages(
        encode.max_dimension,
        encode.quality,
        encode.retry_qualities.clone(),
    )
    .context("Invalid compression settings")
}

fn describe_options(options: &CompressionOptions) {
    let retries: Vec<String> = options
        .retry_qualities
        .iter()
        .map(|q| format!("{:.0}", q * 100.0))
        .collect();
    match options.initial_quality {
        Some(quality) => verbose!(
            "Max dimension {}px, starting quality {:.0}, retries {}",
            options.max_dimension,
            quality * 100.0,
            retries.join(",")
        ),
        None => verbose!(
            "Max dimension {}px, starting quality by format, retries {}",
            options.max_dimension,
            retries.join(",")
        ),
    }
}

fn describe_result(result: &EncodeResult) {
    match &result.kind {
        EncodeKind::Reencoded {
            format,
            quality,
            dimensions,
            attempts,
        } => verbose!(
            "{}: {} {}x{} at quality {:.0} ({} attempt(s))",
            result.name,
            format,
            dimensions.width,
            dimensions.height,
            quality * 100.0,
            attempts
        ),
        EncodeKind::Original => verbose!("{}: no smaller encoding found, original kept", result.name),
    }
}

fn compress_single(input: &Path, out_dir: PathBuf, encode: &EncodeArgs) -> Result<()> {
    let options = compression_options(encode)?;
    let source = load_source_image(input, &IntakeLimits::default())
        .with_context(|| format!("Cannot read {}", input.display()))?;

    info!("{} Compressing: {}", INFO_PREFIX, input.display());
    info!(
        "{} {} ({})",
        ORIGINAL_SIZE_PREFIX,
        source.size(),
        format_file_size(source.size())
    );

    let encoder = Encoder::with_options(options);
    describe_options(encoder.options());
    let result = encoder.encode(&source)?;
    describe_result(&result);

    let artifact = Packager::default().package(std::slice::from_ref(&result))?;
    let path = artifact
        .save(&out_dir)
        .with_context(|| format!("Cannot write into {}", out_dir.display()))?;

    print_compression_result(result.original_size, result.compressed_size);
    info!("{} Saved to {}", SUCCESS_PREFIX, path.display());
    Ok(())
}

fn compress_batch(
    input: &str,
    out_dir: PathBuf,
    recursive: bool,
    no_archive: bool,
    encode: &EncodeArgs,
) -> Result<()> {
    let options = compression_options(encode)?;
    let limits = IntakeLimits::default();

    let paths = collect_image_files(input, recursive)?;
    let report = intake(&paths, &limits)?;
    if let Some(message) = report.oversized_message(&limits) {
        warn!("{}", message);
    }
    if let Some(message) = report.limit_message() {
        warn!("{}", message);
    }
    for name in &report.unsupported {
        verbose!("Skipping unsupported file {}", name);
    }
    if report.accepted.is_empty() {
        bail!("No images to compress in {}", input);
    }

    let mut queue = BatchQueue::new(limits.max_files);
    let added = queue.add_all(report.accepted);
    if !added.rejected.is_empty() {
        warn!(
            "Only {} of {} files added (max {})",
            added.added.len(),
            added.added.len() + added.rejected.len(),
            queue.max_files()
        );
    }
    info!("{} Found {} images to compress", INFO_PREFIX, queue.len());

    let encoder = Encoder::with_options(options);
    describe_options(encoder.options());
    let orchestrator = BatchOrchestrator::new(&encoder);
    let stop = orchestrator.stop_handle();

    let progress = create_progress_bar(queue.len() as u64);
    if logger::is_quiet() {
        progress.set_draw_target(ProgressDrawTarget::hidden());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    let outcome = runtime.block_on(async {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.request_stop();
            }
        });

        orchestrator
            .run(queue.items_mut(), |event| match event {
                BatchEvent::ItemStarted { name, .. } => progress.set_message(name.clone()),
                BatchEvent::ItemFinished {
                    name,
                    status: ItemStatus::Error { message },
                    ..
                } => progress.suspend(|| {
                    error!("{}: {}", name, message);
                }),
                BatchEvent::ItemFinished {
                    name,
                    status: ItemStatus::Done { compressed_size },
                    ..
                } => {
                    progress.suspend(|| {
                        verbose!("{} {} -> {}", SUCCESS_PREFIX, name, format_file_size(*compressed_size));
                    });
                }
                BatchEvent::Progress { completed, .. } => progress.set_position(*completed as u64),
                BatchEvent::Stopped { remaining, .. } => {
                    progress.suspend(|| {
                        warn!("Stopped, {} images left unprocessed", remaining);
                    })
                }
                _ => {}
            })
            .await
    });
    progress.finish_and_clear();

    print_batch_statistics(&outcome);

    match outcome.status() {
        BatchStatus::TotalFailure => bail!(outcome.summary_message()),
        BatchStatus::Empty => return Ok(()),
        BatchStatus::Complete | BatchStatus::Partial => {}
    }

    if no_archive {
        save_individually(&outcome.results, &out_dir)?;
    } else {
        let path = Packager::default()
            .package(&outcome.results)?
            .save(&out_dir)
            .with_context(|| format!("Cannot write into {}", out_dir.display()))?;
        info!("{} Saved to {}", SUCCESS_PREFIX, path.display());
    }
    Ok(())
}

fn save_individually(results: &[EncodeResult], out_dir: &Path) -> Result<()> {
    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    let resolved = resolve_entry_names(&names, CollisionPolicy::Rename);

    for (name, result) in resolved.into_iter().zip(results) {
        let Some(name) = name else { continue };
        let artifact = Artifact::Single {
            name,
            mime_type: result.mime_type.clone(),
            data: result.data.clone(),
        };
        let path = artifact
            .save(out_dir)
            .with_context(|| format!("Cannot write into {}", out_dir.display()))?;
        verbose!("Saved {}", path.display());
    }
    info!(
        "{} Saved {} images to {}",
        SUCCESS_PREFIX,
        results.len(),
        out_dir.display()
    );
    Ok(())
}

fn print_batch_statistics(outcome: &BatchOutcome) {
    let totals = &outcome.totals;

    info!("\n{} {}", SUCCESS_PREFIX, outcome.summary_message());
    info!("📊 Statistics:");
    info!("  ✅ Successful: {}", outcome.success_count());
    info!("  ❌ Failed: {}", outcome.failure_count());
    info!(
        "  {} {}",
        ORIGINAL_SIZE_PREFIX,
        format_file_size(totals.original_bytes)
    );
    info!(
        "  {} {}",
        COMPRESSED_SIZE_PREFIX,
        format_file_size(totals.compressed_bytes)
    );
    info!(
        "  💾 Saved: {} ({}%)",
        format_file_size(totals.saved_bytes()),
        totals.savings_percent()
    );
    info!("  ⏱️  Time: {:.2?}", outcome.elapsed);

    if outcome.stopped {
        warn!("Batch was stopped before every image was processed");
    }
    for failure in &outcome.failures {
        verbose!("{} failed: {}", failure.name, failure.message);
    }
}
