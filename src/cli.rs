use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-shrink",
    about = "Shrink images by re-encoding them, never making a file larger",
    long_about = "img-shrink re-encodes images as JPEG or WebP, downscaling anything larger than \
                  4096 pixels on a side. Each image is tried at decreasing quality until it gets \
                  smaller than the original; if it never does, the original bytes are kept.",
    version,
    after_help = "EXAMPLES:\n  \
    img-shrink compress photo.png -o ./out\n  \
    img-shrink batch ./images ./compressed -r\n  \
    img-shrink batch \"./shots/*.jpg\" --no-archive -q 75"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Print per-attempt details",
        long_help = "Print extra details and enable debug diagnostics for this crate. \
                     RUST_LOG overrides the diagnostic filter when set."
    )]
    pub verbose: bool,
}

/// Encoder settings shared by every subcommand.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct EncodeArgs {
    #[arg(
        long,
        help = "Longest allowed edge in pixels (default: 4096)",
        long_help = "Images wider or taller than this are downscaled proportionally \
                     so that both sides fit."
    )]
    pub max_dimension: Option<u32>,

    #[arg(
        short = 'q',
        long,
        help = "Starting quality (1-100)",
        long_help = "Quality of the first encoding attempt. Defaults to 85 for PNG and WebP \
                     inputs and 80 for everything else."
    )]
    pub quality: Option<u8>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Qualities retried while the output is not smaller (default: 70,55)"
    )]
    pub retry_qualities: Option<Vec<u8>>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress a single image file",
        long_about = "Compress one image and write the result, named after the input with \
                      a .jpg or .webp extension, into the output directory."
    )]
    Compress {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(short = 'o', long, help = "Output directory (default: ./compressed)")]
        output: Option<PathBuf>,

        #[command(flatten)]
        encode: EncodeArgs,
    },

    #[command(
        about = "Compress a batch of images one after another",
        long_about = "Compress up to 50 images in order. A failing image is reported and \
                      skipped. Results are written as compressed-images.zip unless \
                      --no-archive is given or only one image succeeded."
    )]
    Batch {
        #[arg(
            help = "Input directory, file, or glob",
            long_help = "Input can be a directory path, a single file, or a glob expression. \
                         Examples: './images', '*.jpg', '/path/to/images/*.png'"
        )]
        input: String,

        #[arg(help = "Output directory path (default: ./compressed)")]
        output: Option<PathBuf>,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,

        #[arg(long, help = "Write each image separately instead of a zip archive")]
        no_archive: bool,

        #[command(flatten)]
        encode: EncodeArgs,
    },
}
