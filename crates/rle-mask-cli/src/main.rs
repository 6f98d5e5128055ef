use clap::{Parser, ValueEnum};
use log::info;
use rle_mask::mask::area;
use rle_mask::Mask;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "rle-decode")]
#[command(about = "Decode a run-length encoded segmentation mask into a dense 0/1 grid")]
struct Cli {
    /// Image shape as height,width
    #[arg(long, value_delimiter = ',', required = true)]
    shape: Vec<u32>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Grid)]
    format: Format,

    /// Encoded mask: whitespace-separated "start length" pairs (1-based starts)
    #[arg(allow_hyphen_values = true)]
    rle: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// One line per row, cells separated by spaces
    Grid,
    /// {"size": [h, w], "rows": [...], "area": n}
    Json,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    mask: &'a Mask,
    area: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let (h, w) = match cli.shape[..] {
        [h, w] => (h, w),
        _ => return Err("--shape takes exactly two values: height,width".into()),
    };

    info!("Decoding {} bytes of RLE into a {}x{} mask...", cli.rle.len(), h, w);
    let mask = rle_mask::decode(&cli.rle, h, w)?;

    match cli.format {
        Format::Grid => print!("{}", mask),
        Format::Json => {
            let out = JsonOutput {
                mask: &mask,
                area: area(&mask),
            };
            println!("{}", serde_json::to_string(&out)?);
        }
    }

    Ok(())
}
