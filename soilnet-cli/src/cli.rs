use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input image path.
    /// Example: --input /path/to/field1.jpg --input /path/to/field2.jpg
    #[arg(short, long, required = true)]
    pub input: Vec<PathBuf>,

    /// Path to the exported SoilNet ONNX artifact.
    #[arg(short, long, default_value = "models/SoilNet.onnx")]
    pub model: PathBuf,

    /// Number of threads the runtime may use for a single operation. Must be greater than 0 and less than 65536.
    /// Example: --threads 8
    #[arg(short, long, default_value = "4", value_parser = clap::value_parser!(u16).range(1..))]
    pub threads: u16,

    /// Number of top inferred class probabilities to show. Must be greater than 0 and less or equal than 4.
    /// Example: --show 2
    #[arg(short, long, default_value = "4", value_parser = clap::value_parser!(u16).range(1..=4))]
    pub show: u16,
}
