use std::io::{prelude::*, stdin, stdout, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use chunkwise::{Chunker, ConllReader, TextEncoding};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "A program to label rows read from stdin with chunk tags.")]
struct Args {
    /// The directory containing the model files
    #[arg(long)]
    model_dir: PathBuf,

    /// The name shared by the model files
    #[arg(long)]
    prefix: String,

    /// Read and write text as ISO-8859-1 instead of UTF-8
    #[arg(long)]
    latin1: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let encoding = if args.latin1 {
        TextEncoding::Latin1
    } else {
        TextEncoding::Utf8
    };

    let mut chunker = Chunker::default();
    chunker.load_model(&args.model_dir, &args.prefix)?;

    let start = Instant::now();
    let mut reader = ConllReader::new(stdin().lock()).encoding(encoding);
    let (rows, labels) = chunker.chunk_from(&mut reader)?;

    let mut out = BufWriter::new(stdout().lock());
    for (row, label) in rows.iter().zip(&labels) {
        if row.is_empty() {
            writeln!(out)?;
            continue;
        }
        let line = format!("{} {}", row.join(" "), label);
        match encoding {
            TextEncoding::Utf8 => out.write_all(line.as_bytes())?,
            TextEncoding::Latin1 => {
                let bytes: Vec<u8> = line
                    .chars()
                    .map(|c| u8::try_from(c).unwrap_or(b'?'))
                    .collect();
                out.write_all(&bytes)?;
            }
        }
        writeln!(out)?;
    }
    out.flush()?;

    let duration = start.elapsed();
    tracing::info!(
        n_rows = rows.len(),
        elapsed_sec = duration.as_secs_f64(),
        "finish chunking"
    );

    Ok(())
}
