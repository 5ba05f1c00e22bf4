use std::fs;
use std::path::PathBuf;

use chunkwise::{LabelCodes, ModelLocation, Registry};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "manipulate_model", about = "A program to inspect trained models.")]
struct Args {
    /// The directory containing the model files
    #[arg(long)]
    model_dir: PathBuf,

    /// The name shared by the model files
    #[arg(long)]
    prefix: String,

    /// Output the feature dictionary contained in the model.
    #[arg(long)]
    dump_dict: Option<PathBuf>,

    /// Output the label codes contained in the model.
    #[arg(long)]
    dump_labels: Option<PathBuf>,
}

#[derive(Deserialize, Serialize)]
struct FeatureRecord {
    index: u32,
    key: String,
}

#[derive(Deserialize, Serialize)]
struct LabelRecord {
    code: u32,
    label: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let loc = ModelLocation::new(&args.model_dir, &args.prefix);

    if let Some(path) = args.dump_dict {
        let encoder = Registry::default().load_encoder(loc)?;
        let mut entries = encoder.dictionary().entries();
        entries.sort_unstable_by_key(|&(_, index)| index);
        tracing::info!(?path, n_features = entries.len(), "saving dictionary file");
        let file = fs::File::create(path)?;
        let mut wtr = csv::Writer::from_writer(file);
        for (key, index) in entries {
            wtr.serialize(FeatureRecord { index, key })?;
        }
        wtr.flush()?;
    }

    if let Some(path) = args.dump_labels {
        let codes = LabelCodes::load(loc)?;
        tracing::info!(?path, n_labels = codes.len(), "saving label file");
        let file = fs::File::create(path)?;
        let mut wtr = csv::Writer::from_writer(file);
        for (label, code) in codes.entries() {
            wtr.serialize(LabelRecord { code, label })?;
        }
        wtr.flush()?;
    }

    Ok(())
}
