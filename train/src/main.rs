use std::path::PathBuf;

use chunkwise::{
    Chunker, ConllReader, DataSource, EncoderConfig, LinearClassifier, Registry, SolverType,
    TextEncoding, TrainParams, WindowEncoder,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "A program to train chunking models.")]
struct Args {
    /// A labeled training corpus in the CoNLL format
    #[arg(long, required = true)]
    data: Vec<PathBuf>,

    /// The directory to write the model files to
    #[arg(long)]
    model_dir: PathBuf,

    /// The name shared by the model files
    #[arg(long)]
    prefix: String,

    /// The number of rows on each side used as context
    #[arg(long, default_value = "2")]
    window: usize,

    /// The number of preceding labels used as features
    #[arg(long, default_value = "2")]
    history: usize,

    /// The feature dictionary. {hashmap, indexer}
    #[arg(long, default_value = "hashmap")]
    dict: String,

    /// The solver. {0, 1, 2, 3, 4, 5, 6, 7} (see LIBLINEAR documentation for more details)
    #[arg(long, default_value = "1")]
    solver: SolverType,

    /// The epsilon stopping criterion for classifier training
    #[arg(long, default_value = "0.01")]
    eps: f64,

    /// The cost hyperparameter for classifier training
    #[arg(long, default_value = "1.0")]
    cost: f64,

    /// Read the corpus as ISO-8859-1 instead of UTF-8
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

    let mut rows = vec![];
    for path in &args.data {
        tracing::info!(?path, "loading");
        let mut reader = ConllReader::open(path)?.encoding(encoding);
        rows.append(&mut reader.read_rows()?);
    }
    tracing::info!(n_rows = rows.len(), "loaded dataset");

    let registry = Registry::default();
    let dictionary = registry.dictionary(&args.dict)?;
    let encoder = WindowEncoder::new(
        EncoderConfig {
            window_size: args.window,
            label_history_size: args.history,
        },
        dictionary,
    );
    let classifier = LinearClassifier::new(TrainParams {
        solver: args.solver,
        epsilon: args.eps,
        cost: args.cost,
        ..TrainParams::default()
    });
    let mut chunker = Chunker::with_registry(Box::new(encoder), Box::new(classifier), registry);

    tracing::info!("start training");
    chunker.train(&rows)?;
    tracing::info!("finish training");

    std::fs::create_dir_all(&args.model_dir)?;
    chunker.save_model(&args.model_dir, &args.prefix)?;

    Ok(())
}
