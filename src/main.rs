//! Entry point for amof-template.
//! Parses the CLI, sets up logging and dispatches to the library.

use amof_template::cleanup::{remove_empty_variables, CleanOptions};
use amof_template::cli::{Args, Command, CreateArgs, RemoveEmptyArgs};
use amof_template::dimensions::{LengthPrompt, NoPrompt, StdinPrompt};
use amof_template::file_info::{list_all_products, list_products};
use amof_template::generate::{make_products, Vocabulary};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("amof_template={level}")));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn create(
    args: CreateArgs,
    tag: String,
    vocab_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let no_prompt = args.no_prompt;
    let config = args.into_config(tag, vocab_dir)?;
    let vocab = Vocabulary::open(&config.tag, config.vocab_dir.as_deref()).await?;

    let mut prompt: Box<dyn LengthPrompt> = if no_prompt {
        Box::new(NoPrompt)
    } else {
        Box::new(StdinPrompt)
    };
    let generated = make_products(&config, &vocab, prompt.as_mut()).await?;

    for file in &generated {
        println!("✅ Created {}", file.path.display());
        for (variable, reason) in &file.summary.skipped {
            println!("   skipped {}: {}", variable, reason);
        }
    }
    Ok(())
}

async fn remove_empty(
    args: RemoveEmptyArgs,
    tag: String,
    vocab_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let vocab = Vocabulary::open(&tag, vocab_dir.as_deref()).await?;
    let options = CleanOptions {
        outfile: args.outfile,
        overwrite: args.overwrite,
    };
    let removed =
        remove_empty_variables(&args.infile, vocab.source(), &vocab.locator, &options).await?;

    if removed.is_empty() {
        println!("No empty variables in {}", args.infile.display());
    } else {
        println!("✅ Removed {} empty variables: {}", removed.len(), removed.join(", "));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Create(create_args) => create(create_args, args.tag, args.vocab_dir).await?,
        Command::ListProducts { instrument } => {
            let vocab = Vocabulary::open(&args.tag, args.vocab_dir.as_deref()).await?;
            let products = match &instrument {
                Some(name) => list_products(vocab.source(), &vocab.locator, name).await?,
                None => list_all_products(vocab.source(), &vocab.locator).await?,
            };
            for product in products {
                println!("{}", product);
            }
        }
        Command::RemoveEmpty(remove_args) => {
            remove_empty(remove_args, args.tag, args.vocab_dir).await?
        }
    }

    Ok(())
}
