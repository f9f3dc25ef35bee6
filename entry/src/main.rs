/// taxotools: taxonomic classification of sequencing reads
///
/// This is the entry point for the taxotools CLI.
/// It is responsible for parsing the CLI arguments
/// and executing the appropriate subcommand [taxo-tool].
///
/// This wrapper offers 3 different subcommands:
/// - taxo-fit
/// - taxo-classify
/// - run
///
/// 'taxo-fit' fits a classifier pipeline on reference reads
/// with known taxonomic labels, either from an explicit JSON
/// specification or from a built-in catalog entry, and writes
/// a portable classifier artifact. 'taxo-classify' loads an
/// artifact and assigns taxonomy to query reads. 'run' chains
/// the two: fit on the reference, classify the query. Both
/// tools share the 'config' submodule, a configuration crate
/// with universal constants for the taxotools pipeline.
///
/// To get help on the subcommands, you can run:
///
/// ```shell
/// taxotools taxo-fit -- --help
/// ```
///
use clap::{Args, Parser, Subcommand};
use log::{error, Level};
use simple_logger::init_with_level;

use taxo_classify::lib_taxo_classify;
use taxo_fit::lib_taxo_fit;
use taxotools::lib;

#[derive(Parser)]
#[command(name = "taxotools")]
#[command(about = "taxotools: taxonomic classification of sequencing reads")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "taxo-fit")]
    Fit(ToolArgs),
    #[command(name = "taxo-classify")]
    Classify(ToolArgs),
    #[command(name = "run")]
    Run(ToolArgs),
}

#[derive(Args)]
struct ToolArgs {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    init_with_level(Level::Info).unwrap();
    let cli = Cli::parse();

    init();

    match cli.command {
        Commands::Fit(args) => {
            lib_taxo_fit(args.args).unwrap_or_else(|e| {
                error!("{}", e);
                std::process::exit(1);
            });
        }
        Commands::Classify(args) => {
            lib_taxo_classify(args.args).unwrap_or_else(|e| {
                error!("{}", e);
                std::process::exit(1);
            });
        }
        Commands::Run(args) => lib(args.args),
    }
}

fn init() {
    let message = format!(
        r#"

        taxotools: taxonomic classification of sequencing reads

        this is the entry point for the taxotools CLI
        and it is responsible for parsing the CLI arguments
        for each taxo-tool:

        - taxo-fit
        - taxo-classify

        > version: {}

        * to get help on the subcommands, run:
            taxotools <SUBCOMMAND> -- --help

        "#,
        env!("CARGO_PKG_VERSION")
    );

    println!("{}", message);
}
