use clap::Parser;
use config::{validate, ArgCheck, CliError, SPEC_EXTENSIONS};
use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(
        short = 'r',
        long = "reads",
        value_name = "PATH",
        required_unless_present = "list",
        help = "Path to FASTA file with reference reads"
    )]
    pub reads: Option<PathBuf>,

    #[arg(
        short = 'x',
        long = "taxonomy",
        value_name = "PATH",
        required_unless_present = "list",
        help = "Path to TSV file mapping read id to taxonomic string"
    )]
    pub taxonomy: Option<PathBuf>,

    #[arg(
        short = 's',
        long = "spec",
        value_name = "PATH",
        conflicts_with = "catalog",
        help = "Path to a pipeline specification [.json]"
    )]
    pub spec: Option<PathBuf>,

    #[arg(
        short = 'n',
        long = "catalog",
        value_name = "NAME",
        help = "Name of a built-in classifier specification"
    )]
    pub catalog: Option<String>,

    #[arg(
        long = "set",
        value_name = "KEY=VALUE",
        requires = "catalog",
        help = "Override a derived parameter of a catalog classifier"
    )]
    pub set: Vec<String>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        default_value = config::CLASSIFIER,
        help = "Path to output classifier artifact"
    )]
    pub output: PathBuf,

    #[arg(
        short = 'l',
        long = "list",
        help = "List built-in classifier registrations and exit"
    )]
    pub list: bool,
}

impl ArgCheck for Args {
    fn get_reads(&self) -> Vec<&PathBuf> {
        self.reads.iter().collect()
    }

    fn get_tables(&self) -> Vec<&PathBuf> {
        self.taxonomy.iter().collect()
    }

    fn check(&self) -> Result<(), CliError> {
        if self.list {
            return Ok(());
        }

        self.validate_args()
    }

    fn validate_args(&self) -> Result<(), CliError> {
        self.check_reads()?;

        for table in self.get_tables() {
            validate(table, config::TABLE_EXTENSIONS)?;
        }

        match (&self.spec, &self.catalog) {
            (Some(spec), None) => validate(spec, SPEC_EXTENSIONS),
            (None, Some(_)) => Ok(()),
            _ => Err(CliError::InvalidInput(
                "exactly one of --spec or --catalog is required".to_string(),
            )),
        }
    }
}

impl From<Vec<String>> for Args {
    fn from(args: Vec<String>) -> Self {
        Args::parse_from(std::iter::once("taxo-fit".to_string()).chain(args))
    }
}
