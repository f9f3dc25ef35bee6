use taxo_classify::lib_taxo_classify;
use taxo_fit::lib_taxo_fit;

const KEYS: [&str; 3] = ["--reads", "--taxonomy", "--query"];
const DEFAULT_CATALOG: &str = "naive_bayes";

/// fit a classifier on the reference reads, then classify the query
pub fn lib(mut args: Vec<String>) {
    __check_args(&args);

    // the query reads go to the classify stage, the rest fits
    let pos = args
        .iter()
        .position(|arg| arg == "--query")
        .expect("ERROR: Missing --query argument");
    args.remove(pos);
    let query = if pos < args.len() {
        args.remove(pos)
    } else {
        log::error!("Missing value for --query");
        std::process::exit(1);
    };

    if !args.contains(&"--catalog".to_string()) && !args.contains(&"--spec".to_string()) {
        args.extend(vec!["--catalog".to_string(), DEFAULT_CATALOG.to_string()]);
    }

    let artifact = lib_taxo_fit(args)
        .expect("ERROR: Failed to fit classifier")
        .display()
        .to_string();

    let classification = lib_taxo_classify(vec![
        "--reads".to_string(),
        query,
        "--classifier".to_string(),
        artifact,
    ])
    .expect("ERROR: Failed to classify reads");

    log::info!("Classification written to {:?}", classification);
}

/// Check if all required arguments are present
fn __check_args(args: &Vec<String>) {
    for key in KEYS.iter() {
        if !args.contains(&key.to_string()) {
            log::error!("Missing required argument: {}", key);
            std::process::exit(1);
        }
    }
}
