use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum Command {
    Sync { dataset: String },
    ListDatasets,
}

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config_path: PathBuf,
    pub command: Command,
}

enum ParseOutcome {
    Args(CliArgs),
    Help,
}

fn usage() {
    eprintln!(
        "usage:
  sheetfeed --dataset <name> [--config <path>]
  sheetfeed --list-datasets
"
    );
}

fn parse_args_impl(mut args: impl Iterator<Item = String>) -> Result<ParseOutcome, String> {
    let mut config_path: Option<PathBuf> = None;
    let mut dataset: Option<String> = None;
    let mut list_datasets = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--config requires a value".to_string())?;
                config_path = Some(PathBuf::from(value));
            }
            "--dataset" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--dataset requires a value".to_string())?;
                dataset = Some(value);
            }
            "--list-datasets" => {
                list_datasets = true;
            }
            "-h" | "--help" | "help" => {
                return Ok(ParseOutcome::Help);
            }
            other => {
                return Err(format!("unrecognized argument `{other}`"));
            }
        }
    }

    let command = if list_datasets {
        Command::ListDatasets
    } else {
        match dataset {
            Some(dataset) => Command::Sync { dataset },
            None => return Err("--dataset is required (or use --list-datasets)".to_string()),
        }
    };

    Ok(ParseOutcome::Args(CliArgs {
        config_path: sheetfeed_config::resolve_config_path(config_path),
        command,
    }))
}

pub fn parse_args() -> CliArgs {
    match parse_args_impl(std::env::args().skip(1)) {
        Ok(ParseOutcome::Args(args)) => args,
        Ok(ParseOutcome::Help) => {
            usage();
            std::process::exit(0);
        }
        Err(error) => {
            eprintln!("error: {error}");
            usage();
            std::process::exit(2);
        }
    }
}
