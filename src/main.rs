use clap::Parser;
use offering_generator::{
    CliArgs, GeneratorConfig, GeneratorError, LoggingConfig, init_logging, run_generator,
};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let _guard = match init_logging(LoggingConfig::from_env()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("failed to initialize logging: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let cli = CliArgs::parse();
    match run(cli) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(category = err.kind().category(), error = %err, "generation failed");
            eprintln!("error: {err:#}");
            for hint in err.suggestions() {
                eprintln!("  hint: {hint}");
            }
            ExitCode::from(err.kind().exit_code())
        }
    }
}

fn run(cli: CliArgs) -> Result<PathBuf, GeneratorError> {
    let config = GeneratorConfig::from_args(cli)?;
    config.validate()?;
    run_generator(&config)
}
