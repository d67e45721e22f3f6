use clap::Parser;

use api_generator::cli::Cli;
use api_generator::pipeline::{generate_model, read_descriptor};
use api_generator::{generate_interchange_model, ApiModel, Result};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let descriptor = read_descriptor(&cli.input)?;
    let model = generate_model(&descriptor)?;
    print_summary(&model);

    if let Some(interchange) = cli.interchange {
        let descriptor = read_descriptor(&interchange)?;
        let model = generate_interchange_model(&descriptor, &cli.interchange_prefix)?;
        print_summary(&model);
    }

    Ok(())
}

fn print_summary(model: &ApiModel) {
    for (namespace, count) in model.namespace_summary() {
        println!("{namespace}: {count} declarations");
    }
}
