use crate::cli::OutputFormat;
use crate::config::config;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let effective = config().redacted();

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&effective)?),
        OutputFormat::Text => print!("{}", serde_yaml::to_string(&effective)?),
    }
    Ok(())
}
