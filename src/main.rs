use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use datascope::{
    AppConfig, ClassifyOptions, ConfigManager, CorrelationFilter, OpenOptions, Session, APP_NAME,
};
use datascope_cli::Args;

/// Default minimum |r| for --corr-filter when --corr-threshold is not given.
const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.3;

fn init_tracing(debug: bool) {
    let default_level = if debug { "datascope=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// CLI flags override the config file; the config file overrides defaults.
fn open_options(args: &Args, config: &AppConfig) -> OpenOptions {
    let mut opts = OpenOptions::new();
    if let Some(delimiter) = args.delimiter.or(config.file_loading.delimiter) {
        opts = opts.with_delimiter(delimiter);
    }
    if let Some(no_header) = args.no_header {
        opts = opts.with_has_header(!no_header);
    } else if let Some(has_header) = config.file_loading.has_header {
        opts = opts.with_has_header(has_header);
    }
    if let Some(skip_rows) = args.skip_rows.or(config.file_loading.skip_rows) {
        opts = opts.with_skip_rows(skip_rows);
    }
    if let Some(n) = args
        .infer_schema_length
        .or(config.file_loading.infer_schema_length)
    {
        opts = opts.with_infer_schema_length(n);
    }
    if let Some(format) = args.format {
        opts = opts.with_format(format);
    }
    if let Some(sheet) = &args.excel_sheet {
        opts = opts.with_excel_sheet(sheet.clone());
    }
    if !args.null_value.is_empty() {
        opts = opts.with_null_values(args.null_value.clone());
    }
    opts.with_parse_dates(args.parse_dates.unwrap_or(config.file_loading.parse_dates))
}

fn classify_options(args: &Args, config: &AppConfig) -> ClassifyOptions {
    let mut options = ClassifyOptions::from(&config.classify);
    if let Some(cap) = args.cardinality_cap {
        options.cardinality_cap = cap;
    }
    if let Some(fraction) = args.cardinality_fraction {
        options.cardinality_fraction = fraction;
    }
    if let Some(cap) = args.unique_display_cap {
        options.unique_display_cap = cap;
    }
    if let Some(cap) = args.category_plot_cap {
        options.category_plot_cap = cap;
    }
    options
}

fn generate_config(force: bool) -> Result<()> {
    let manager = ConfigManager::new(APP_NAME)?;
    let path = manager.write_default_config(force)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_tracing(args.debug);

    if args.generate_config {
        return generate_config(args.force);
    }

    let path = args
        .path
        .as_deref()
        .ok_or_else(|| eyre!("No input file given"))?;
    let config = ConfigManager::new(APP_NAME)?.load()?;

    let mut session = Session::open(
        path,
        &open_options(&args, &config),
        classify_options(&args, &config),
    )
    .map_err(|e| eyre!("Failed to load {}: {}", path.display(), e))?;

    if let Some(base_column) = &args.corr_filter {
        session.set_correlation_filter(Some(CorrelationFilter {
            base_column: base_column.clone(),
            min_abs: args
                .corr_threshold
                .unwrap_or(DEFAULT_CORRELATION_THRESHOLD),
        }));
    }

    let report = session.analyze()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::parse_from(["datascope", "data.csv"])
    }

    #[test]
    fn cli_overrides_config() {
        let mut args = base_args();
        args.delimiter = Some(b';');
        args.cardinality_cap = Some(99);
        let mut config = AppConfig::default();
        config.file_loading.delimiter = Some(b'|');

        let opts = open_options(&args, &config);
        assert_eq!(opts.delimiter, Some(b';'));
        let classify = classify_options(&args, &config);
        assert_eq!(classify.cardinality_cap, 99);
    }

    #[test]
    fn config_applies_when_cli_silent() {
        let args = base_args();
        let mut config = AppConfig::default();
        config.file_loading.delimiter = Some(b'|');
        config.file_loading.parse_dates = false;
        config.classify.unique_display_cap = 7;

        let opts = open_options(&args, &config);
        assert_eq!(opts.delimiter, Some(b'|'));
        assert!(!opts.parse_dates);
        let classify = classify_options(&args, &config);
        assert_eq!(classify.unique_display_cap, 7);
    }

    #[test]
    fn no_header_flag_inverts_has_header() {
        let mut args = base_args();
        args.no_header = Some(true);
        let opts = open_options(&args, &AppConfig::default());
        assert_eq!(opts.has_header, Some(false));
    }
}
