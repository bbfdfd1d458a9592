use salescope_core::commands::chart::{self, ChartRunOptions};
use salescope_core::commands::summary::{self, SummaryRunOptions};
use salescope_core::{EngineResult, SuccessEnvelope};

use crate::cli::{Cli, Commands};

pub fn dispatch(cli: &Cli) -> EngineResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Chart {
            path,
            granularity,
            from,
            to,
            category,
            article,
            metrics,
            project,
            json: _,
        } => chart::run(ChartRunOptions {
            path: path.clone(),
            granularity: granularity.clone(),
            from: from.as_ref().map(|value| value.as_str().to_string()),
            to: to.as_ref().map(|value| value.as_str().to_string()),
            category: category.clone(),
            article: article.clone(),
            metrics: metrics.clone(),
            projection: *project,
        }),
        Commands::Summary {
            path,
            granularity,
            from,
            to,
            category,
            article,
            json: _,
        } => summary::run(SummaryRunOptions {
            path: path.clone(),
            granularity: granularity.clone(),
            from: from.as_ref().map(|value| value.as_str().to_string()),
            to: to.as_ref().map(|value| value.as_str().to_string()),
            category: category.clone(),
            article: article.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::parse_from;

    use super::dispatch;

    #[test]
    fn chart_dispatch_surfaces_source_errors() {
        let parsed = parse_from(["salescope", "chart", "/nonexistent/records.csv"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            let result = dispatch(&cli);
            assert!(result.is_err());
            if let Err(error) = result {
                assert_eq!(error.code, "source_read_failed");
            }
        }
    }

    #[test]
    fn summary_dispatch_surfaces_source_errors() {
        let parsed = parse_from(["salescope", "summary", "/nonexistent/records.csv"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            let result = dispatch(&cli);
            assert!(result.is_err());
            if let Err(error) = result {
                assert_eq!(error.code, "source_read_failed");
            }
        }
    }
}
