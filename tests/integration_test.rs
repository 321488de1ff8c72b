//! End-to-end analysis tests against mock price sources.
//!
//! Tests cover:
//! - Sample-mean convergence for light- and heavy-tailed draws
//! - Pareto tail fit accuracy as the sample grows
//! - Source and ticker fallback feeding the return-density analysis

mod common;

use approx::assert_relative_eq;
use common::*;
use statplots::domain::convergence::{convergence_chart, run_convergence};
use statplots::domain::error::StatplotsError;
use statplots::domain::extreme_events::{extreme_events_chart, run_extreme_events};
use statplots::domain::return_density::{return_density_chart, run_return_density};
use statplots::domain::sampling::SampleDistribution;
use statplots::domain::settings::{ConvergenceSettings, FatTailSettings, KdeSettings};
use statplots::ports::price_source::PriceSource;

mod convergence {
    use super::*;

    #[test]
    fn light_tails_settle_heavy_tail_wanders() {
        let settings = ConvergenceSettings {
            samples: 50_000,
            distributions: vec![
                SampleDistribution::Normal { mean: 0.0, std_dev: 1.0 },
                SampleDistribution::Pareto { shape: 1.0, scale: 1.0 },
            ],
            ..ConvergenceSettings::default()
        };
        let series = run_convergence(&settings).unwrap();

        let normal = &series[0].cumulative_means;
        assert_relative_eq!(normal[normal.len() - 1], 0.0, epsilon = 0.03);

        // Pareto with α = 1 has no mean; its running mean grows like ln(n).
        assert!(series[1].distribution.theoretical_mean().is_none());
        let pareto = &series[1].cumulative_means;
        assert!(pareto[pareto.len() - 1] > 3.0);
    }

    #[test]
    fn chart_has_line_per_distribution_and_reference() {
        let settings = ConvergenceSettings {
            samples: 100,
            ..ConvergenceSettings::default()
        };
        let series = run_convergence(&settings).unwrap();
        let chart = convergence_chart(&series, settings.reference_mean);
        assert_eq!(chart.series.len(), 3);
        assert_eq!(chart.guides.len(), 1);
        let extent = chart.extent().unwrap();
        assert_eq!(extent.x_min, 0.0);
        assert_eq!(extent.x_max, 99.0);
    }
}

mod fat_tails {
    use super::*;

    fn mean_fit_error(n_data: usize) -> f64 {
        let seeds = 1..=5u64;
        let total: f64 = seeds
            .clone()
            .map(|seed| {
                let settings = FatTailSettings {
                    seed,
                    n_data,
                    n_simulated: 100,
                    ..FatTailSettings::default()
                };
                let result = run_extreme_events(&settings).unwrap();
                (result.fit.shape - settings.true_alpha).abs()
            })
            .sum();
        total / seeds.count() as f64
    }

    #[test]
    fn fitted_alpha_tightens_with_sample_size() {
        let errors: Vec<f64> = [2_000, 20_000, 200_000].into_iter().map(mean_fit_error).collect();
        assert!(errors[0] > errors[1], "errors {errors:?}");
        assert!(errors[1] > errors[2], "errors {errors:?}");
        assert!(errors[2] < 0.1, "errors {errors:?}");
    }

    #[test]
    fn large_sample_tail_is_top_five_percent() {
        let result = run_extreme_events(&FatTailSettings {
            n_data: 200_000,
            n_simulated: 100,
            ..FatTailSettings::default()
        })
        .unwrap();
        assert_eq!(result.tail.len(), 10_000);
    }

    #[test]
    fn fit_stays_in_bounds_for_light_truth() {
        let settings = FatTailSettings {
            true_alpha: 40.0,
            n_data: 2000,
            n_simulated: 100,
            ..FatTailSettings::default()
        };
        let result = run_extreme_events(&settings).unwrap();
        assert_relative_eq!(result.fit.shape, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn different_seeds_differ() {
        let a = run_extreme_events(&FatTailSettings {
            n_data: 2000,
            n_simulated: 100,
            ..FatTailSettings::default()
        })
        .unwrap();
        let b = run_extreme_events(&FatTailSettings {
            seed: 1,
            n_data: 2000,
            n_simulated: 100,
            ..FatTailSettings::default()
        })
        .unwrap();
        assert_ne!(a.threshold, b.threshold);
    }

    #[test]
    fn chart_legend_names_every_element() {
        let settings = FatTailSettings {
            n_data: 5000,
            n_simulated: 500,
            ..FatTailSettings::default()
        };
        let result = run_extreme_events(&settings).unwrap();
        let chart = extreme_events_chart(&result, &settings);
        let labels: Vec<&str> = chart.series.iter().filter_map(|s| s.label()).collect();
        assert_eq!(labels[0], "Historical Returns");
        assert_eq!(labels[1], "Simulated Extreme Events");
        assert!(labels[2].starts_with("Fitted Pareto PDF"));
        assert!(labels[3].starts_with("True Pareto PDF (α=2.50)"));
        assert!(chart.show_legend);
    }
}

mod return_density {
    use super::*;

    fn settings(tickers: &[&str]) -> KdeSettings {
        KdeSettings {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            start_date: date("2023-01-01"),
            end_date: date("2023-12-31"),
            ..KdeSettings::default()
        }
    }

    #[test]
    fn falls_back_to_second_source() {
        let stooq = MockPriceSource::new("stooq").with_error("AAPL", "rate limited");
        let yahoo = MockPriceSource::new("yahoo").with_bars("AAPL", walk_bars("AAPL", "2023-01-02", 120));
        let sources: Vec<&dyn PriceSource> = vec![&stooq, &yahoo];

        let density = run_return_density(&sources, &settings(&["AAPL"])).unwrap();
        assert_eq!(density.source_name, "yahoo");
        assert_eq!(density.returns.len(), 119);
        assert_eq!(*stooq.calls.borrow(), vec!["AAPL"]);
    }

    #[test]
    fn moves_to_next_ticker_when_all_sources_empty() {
        let stooq = MockPriceSource::new("stooq").with_bars("MSFT", walk_bars("MSFT", "2023-02-01", 60));
        let yahoo = MockPriceSource::new("yahoo");
        let sources: Vec<&dyn PriceSource> = vec![&stooq, &yahoo];

        let density = run_return_density(&sources, &settings(&["AAPL", "MSFT"])).unwrap();
        assert_eq!(density.ticker, "MSFT");
        assert_eq!(*yahoo.calls.borrow(), vec!["AAPL"]);
    }

    #[test]
    fn date_range_limits_history() {
        let stooq = MockPriceSource::new("stooq").with_bars("AAPL", walk_bars("AAPL", "2022-12-01", 90));
        let sources: Vec<&dyn PriceSource> = vec![&stooq];
        let density = run_return_density(&sources, &settings(&["AAPL"])).unwrap();
        // 2022-12-01 + 89 days = 2023-02-28; 59 bars from 2023-01-01 on.
        assert_eq!(density.returns.len(), 58);
    }

    #[test]
    fn everything_failing_surfaces_last_error() {
        let stooq = MockPriceSource::new("stooq").with_error("AAPL", "down").with_error("MSFT", "down");
        let yahoo = MockPriceSource::new("yahoo").with_error("MSFT", "symbol delisted");
        let sources: Vec<&dyn PriceSource> = vec![&stooq, &yahoo];

        let err = run_return_density(&sources, &settings(&["AAPL", "MSFT"])).unwrap_err();
        assert_eq!(err.exit_status(), 3);
        match err.root_cause() {
            StatplotsError::Source { source_name, ticker, reason } => {
                assert_eq!(source_name, "yahoo");
                assert_eq!(ticker, "MSFT");
                assert_eq!(reason, "symbol delisted");
            }
            other => panic!("unexpected root cause: {other}"),
        }
    }

    #[test]
    fn too_short_history_is_insufficient_data() {
        let stooq = MockPriceSource::new("stooq").with_bars("AAPL", walk_bars("AAPL", "2023-03-01", 3));
        let sources: Vec<&dyn PriceSource> = vec![&stooq];
        let err = run_return_density(&sources, &settings(&["AAPL"])).unwrap_err();
        assert!(matches!(err, StatplotsError::InsufficientData { have: 2, .. }));
        assert_eq!(err.exit_status(), 5);
    }

    #[test]
    fn density_curve_integrates_to_about_one() {
        let stooq = MockPriceSource::new("stooq").with_bars("AAPL", walk_bars("AAPL", "2023-01-02", 250));
        let sources: Vec<&dyn PriceSource> = vec![&stooq];
        let density = run_return_density(&sources, &settings(&["AAPL"])).unwrap();

        let xs = &density.curve.xs;
        let dx = xs[1] - xs[0];
        let area: f64 = density.curve.densities.iter().sum::<f64>() * dx;
        assert_relative_eq!(area, 1.0, epsilon = 0.02);

        let chart = return_density_chart(&density);
        assert_eq!(chart.series[0].label(), Some("AAPL (stooq)"));
    }
}
