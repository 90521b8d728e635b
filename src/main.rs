use chrono::{Datelike, NaiveDate};
use clap::{value_parser, Arg, ArgMatches, Command};
use mmstat_rust::calendar::{Calendar, Date};
use mmstat_rust::dataset::{Dataset, MaskedArray};
use mmstat_rust::multi_model_statistics;
use mmstat_rust::time_axis::{TimeAxis, TimeUnit};

fn main() {
    let matches = build_cli().get_matches();

    if let Err(e) = run_demo(&matches) {
        eprintln!("Ensemble statistics error: {}", e);
        std::process::exit(1);
    }
}

/// Build a synthetic monthly ensemble and run the statistics pipeline on it.
/// Members stamp their time points on different days of the month and odd
/// members use a 360-day calendar, so the demo exercises the full calendar
/// unification path. Loading real model output is left to external tooling.
fn run_demo(matches: &ArgMatches) -> Result<(), String> {
    let span = matches.get_one::<String>("span").unwrap();
    let statistics: Vec<&str> = matches
        .get_one::<String>("statistics")
        .unwrap()
        .split(',')
        .map(str::trim)
        .collect();
    let num_models = *matches.get_one::<usize>("models").unwrap();
    let num_months = *matches.get_one::<usize>("months").unwrap();
    let verbose = matches.get_flag("verbose");

    let start = NaiveDate::parse_from_str(matches.get_one::<String>("start-date").unwrap(), "%Y-%m-%d")
        .map_err(|_| "Invalid start date. Expected: YYYY-MM-DD".to_string())?;

    let mut datasets = Vec::with_capacity(num_models);
    for model in 0..num_models {
        let calendar = if model % 2 == 0 {
            Calendar::Gregorian
        } else {
            Calendar::Day360
        };
        let unit = TimeUnit::new(Date::new(start.year(), 1, 1), calendar);

        // Stamp months on day 5, 15 or 25 depending on the member
        let day_of_month = 5 + 10 * (model % 3) as u8;
        let dates: Vec<Date> = (0..num_months)
            .map(|k| {
                let months_total = start.month0() as usize + k;
                let year = start.year() + (months_total / 12) as i32;
                let month = (months_total % 12 + 1) as u8;
                Date::new(year, month, day_of_month)
            })
            .collect();
        let axis = TimeAxis::from_dates(&dates, unit).map_err(|e| e.to_string())?;

        let values: Vec<f64> = (0..num_months)
            .map(|t| 14.0 + model as f64 + (t as f64 * 0.6).sin() * 3.0)
            .collect();

        if verbose {
            println!(
                "Member {}: {} monthly points on day {} ({})",
                model,
                num_months,
                day_of_month,
                axis.units
            );
        }

        datasets.push(Dataset::new("tas", MaskedArray::from_values(values), axis));
    }

    let results =
        multi_model_statistics(&mut datasets, span, &statistics).map_err(|e| e.to_string())?;

    let reference = results
        .get(statistics[0])
        .ok_or_else(|| "missing result for first statistic".to_string())?;
    println!(
        "Ensemble of {} members, {} timesteps ('{}' span, unified to {})",
        num_models,
        reference.time.len(),
        span,
        reference.time.units
    );

    print!("{:>10}", "statistic");
    for date in reference.time.dates().map_err(|e| e.to_string())? {
        print!("  {:04}-{:02}-{:02}", date.year, date.month, date.day);
    }
    println!();

    for statistic in &statistics {
        if let Some(result) = results.get(*statistic) {
            print!("{:>10}", statistic);
            for value in result.values.data.iter() {
                print!("  {:10.3}", value);
            }
            println!();
        }
    }

    Ok(())
}

fn build_cli() -> Command {
    Command::new("mmstat_rust")
        .version("0.1.0")
        .about("Multi-model ensemble statistics demo")
        .arg(
            Arg::new("span")
                .short('s')
                .long("span")
                .value_name("POLICY")
                .help("Span policy: overlap (intersection) or full (union)")
                .value_parser(["overlap", "full"])
                .default_value("overlap"),
        )
        .arg(
            Arg::new("statistics")
                .short('t')
                .long("statistics")
                .value_name("LIST")
                .help("Comma-separated statistics (mean, median, std, min, max, pNN)")
                .default_value("mean,std,p95"),
        )
        .arg(
            Arg::new("models")
                .short('n')
                .long("models")
                .value_name("COUNT")
                .help("Number of synthetic ensemble members")
                .default_value("5")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("months")
                .short('m')
                .long("months")
                .value_name("COUNT")
                .help("Number of monthly timesteps per member")
                .default_value("12")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("start-date")
                .long("start-date")
                .value_name("DATE")
                .help("First month of the ensemble (YYYY-MM-DD)")
                .default_value("1850-01-01"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print per-member axis information")
                .action(clap::ArgAction::SetTrue),
        )
}
