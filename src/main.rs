use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde_json::json;

use pl_stats::config::StatsConfig;
use pl_stats::export::{WorkbookExport, export_workbook};
use pl_stats::filter::{FilterSpec, position_from_label};
use pl_stats::summary::{find_player, team_summary};
use pl_stats::{Comparison, EmptyResultNotice, RankedEntry, StatKey, compare, filter, load_csv, top_n};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config = StatsConfig::from_env();
    if let Some(path) = arg_value(&args, "--csv") {
        config.csv_path = PathBuf::from(path);
    }
    if let Some(path) = arg_value(&args, "--export") {
        config.export_path = Some(PathBuf::from(path));
    }
    if let Some(n) = arg_value(&args, "--top") {
        config.top_n = n
            .parse::<usize>()
            .with_context(|| format!("invalid --top value {n:?}"))?
            .max(1);
    }
    if let Some(m) = arg_value(&args, "--min-minutes") {
        config.min_minutes = m
            .parse::<u32>()
            .with_context(|| format!("invalid --min-minutes value {m:?}"))?;
        config.floor_all_stats = true;
    }
    let metric = match arg_value(&args, "--metric") {
        Some(name) => name.parse::<StatKey>()?,
        None => StatKey::Goals,
    };
    let as_json = args.iter().any(|a| a == "--json");

    let loaded = load_csv(&config.csv_path)
        .with_context(|| format!("unable to load {}", config.csv_path.display()))?;
    let table = &loaded.table;

    let mut spec = FilterSpec::new();
    spec.team = arg_value(&args, "--team").map(str::to_string);
    spec.position = arg_value(&args, "--position").and_then(position_from_label);
    spec.search = arg_value(&args, "--search").map(str::to_string);

    let outcome = filter(table, &spec);
    let notice = outcome.notice().cloned();
    let view = outcome.into_view();
    let floor = config.leaderboard_floor(metric);
    let leaderboard = top_n(&view, metric, config.top_n, floor);

    let comparison = match arg_value(&args, "--compare") {
        Some(pair) => Some(resolve_comparison(table, pair)?),
        None => None,
    };

    if as_json {
        let out = json!({
            "players_loaded": table.len(),
            "warnings": loaded.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
            "team_summary": spec.selected_team().map(|_| team_summary(&view)),
            "notice": notice,
            "metric": metric,
            "leaderboard": leaderboard,
            "comparison": comparison,
        });
        println!("{}", serde_json::to_string_pretty(&out).context("serialize report")?);
    } else {
        print_report(loaded.warnings.len(), table.len(), &spec, &view, notice.as_ref());
        print_leaderboard(metric, floor, &leaderboard);
        if let Some(cmp) = comparison.as_ref() {
            print_comparison(cmp);
        }
    }

    if let Some(path) = config.export_path.as_ref() {
        let report = export_workbook(
            path,
            &WorkbookExport {
                players: view.rows().to_vec(),
                leaderboards: vec![(metric, leaderboard.clone())],
                comparison,
            },
        )?;
        eprintln!(
            "Exported {} players, {} leaderboard rows to {}",
            report.players,
            report.leaderboard_rows,
            path.display()
        );
    }

    Ok(())
}

fn resolve_comparison<'a>(table: &'a pl_stats::PlayerTable, pair: &str) -> Result<Comparison<'a>> {
    let (a, b) = pair
        .split_once('|')
        .ok_or_else(|| anyhow!("--compare expects \"Player A|Player B\""))?;
    let a = find_player(table, a, None).ok_or_else(|| anyhow!("player not found: {}", a.trim()))?;
    let b = find_player(table, b, None).ok_or_else(|| anyhow!("player not found: {}", b.trim()))?;
    Ok(compare(a, b))
}

fn print_report(
    warnings: usize,
    loaded: usize,
    spec: &FilterSpec,
    view: &pl_stats::View<'_>,
    notice: Option<&EmptyResultNotice>,
) {
    println!("Players loaded: {loaded}");
    if warnings > 0 {
        println!("Load warnings: {warnings} (set RUST_LOG=warn for details)");
    }
    if let Some(team) = spec.selected_team() {
        let s = team_summary(view);
        println!("{team}: {} players, {} goals, {} assists", s.players, s.goals, s.assists);
    }
    match notice {
        Some(EmptyResultNotice::NoSearchMatch { query }) => {
            println!("No players match \"{query}\"");
        }
        Some(EmptyResultNotice::NoRowsInCategory) => println!("No players in this selection"),
        None => println!("Rows in view: {}", view.len()),
    }
}

fn print_leaderboard(metric: StatKey, floor: Option<u32>, entries: &[RankedEntry<'_>]) {
    if entries.is_empty() {
        return;
    }
    println!();
    match floor {
        Some(min) => println!("Top {} by {} (min {min} minutes)", entries.len(), metric.label()),
        None => println!("Top {} by {}", entries.len(), metric.label()),
    }
    for entry in entries {
        println!(
            "{:>3}. {:<28} {:<20} {:>8}",
            entry.rank,
            entry.row.player(),
            entry.row.team(),
            entry.value.display(metric.decimals())
        );
    }
}

fn print_comparison(cmp: &Comparison<'_>) {
    println!();
    println!(
        "{} ({}) vs {} ({})",
        cmp.a.row.player(),
        cmp.a.row.team(),
        cmp.b.row.player(),
        cmp.b.row.team()
    );
    for d in &cmp.deltas {
        let decimals = d.stat.decimals();
        println!(
            "  {:<14} {:>8} {:>8} {:>8}",
            d.stat.label(),
            d.a.display(decimals),
            d.b.display(decimals),
            d.delta.display(decimals)
        );
    }
    println!(
        "  {:<14} {:>8} {:>8}",
        "Goals/Game",
        cmp.a.per_game.goals.display(2),
        cmp.b.per_game.goals.display(2)
    );
    println!(
        "  {:<14} {:>8} {:>8}",
        "Assists/Game",
        cmp.a.per_game.assists.display(2),
        cmp.b.per_game.assists.display(2)
    );
}

/// `--flag value` or `--flag=value`; blank values are ignored.
fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(flag).and_then(|rest| rest.strip_prefix('=')) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed);
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim());
            }
        }
    }
    None
}
