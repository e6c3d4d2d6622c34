//! Markdown report generator.

use crate::result::MonteCarloResult;

fn money(cents: f64) -> String {
    format!("${:.2}", cents / 100.0)
}

/// Render a human-readable summary of a Monte Carlo result.
pub fn render_markdown(result: &MonteCarloResult) -> String {
    let stats = result.statistics();
    let mut report = format!(
        "# EdgeSim Monte Carlo Report\n\n\
Mode: `{}`  \n\
Seed: `{}`  \n\
Simulations: {}  \n\
Initial balance: {}\n\n\
## Outcomes\n\
| | Worst (5%) | Median | Mean | Best (95%) |\n\
|---|---|---|---|---|\n\
| Final R | {:+.2} | {:+.2} | {:+.2} | {:+.2} |\n\
| Final balance | {} | {} | {} | {} |\n\
| Return | {:+.2}% | {:+.2}% | {:+.2}% | {:+.2}% |\n\n\
## Risk\n\
- Profitable runs: {:.1}%\n\
- Ruin probability: {:.2}%\n\
- Wiped-out runs: {}\n\
- Sharpe: {:.3}\n\
- Sortino: {:.3}\n\
- Profit factor: {}\n\
- Max drawdown (median / worst): {:.2}% / {:.2}%\n\
- Max drawdown R (median / worst): {:.2}R / {:.2}R\n\n\
## Streaks\n\
- Expected longest win streak: {:.2}\n\
- Expected longest loss streak: {:.2}\n\
- Average win streak: {:.2}\n\
- Average loss streak: {:.2}\n",
        result.mode(),
        result.master_seed(),
        stats.simulation_count,
        money(result.initial_balance() as f64),
        stats.final_r.worst_case,
        stats.final_r.median,
        stats.final_r.mean,
        stats.final_r.best_case,
        money(stats.final_balance.worst_case),
        money(stats.final_balance.median),
        money(stats.final_balance.mean),
        money(stats.final_balance.best_case),
        stats.return_pct.worst_case,
        stats.return_pct.median,
        stats.return_pct.mean,
        stats.return_pct.best_case,
        stats.profitable_pct,
        stats.ruin_probability * 100.0,
        stats.wiped_out_runs,
        stats.sharpe_ratio,
        stats.sortino_ratio,
        stats.profit_factor,
        stats.max_drawdown_pct.median,
        stats.max_drawdown_pct.worst,
        stats.max_drawdown_r.median,
        stats.max_drawdown_r.worst,
        stats.expected_max_win_streak,
        stats.expected_max_loss_streak,
        stats.average_win_streak,
        stats.average_loss_streak,
    );

    if let MonteCarloResult::Daily(daily) = result {
        let cal = &daily.calendar;
        report.push_str(&format!(
            "\n## Calendar\n\
- Days simulated (avg): {:.1}\n\
- Loss recovery days (avg): {:.1}\n\
- Gain compounding days (avg): {:.1}\n\
- Skipped by weekly limit (avg): {:.1}\n\
- Skipped by monthly limit (avg): {:.1}\n\
- Mean annualized return: {:+.2}%\n\
- Calmar: {:.3}\n",
            cal.average_days_simulated,
            cal.average_loss_recovery_days,
            cal.average_gain_compounding_days,
            cal.average_skipped_weekly_days,
            cal.average_skipped_monthly_days,
            cal.mean_annualized_return_pct,
            cal.calmar_ratio,
        ));
    }

    let buckets = result.distribution_buckets();
    if !buckets.is_empty() {
        report.push_str("\n## Final Balance Distribution\n\n");
        report.push_str("| From | To | Runs | Share |\n");
        report.push_str("|------|----|------|-------|\n");
        for b in buckets {
            report.push_str(&format!(
                "| {} | {} | {} | {:.1}% |\n",
                money(b.range_start),
                money(b.range_end),
                b.count,
                b.percentage
            ));
        }
    }

    report
}
