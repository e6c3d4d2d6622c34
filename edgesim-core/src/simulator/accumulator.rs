//! Running state folded over a trade sequence.
//!
//! Invariants after every `apply`: `peak_balance` never decreases, the
//! drawdown is `>= 0`, and `balance >= 0`. R is only credited on trades with
//! a positive amount at risk.

use crate::domain::{Cents, RunSummary, SimulatedTrade, StreakSummary, TradeOutcome};
use crate::generator::TradeDraw;
use crate::moments::RunningMoments;

/// Consecutive-outcome tracking. Breakevens close both kinds of streak.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakTracker {
    current_win: u32,
    current_loss: u32,
    summary: StreakSummary,
}

impl StreakTracker {
    pub fn push(&mut self, outcome: TradeOutcome) {
        match outcome {
            TradeOutcome::Win => {
                self.close_loss();
                self.current_win += 1;
                self.summary.longest_win = self.summary.longest_win.max(self.current_win);
            }
            TradeOutcome::Loss => {
                self.close_win();
                self.current_loss += 1;
                self.summary.longest_loss = self.summary.longest_loss.max(self.current_loss);
            }
            TradeOutcome::Breakeven => {
                self.close_win();
                self.close_loss();
            }
        }
    }

    fn close_win(&mut self) {
        if self.current_win > 0 {
            self.summary.win_streaks += 1;
            self.summary.win_streak_total += u64::from(self.current_win);
            self.current_win = 0;
        }
    }

    fn close_loss(&mut self) {
        if self.current_loss > 0 {
            self.summary.loss_streaks += 1;
            self.summary.loss_streak_total += u64::from(self.current_loss);
            self.current_loss = 0;
        }
    }

    /// Close any open streak and return the totals.
    pub fn finish(mut self) -> StreakSummary {
        self.close_win();
        self.close_loss();
        self.summary
    }
}

/// Balance, peak, drawdown, R and streak state for one run.
#[derive(Debug, Clone)]
pub struct EquityAccumulator {
    initial_balance: Cents,
    balance: Cents,
    peak_balance: Cents,
    min_balance: Cents,
    cumulative_r: f64,
    peak_r: f64,
    max_drawdown_pct: f64,
    max_drawdown_amount: Cents,
    max_drawdown_r: f64,
    total_commission: Cents,
    gross_profit_r: f64,
    gross_loss_r: f64,
    trades_taken: u32,
    wins: u32,
    losses: u32,
    breakevens: u32,
    streaks: StreakTracker,
    wiped_out: bool,
}

impl EquityAccumulator {
    pub fn new(initial_balance: Cents) -> Self {
        Self {
            initial_balance,
            balance: initial_balance,
            peak_balance: initial_balance,
            min_balance: initial_balance,
            cumulative_r: 0.0,
            peak_r: 0.0,
            max_drawdown_pct: 0.0,
            max_drawdown_amount: 0,
            max_drawdown_r: 0.0,
            total_commission: 0,
            gross_profit_r: 0.0,
            gross_loss_r: 0.0,
            trades_taken: 0,
            wins: 0,
            losses: 0,
            breakevens: 0,
            streaks: StreakTracker::default(),
            wiped_out: false,
        }
    }

    pub fn balance(&self) -> Cents {
        self.balance
    }

    pub fn peak_balance(&self) -> Cents {
        self.peak_balance
    }

    pub fn wiped_out(&self) -> bool {
        self.wiped_out
    }

    /// End the run because the balance can no longer fund a position: the
    /// risk amount rounds to zero cents. Counts as a wipe-out.
    pub fn mark_unfundable(&mut self) {
        self.wiped_out = true;
    }

    /// Current decline from the peak, in percent.
    pub fn drawdown_pct(&self) -> f64 {
        if self.peak_balance <= 0 {
            return 0.0;
        }
        (self.peak_balance - self.balance) as f64 / self.peak_balance as f64 * 100.0
    }

    /// Apply one drawn trade sized at `risk` with `commission` charged in cents.
    ///
    /// Balance arithmetic saturates, so a long compounding run with an extreme
    /// edge pins at `i64::MAX` instead of overflowing.
    pub fn apply(&mut self, draw: &TradeDraw, risk: Cents, commission: Cents) -> SimulatedTrade {
        let gross = (draw.r_result * risk as f64).round() as Cents;
        let before = self.balance;
        let after = before.saturating_add(gross).saturating_sub(commission).max(0);
        let pnl = after - before;

        self.balance = after;
        self.trades_taken += 1;
        self.total_commission = self.total_commission.saturating_add(commission);

        let net_r = draw.net_r();
        self.cumulative_r += net_r;
        if net_r > 0.0 {
            self.gross_profit_r += net_r;
        } else if net_r < 0.0 {
            self.gross_loss_r += -net_r;
        }

        match draw.outcome {
            TradeOutcome::Win => self.wins += 1,
            TradeOutcome::Loss => self.losses += 1,
            TradeOutcome::Breakeven => self.breakevens += 1,
        }
        self.streaks.push(draw.outcome);

        self.peak_balance = self.peak_balance.max(after);
        self.min_balance = self.min_balance.min(after);
        self.peak_r = self.peak_r.max(self.cumulative_r);

        let drawdown_pct = self.drawdown_pct();
        self.max_drawdown_pct = self.max_drawdown_pct.max(drawdown_pct);
        self.max_drawdown_amount = self.max_drawdown_amount.max(self.peak_balance - after);
        self.max_drawdown_r = self.max_drawdown_r.max(self.peak_r - self.cumulative_r);

        if after == 0 {
            self.wiped_out = true;
        }

        SimulatedTrade {
            trade_number: self.trades_taken,
            outcome: draw.outcome,
            is_win: draw.outcome == TradeOutcome::Win,
            r_result: draw.r_result,
            commission_r: draw.commission_r,
            pnl,
            balance_after: after,
            cumulative_r: self.cumulative_r,
            drawdown_pct,
        }
    }

    pub fn finish(self, returns: RunningMoments) -> RunSummary {
        RunSummary {
            initial_balance: self.initial_balance,
            final_balance: self.balance,
            final_r: self.cumulative_r,
            total_commission: self.total_commission,
            peak_balance: self.peak_balance,
            min_balance: self.min_balance,
            max_drawdown_pct: self.max_drawdown_pct,
            max_drawdown_amount: self.max_drawdown_amount,
            max_drawdown_r: self.max_drawdown_r,
            trades_taken: self.trades_taken,
            wins: self.wins,
            losses: self.losses,
            breakevens: self.breakevens,
            gross_profit_r: self.gross_profit_r,
            gross_loss_r: self.gross_loss_r,
            streaks: self.streaks.finish(),
            returns,
            wiped_out: self.wiped_out,
        }
    }
}
