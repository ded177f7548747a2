//! Telegram-HTML rendering of analysis results and session headers

use chrono::{DateTime, Utc};

use crate::{
    analysis::{Analysis, AnalysisOutcome, PlanStatus},
    candle::Interval,
    detectors::LiquidityZone,
    plan::TradePlan,
    schedule::{AlertKind, SessionSchedule},
};

const FOOTER: &str = "\n---\nPowered by Liquidity Matrix Bot";

const TRADE_MANAGEMENT: &str = "Trade Management:\n\
- TP1 hit -> move SL to break-even\n\
- TP2 hit -> scale out 50%\n\
- TP3 -> leave runner or full close\n";

/// Render one symbol's outcome as a message body
pub fn format_report(outcome: &AnalysisOutcome) -> String {
    match outcome {
        AnalysisOutcome::Failed { error, .. } => {
            format!("⚠ Error fetching data: {}", escape_html(error))
        },
        AnalysisOutcome::Completed(analysis) => match &analysis.plan {
            PlanStatus::Ready(plan) => format_plan(analysis, plan),
            PlanStatus::NotApplicable => format!(
                "ℹ <b>{}</b>\nNo Sweep+Green confirmation found on {}.\n{}",
                escape_html(&analysis.symbol),
                analysis.coarse_interval.label(),
                snapshot(&analysis.liquidity),
            ),
            PlanStatus::Rejected { reason } => format!(
                "ℹ <b>{}</b>\nSweep+Green found on {} but no valid plan: {}\n{}",
                escape_html(&analysis.symbol),
                analysis.coarse_interval.label(),
                escape_html(reason),
                snapshot(&analysis.liquidity),
            ),
        },
    }
}

fn snapshot(zone: &LiquidityZone) -> String {
    format!(
        "Liquidity snapshot: Low {}, High {}\nLast close: {}",
        zone.recent_low, zone.recent_high, zone.last_close
    )
}

fn format_plan(analysis: &Analysis, plan: &TradePlan) -> String {
    let mut msg = format!(
        "<b>Pro SmartMoney Setup - {}</b>\n",
        escape_html(&analysis.symbol)
    );
    msg.push_str(&format!("Logic: {}\n", escape_html(&plan.rationale)));
    msg.push_str(&format!("Side: <b>{}</b>\n", plan.side));
    msg.push_str(&format!(
        "Entry: <code>{}</code>\nSL: <code>{}</code>\nTP: <code>{}</code>\nTP1: <code>{}</code>\n",
        plan.entry, plan.stop_loss, plan.take_profit, plan.tp1
    ));
    msg.push_str(&format!(
        "Confidence: {}%\n\n",
        (plan.confidence * 100.0).round() as u32
    ));
    msg.push_str(&format!(
        "Liquidity ({}): Low {}, High {}\n",
        window_span(analysis.liquidity_candles, analysis.coarse_interval),
        analysis.liquidity.recent_low,
        analysis.liquidity.recent_high
    ));
    msg.push_str(&format!(
        "Latest {} close: {}\n",
        analysis.coarse_interval.label(),
        analysis.latest_coarse.close
    ));
    msg.push_str(&escape_html(TRADE_MANAGEMENT));
    msg.push_str(FOOTER);
    msg
}

/// Wall-clock span covered by `candles` bars, e.g. `24h` for 96 x 15m
fn window_span(candles: usize, interval: Interval) -> String {
    let minutes = candles * interval.minutes() as usize;
    if minutes > 0 && minutes % 60 == 0 {
        format!("{}h", minutes / 60)
    } else {
        format!("{minutes}m")
    }
}

/// First message of a job, sent before any symbol is analyzed
pub fn format_session_header(
    kind: AlertKind,
    schedule: &SessionSchedule,
    at: DateTime<Utc>,
    symbols: &[String],
    coarse: Interval,
) -> String {
    let name = escape_html(&schedule.name);
    let local = schedule.local_time(at).format("%Y-%m-%d %H:%M");
    let title = match kind {
        AlertKind::PreSession => format!("Pre-{name} Alert"),
        AlertKind::PostOpen => format!("{name} Post-Open Alert"),
    };
    let scanning = match kind {
        AlertKind::PreSession => {
            let bases: Vec<&str> = symbols
                .iter()
                .map(|s| s.split('/').next().unwrap_or(s))
                .collect();
            format!("Scanning liquidity for {}...", escape_html(&bases.join(" & ")))
        },
        AlertKind::PostOpen => format!("Scanning for sweep+confirm on {}...", coarse.label()),
    };
    format!(
        "🕒 <b>{title}</b>\nTime ({}): {local}\n{scanning}",
        schedule.timezone.name()
    )
}

/// Escape text for Telegram's HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
