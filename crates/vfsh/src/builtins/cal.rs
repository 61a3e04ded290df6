//! cal builtin - month calendar

use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};

use super::{Builtin, Context};
use crate::error::Result;
use crate::interpreter::ExecResult;

/// Width of one rendered week: seven two-column days plus separators.
const WEEK_WIDTH: usize = 20;

const WEEKDAY_HEADER: &str = "Mo Tu We Th Fr Sa Su";

/// The cal builtin - display a calendar.
///
/// Usage: cal [MONTH [YEAR]]
///
/// Weeks start on Monday. A month outside 1-12 or a year outside 1-9999
/// falls back to the current one.
pub struct Cal;

#[async_trait]
impl Builtin for Cal {
    async fn execute(&self, ctx: Context<'_>) -> Result<ExecResult> {
        let today = Local::now().date_naive();

        let month = ctx
            .args
            .first()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|m| (1..=12).contains(m))
            .unwrap_or_else(|| today.month());
        let year = ctx
            .args
            .get(1)
            .and_then(|s| s.parse::<i32>().ok())
            .filter(|y| (1..=9999).contains(y))
            .unwrap_or_else(|| today.year());

        let output = render_month(year, month).unwrap_or_else(|| {
            tracing::warn!(year, month, "cal: month out of range");
            String::new()
        });
        Ok(ExecResult::ok(output))
    }

    fn description(&self) -> &'static str {
        "Show calendar (cal [month] [year])"
    }
}

/// Render one month, Monday first.
///
/// The title is centered over the weekday header and trailing blanks are
/// trimmed from every line. Returns `None` for a month chrono cannot
/// represent.
pub fn render_month(year: i32, month: u32) -> Option<String> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days_in_month = (28..=31)
        .rev()
        .find(|&d| NaiveDate::from_ymd_opt(year, month, d).is_some())?;

    let title = format!("{} {}", first.format("%B"), year);
    let pad = WEEK_WIDTH.saturating_sub(title.len()) / 2;

    let mut output = String::new();
    output.push_str(&" ".repeat(pad));
    output.push_str(&title);
    output.push('\n');
    output.push_str(WEEKDAY_HEADER);
    output.push('\n');

    let offset = first.weekday().num_days_from_monday() as usize;
    let mut cells: Vec<String> = vec!["  ".to_string(); offset];
    cells.extend((1..=days_in_month).map(|d| format!("{:>2}", d)));

    for week in cells.chunks(7) {
        output.push_str(week.join(" ").trim_end());
        output.push('\n');
    }

    Some(output)
}
