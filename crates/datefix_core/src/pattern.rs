use anyhow::{Context, Result, bail};
use regex::{Captures, Regex};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Render a day of month with its English ordinal suffix, e.g. 7 -> "7th",
/// 21 -> "21st". 11/12/13 take "th" despite their last digit.
pub fn ordinal_day(day: u32) -> String {
    let suffix = if day % 10 == 1 && day != 11 {
        "st"
    } else if day % 10 == 2 && day != 12 {
        "nd"
    } else if day % 10 == 3 && day != 13 {
        "rd"
    } else {
        "th"
    };
    format!("{day}{suffix}")
}

/// Compiled matcher for `[[<Month> <DD>, <YYYY>]]` daily-note links. Built
/// once at startup from the month list and the allowed year set, then passed
/// by reference wherever lines are rewritten; read-only after construction.
#[derive(Debug, Clone)]
pub struct DailyLinkPattern {
    regex: Regex,
}

impl DailyLinkPattern {
    pub fn new(allowed_years: &[u16]) -> Result<Self> {
        if allowed_years.is_empty() {
            bail!("allowed year set is empty");
        }
        for year in allowed_years {
            if !(1000..=9999).contains(year) {
                bail!("allowed year must be four digits: {year}");
            }
        }

        let months = MONTH_NAMES.join("|");
        let years = allowed_years
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&format!(r"\[\[({months}) (\d{{1,2}}), ({years})\]\]"))
            .context("failed to compile daily-note link pattern")?;
        Ok(Self { regex })
    }

    /// Rewrite every daily-note link on one line to the Roam-style ordinal
    /// form, left to right. Pure: same input always yields the same output.
    /// Returns the rewritten line and whether it differs from the input.
    pub fn rewrite_line(&self, line: &str) -> (String, bool) {
        let rewritten = self.regex.replace_all(line, |caps: &Captures<'_>| {
            let day: u32 = caps[2].parse().unwrap_or(0);
            if !(1..=31).contains(&day) {
                // Day out of range: decline the match, keep the text as-is.
                return caps[0].to_string();
            }
            format!("[[{} {}, {}]]", &caps[1], ordinal_day(day), &caps[3])
        });
        let changed = rewritten != line;
        (rewritten.into_owned(), changed)
    }
}
