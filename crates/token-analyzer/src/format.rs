//! Report Formatter
//!
//! Renders a `TokenReport` as a fixed sequence of text sections. Missing
//! values print as "not available" so every section is always present.

use chrono::DateTime;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::report::{Count, Figure, Percent, TokenReport, TradingPair};

pub const NOT_AVAILABLE: &str = "not available";

/// Section headings, in output order
pub const SECTIONS: [&str; 7] = [
    "📊 BASIC INFORMATION",
    "💯 SECURITY SCORE",
    "👥 HOLDER STATISTICS",
    "💧 LIQUIDITY INFORMATION",
    "🔒 SECURITY CHECKS",
    "🍯 HONEYPOT CHECK",
    "🔗 EXTERNAL LINKS",
];

const MAX_PAIRS: usize = 3;

/// Render the full analysis report
#[must_use]
pub fn format_report(report: &TokenReport) -> String {
    let info = &report.token_information;
    let score = &report.token_score;
    let holders = &report.market_checks.holders_checks;
    let liquidity = &report.market_checks.liquidity_checks.aggregated_information;

    let mut out = String::from("🔎 TOKEN ANALYSIS REPORT\n");
    out.push_str(&"=".repeat(50));
    out.push('\n');

    let basic = vec![
        format!("Name: {}", text_or_na(info.token_name.as_deref())),
        format!("Symbol: {}", text_or_na(info.token_symbol.as_deref())),
        format!("Address: {}", text_or_na(info.token_address.as_deref())),
        format!("Creation Date: {}", creation_date(info.token_creation_date.as_deref())),
        format!("Total Supply: {}", figure_with(info.total_supply.as_ref(), Style::Number)),
    ];

    let security_score = vec![
        format!("Overall Score: {}", percent(&score.total_score)),
        format!("Code Score: {}", percent(&score.code_score)),
        format!("Market Score: {}", percent(&score.market_score)),
    ];

    let holder_stats = vec![
        format!("Total Holders: {}", count_with(&holders.holders_count, Style::Count)),
        format!("Top 3 Holders: {}", percent(&holders.percent_distributed.top_three)),
        format!("Top 10 Holders: {}", percent(&holders.percent_distributed.top_ten)),
    ];

    let mut liquidity_lines = vec![
        format!("Total Liquidity: {}", count_with(&liquidity.total_lp_supply_in_usd, Style::Usd)),
        format!("LP Holders: {}", count_with(&liquidity.lp_holder_count, Style::Count)),
        format!("Trading Pairs: {}", count_with(&liquidity.trading_pair_count, Style::Count)),
    ];
    liquidity_lines.extend(pair_lines(&report.market_checks.pair_by_pair_information));

    let checks: Vec<String> = report
        .code_checks
        .ownership_findings()
        .into_iter()
        .map(|f| format!("{} {}", if f.passed { "✅" } else { "❌" }, f.description))
        .collect();

    let honeypot = vec![match report.honeypot_details.is_honeypot() {
        Some(false) => "✅ Not a honeypot".to_string(),
        Some(true) => "⚠️ Potential honeypot detected".to_string(),
        None => NOT_AVAILABLE.to_string(),
    }];

    let links: Vec<String> = info
        .external_links
        .iter()
        .filter_map(|(name, url)| {
            let url = url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
            Some(format!("• {name}: {url}"))
        })
        .collect();

    let bodies = [basic, security_score, holder_stats, liquidity_lines, checks, honeypot, links];
    for (title, lines) in SECTIONS.iter().zip(bodies) {
        push_section(&mut out, title, &lines);
    }

    out.truncate(out.trim_end().len());
    out
}

fn push_section(out: &mut String, title: &str, lines: &[String]) {
    out.push_str(&format!("\n{title}\n{}\n", "-".repeat(title.chars().count())));
    if lines.is_empty() {
        out.push_str(NOT_AVAILABLE);
        out.push('\n');
    }
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
}

fn pair_lines(pairs: &[TradingPair]) -> Vec<String> {
    if pairs.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![String::new(), "Top Trading Pairs:".to_string()];
    for pair in pairs.iter().take(MAX_PAIRS) {
        lines.push(format!(
            "• {}/{} on {}",
            text_or_na(pair.token0_symbol.as_deref()),
            text_or_na(pair.token1_symbol.as_deref()),
            text_or_na(pair.dex_name.as_deref()),
        ));
        lines.push(format!("  Liquidity: {}", figure_with(pair.lp_supply_in_usd.as_ref(), Style::Usd)));
        lines.push(format!("  Pair Address: {}", text_or_na(pair.pair_address.as_deref())));
    }
    lines
}

fn text_or_na(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(NOT_AVAILABLE)
}

/// Date part of an ISO timestamp
fn creation_date(value: Option<&str>) -> String {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return NOT_AVAILABLE.to_string();
    };
    DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| raw.split('T').next().unwrap_or(raw).to_string(),
        |dt| dt.date_naive().to_string(),
    )
}

fn percent(value: &Percent) -> String {
    figure_with(value.percent.as_ref(), Style::Percent)
}

fn count_with(value: &Count, style: Style) -> String {
    figure_with(value.number.as_ref(), style)
}

/// Render a figure, or "not available" when absent or not a number
fn figure_with(value: Option<&Figure>, style: Style) -> String {
    let Some(figure) = value else {
        return NOT_AVAILABLE.to_string();
    };
    figure
        .to_decimal()
        .map(|d| style.decimal(d))
        .or_else(|| WideDecimal::parse(&figure.to_string()).map(|w| style.wide(&w)))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[derive(Clone, Copy, Debug)]
enum Style {
    Number,
    Count,
    Percent,
    Usd,
}

impl Style {
    fn decimal(self, value: Decimal) -> String {
        match self {
            Self::Number => format_number(value),
            Self::Count => format_count(value),
            Self::Percent => format_percent(value),
            Self::Usd => format_usd(value),
        }
    }

    /// Same layout as `decimal`, for figures beyond `Decimal`'s range or scale
    fn wide(self, value: &WideDecimal) -> String {
        match self {
            Self::Number => value.cents(true),
            Self::Count if value.is_whole() => value.whole(),
            Self::Count => value.cents(true),
            Self::Percent => format!("{}%", value.cents(false)),
            Self::Usd if !value.negative && value.int.len() > 6 => {
                format!("${}M", value.shifted(6).cents(false))
            }
            Self::Usd if !value.negative && value.int.len() > 3 => {
                format!("${}K", value.shifted(3).cents(false))
            }
            Self::Usd => format!("${}", value.cents(false)),
        }
    }
}

/// Exact decimal digits of a numeric string, unbounded in size and scale
#[derive(Clone, Debug, PartialEq, Eq)]
struct WideDecimal {
    negative: bool,
    /// Integer digits, no leading zeros ("0" for none)
    int: String,
    /// Fraction digits
    frac: String,
}

impl WideDecimal {
    const MAX_EXPONENT: i64 = 1_000;

    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (negative, unsigned) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
            Some(i) => (&unsigned[..i], unsigned[i + 1..].parse::<i64>().ok()?),
            None => (unsigned, 0),
        };
        if exponent.abs() > Self::MAX_EXPONENT {
            return None;
        }

        let (int_digits, frac_digits) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let digits = format!("{int_digits}{frac_digits}");
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let point = i64::try_from(int_digits.len()).ok()? + exponent;
        let (int, frac) = if point <= 0 {
            let zeros = "0".repeat(usize::try_from(-point).ok()?);
            (String::new(), format!("{zeros}{digits}"))
        } else {
            let point = usize::try_from(point).ok()?;
            if point >= digits.len() {
                (format!("{digits}{}", "0".repeat(point - digits.len())), String::new())
            } else {
                (digits[..point].to_string(), digits[point..].to_string())
            }
        };

        Some(Self::new(negative, &int, frac))
    }

    fn new(negative: bool, int: &str, frac: String) -> Self {
        let int = int.trim_start_matches('0');
        Self {
            negative,
            int: if int.is_empty() { "0".into() } else { int.into() },
            frac,
        }
    }

    fn is_whole(&self) -> bool {
        self.frac.bytes().all(|b| b == b'0')
    }

    /// Divide by `10^places`
    fn shifted(&self, places: usize) -> Self {
        if self.int.len() > places {
            let split = self.int.len() - places;
            Self::new(
                self.negative,
                &self.int[..split],
                format!("{}{}", &self.int[split..], self.frac),
            )
        } else {
            let zeros = "0".repeat(places - self.int.len());
            Self::new(self.negative, "", format!("{zeros}{}{}", self.int, self.frac))
        }
    }

    fn sign(&self, digits: &str) -> &'static str {
        if self.negative && digits.bytes().any(|b| b != b'0') { "-" } else { "" }
    }

    fn whole(&self) -> String {
        format!("{}{}", self.sign(&self.int), group_thousands(&self.int))
    }

    /// Two decimals, rounded half away from zero
    fn cents(&self, grouped: bool) -> String {
        let frac: Vec<u8> = self.frac.bytes().chain(std::iter::repeat(b'0')).take(3).collect();
        let mut digits: Vec<u8> = self.int.bytes().chain(frac[..2].iter().copied()).collect();

        if frac[2] >= b'5' {
            let mut carry = true;
            for d in digits.iter_mut().rev() {
                if *d == b'9' {
                    *d = b'0';
                } else {
                    *d += 1;
                    carry = false;
                    break;
                }
            }
            if carry {
                digits.insert(0, b'1');
            }
        }

        let digits: String = digits.into_iter().map(char::from).collect();
        let (int, cents) = digits.split_at(digits.len() - 2);
        let int = if grouped { group_thousands(int) } else { int.to_string() };
        format!("{}{int}.{cents}", self.sign(&digits))
    }
}

/// `1234567.891` → `1,234,567.89`
#[must_use]
pub fn format_number(value: Decimal) -> String {
    let fixed = format!("{:.2}", round2(value));
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}.{frac_part}", group_thousands(int_part))
}

/// Whole numbers without decimals, fractional values as `format_number`
#[must_use]
pub fn format_count(value: Decimal) -> String {
    if value.fract().is_zero() {
        group_thousands(&value.trunc().to_string())
    } else {
        format_number(value)
    }
}

/// `12.3456` → `12.35%`
#[must_use]
pub fn format_percent(value: Decimal) -> String {
    format!("{:.2}%", round2(value))
}

/// Abbreviated dollars: `$1.23M`, `$4.56K`, `$7.89`
#[must_use]
pub fn format_usd(value: Decimal) -> String {
    let million = Decimal::from(1_000_000);
    let thousand = Decimal::from(1_000);

    if value >= million {
        format!("${:.2}M", round2(value / million))
    } else if value >= thousand {
        format!("${:.2}K", round2(value / thousand))
    } else {
        format!("${:.2}", round2(value))
    }
}

/// Half-up rounding to cents; `round_dp` alone rounds half-to-even
fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = digits.strip_prefix('-').map_or(("", digits), |d| ("-", d));
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}
