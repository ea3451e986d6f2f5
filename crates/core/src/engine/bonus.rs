//! Welcome-bonus description parsing.
//!
//! Descriptions are free text written by issuers ("60,000 points after $4,000
//! spend", "$200 cash back", "5% back up to $300"). They are read by a short
//! ordered list of extraction rules; the first rule that recognises the text
//! decides its meaning, and text no rule recognises is worth nothing.

use super::valuation;
use crate::domain::{CardRecord, SpendingProfile};
use once_cell::sync::Lazy;
use regex::Regex;

/// Requirements taking longer than this many months of normal spend are discounted.
const MAX_REALISTIC_MONTHS: f64 = 6.0;
const HARD_TO_EARN_DISCOUNT: f64 = 0.70;

static POINTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(?:bonus\s+)?(?:points|miles)\b").unwrap());
static DOLLAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\s*(\d[\d,]*(?:\.\d+)?)").unwrap());
static SPEND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:spend|spending|purchases|after)\b[^$\d]{0,24}?\$\s*(\d[\d,]*(?:\.\d+)?)").unwrap()
});
static PERCENT_CAP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*%.*?up\s+to\s+\$\s*(\d[\d,]*(?:\.\d+)?)").unwrap()
});

/// What a bonus description promises, before it is turned into dollars.
#[derive(Debug, Clone, PartialEq)]
pub enum BonusTerms {
    Points {
        magnitude: f64,
        spend_requirement: Option<f64>,
    },
    Cash(f64),
    PercentBack {
        percent: f64,
        cap: f64,
    },
}

type BonusRule = fn(&str) -> Option<BonusTerms>;

const BONUS_RULES: &[BonusRule] = &[points_rule, cash_rule, percent_cap_rule];

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

fn first_dollar_amount(text: &str) -> Option<f64> {
    DOLLAR_RE
        .captures(text)
        .and_then(|caps| parse_amount(caps.get(1)?.as_str()))
}

/// The amount introduced by a spend keyword ("after you spend $4,000"), else the
/// largest dollar amount in the text.
fn spend_requirement(text: &str) -> Option<f64> {
    if let Some(amount) = SPEND_RE
        .captures(text)
        .and_then(|caps| parse_amount(caps.get(1)?.as_str()))
    {
        return Some(amount);
    }
    DOLLAR_RE
        .captures_iter(text)
        .filter_map(|caps| parse_amount(caps.get(1)?.as_str()))
        .reduce(f64::max)
}

/// "60,000 points", "50,000 bonus miles", with an optional "$4,000" spend requirement.
pub fn points_rule(text: &str) -> Option<BonusTerms> {
    let caps = POINTS_RE.captures(text)?;
    let magnitude = parse_amount(caps.get(1)?.as_str())?;
    Some(BonusTerms::Points {
        magnitude,
        spend_requirement: spend_requirement(text),
    })
}

/// A dollar amount, unless the text is a capped percentage offer.
pub fn cash_rule(text: &str) -> Option<BonusTerms> {
    if PERCENT_CAP_RE.is_match(text) {
        return None;
    }
    first_dollar_amount(text).map(BonusTerms::Cash)
}

/// "5% back on purchases, up to $300".
pub fn percent_cap_rule(text: &str) -> Option<BonusTerms> {
    let caps = PERCENT_CAP_RE.captures(text)?;
    Some(BonusTerms::PercentBack {
        percent: parse_amount(caps.get(1)?.as_str())?,
        cap: parse_amount(caps.get(2)?.as_str())?,
    })
}

pub fn parse_bonus(text: &str) -> Option<BonusTerms> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    BONUS_RULES.iter().find_map(|rule| rule(text))
}

impl BonusTerms {
    pub fn value(&self, total_monthly_spend: f64, point_value: f64) -> f64 {
        let v = match *self {
            BonusTerms::Points {
                magnitude,
                spend_requirement,
            } => {
                let mut v = magnitude * point_value;
                if let Some(requirement) = spend_requirement {
                    // Zero monthly spend means the requirement is never met.
                    let months_to_meet = if total_monthly_spend > 0.0 {
                        requirement / total_monthly_spend
                    } else {
                        f64::INFINITY
                    };
                    if months_to_meet > MAX_REALISTIC_MONTHS {
                        v *= HARD_TO_EARN_DISCOUNT;
                    }
                }
                v
            }
            BonusTerms::Cash(amount) => amount,
            BonusTerms::PercentBack { percent, cap } => cap * (percent / 100.0),
        };

        if v.is_finite() && v > 0.0 {
            v
        } else {
            0.0
        }
    }
}

pub fn welcome_value_with(description: &str, total_monthly_spend: f64, point_value: f64) -> f64 {
    parse_bonus(description)
        .map(|terms| terms.value(total_monthly_spend, point_value))
        .unwrap_or(0.0)
}

pub fn welcome_value(card: &CardRecord, profile: &SpendingProfile) -> f64 {
    welcome_value_with(
        &card.welcome_bonus,
        profile.total_monthly_spend(),
        valuation::effective_point_value(card, profile),
    )
}
