//! Monthly premium computation over the table rows of a record.
//!
//! Bad or missing cells never abort the computation; they contribute zero.

use chrono::Datelike;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::calc::era::{normalize_digit, parse_birth_year};
use crate::core::synonyms::{CompiledSynonyms, FieldMatchers};
use crate::{Section, UniversalRecord};

/// Rates are percentages of the standard monthly amount (employer and
/// employee combined).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PremiumRates {
    pub health: f64,
    pub pension: f64,
    pub care: f64,
    pub care_age_min: i32,
    pub care_age_max: i32,
    /// Year ages are measured at; the current year when unset.
    pub reference_year: Option<i32>,
}

impl Default for PremiumRates {
    fn default() -> Self {
        Self {
            health: 9.98,
            pension: 18.3,
            care: 1.60,
            care_age_min: 40,
            care_age_max: 64,
            reference_year: None,
        }
    }
}

impl PremiumRates {
    pub fn reference_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(|| chrono::Local::now().year())
    }

    pub fn care_applies(&self, age: i32) -> bool {
        (self.care_age_min..=self.care_age_max).contains(&age)
    }
}

/// Standard monthly amount in yen. `450千円` is 450,000; a bare number or
/// a `円` suffix counts as yen. Full-width digits and separators are accepted.
pub fn parse_amount(value: &str) -> Option<u64> {
    let cleaned: String = value
        .trim()
        .chars()
        .map(normalize_digit)
        .filter(|c| !matches!(c, ',' | '，') && !c.is_whitespace())
        .collect();

    let (number, multiplier) = if let Some(n) = cleaned.strip_suffix("千円") {
        (n, 1000)
    } else if let Some(n) = cleaned.strip_suffix('千') {
        (n, 1000)
    } else if let Some(n) = cleaned.strip_suffix('円') {
        (n, 1)
    } else {
        (cleaned.as_str(), 1)
    };

    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    number.parse::<u64>().ok()?.checked_mul(multiplier)
}

/// `floor(amount * rate / 100)` in integer arithmetic on thousandths of a
/// percent, so that e.g. 9.98% of 300,000 is exactly 29,940.
fn premium(amount: u64, rate_percent: f64) -> u64 {
    let milli = (rate_percent * 1000.0).round().max(0.0) as u64;
    amount.saturating_mul(milli) / 100_000
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowPremium {
    pub row: usize,
    pub health_amount: u64,
    pub pension_amount: u64,
    pub age: Option<i32>,
    pub health: u64,
    pub pension: u64,
    pub care: u64,
    pub total: u64,
    pub employee_share: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumSummary {
    pub section: String,
    pub rows: Vec<RowPremium>,
    pub total_health: u64,
    pub total_pension: u64,
    pub total_care: u64,
    pub total: u64,
    pub total_employee_share: u64,
}

pub struct PremiumCalculator<'a> {
    rates: &'a PremiumRates,
    synonyms: &'a CompiledSynonyms,
}

impl<'a> PremiumCalculator<'a> {
    pub fn new(rates: &'a PremiumRates, synonyms: &'a CompiledSynonyms) -> Self {
        Self { rates, synonyms }
    }

    /// Computes premiums for the first table section that carries a health
    /// standard-amount column. `None` when the record has no such table.
    pub fn calculate(&self, record: &UniversalRecord) -> Option<PremiumSummary> {
        let (section, health_col) = record
            .table_sections()
            .find_map(|s| find_column(s, &self.synonyms.health_amount).map(|c| (s, c)))?;
        let pension_col = find_column(section, &self.synonyms.pension_amount);
        let birth_col = find_column(section, &self.synonyms.birth_date);
        let reference_year = self.rates.reference_year();
        debug!(
            "premiums over section {} (health={}, pension={:?}, birth={:?})",
            section.name, health_col, pension_col, birth_col
        );

        let mut summary = PremiumSummary { section: section.name.clone(), ..Default::default() };
        for (index, row) in section.rows.iter().enumerate() {
            let cell = |col: Option<&str>| col.and_then(|c| row.get(c)).map(String::as_str);

            let health_amount = cell(Some(health_col)).and_then(parse_amount).unwrap_or(0);
            let pension_amount = cell(pension_col).and_then(parse_amount).unwrap_or(0);
            let age = cell(birth_col)
                .and_then(parse_birth_year)
                .map(|born| reference_year - born);

            let health = premium(health_amount, self.rates.health);
            let pension = premium(pension_amount, self.rates.pension);
            let care = match age {
                Some(age) if self.rates.care_applies(age) => premium(health_amount, self.rates.care),
                _ => 0,
            };
            let total = health + pension + care;

            summary.total_health += health;
            summary.total_pension += pension;
            summary.total_care += care;
            summary.total += total;
            summary.total_employee_share += total / 2;
            summary.rows.push(RowPremium {
                row: index,
                health_amount,
                pension_amount,
                age,
                health,
                pension,
                care,
                total,
                employee_share: total / 2,
            });
        }
        Some(summary)
    }
}

fn find_column<'s>(section: &'s Section, matchers: &FieldMatchers) -> Option<&'s str> {
    section
        .headers
        .iter()
        .find(|h| matchers.matches(h))
        .map(String::as_str)
}
