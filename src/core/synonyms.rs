//! Synonym tables mapping tag names onto well-known business fields.
//!
//! Notices from different issuers name the same field with native labels
//! (`事業所所在地`), romanized or English aliases (`Address`) or positional
//! codes (`T003`). Each field owns an ordered list of matchers; the table is
//! plain data so new document variants only need a new table version.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::WellKnownField;

pub const BUILTIN_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    Contains(String),
    Exact(String),
    ExactIgnoreCase(String),
    Pattern(String),
}

impl Matcher {
    fn contains(s: &str) -> Self {
        Matcher::Contains(s.to_string())
    }

    fn exact(s: &str) -> Self {
        Matcher::Exact(s.to_string())
    }

    fn alias(s: &str) -> Self {
        Matcher::ExactIgnoreCase(s.to_string())
    }

    fn pattern(s: &str) -> Self {
        Matcher::Pattern(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleFingerprint {
    pub matcher: Matcher,
    pub title: String,
}

impl TitleFingerprint {
    fn new(pattern: &str, title: &str) -> Self {
        Self { matcher: Matcher::pattern(pattern), title: title.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynonymTable {
    pub version: u32,
    pub arrival_number: Vec<Matcher>,
    pub postal_code: Vec<Matcher>,
    pub address: Vec<Matcher>,
    pub company_name: Vec<Matcher>,
    pub recipient_name: Vec<Matcher>,
    pub creation_date: Vec<Matcher>,
    pub office_name: Vec<Matcher>,
    /// Institution registration codes, captured under their own tag names.
    pub office_identifier: Vec<Matcher>,
    /// Header keys whose value names the document.
    pub title_labels: Vec<Matcher>,
    /// Root tag signatures of known notice types, tried in order.
    pub fingerprints: Vec<TitleFingerprint>,
    /// Table columns read by the premium calculation.
    pub health_amount: Vec<Matcher>,
    pub pension_amount: Vec<Matcher>,
    pub birth_date: Vec<Matcher>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        use Matcher as M;
        Self {
            version: BUILTIN_VERSION,
            arrival_number: vec![
                M::contains("到達番号"),
                M::alias("ArrivalNumber"),
                M::alias("arrival_no"),
                M::exact("T001"),
            ],
            postal_code: vec![
                M::contains("郵便番号"),
                M::contains("〒"),
                M::pattern(r"(?i)^(postal|zip)_?(code|no)?$"),
                M::exact("T002"),
            ],
            address: vec![
                M::contains("所在地"),
                M::contains("住所"),
                M::alias("Address"),
                M::exact("T003"),
            ],
            company_name: vec![
                M::contains("事業所名"),
                M::contains("会社名"),
                M::contains("法人名"),
                M::alias("CompanyName"),
                M::alias("Office"),
                M::exact("T004"),
            ],
            recipient_name: vec![
                M::contains("宛名"),
                M::contains("宛先"),
                M::contains("事業主氏名"),
                M::contains("代表者氏名"),
                M::alias("RecipientName"),
                M::exact("T005"),
            ],
            creation_date: vec![
                M::contains("作成年月日"),
                M::contains("作成日"),
                M::contains("通知年月日"),
                M::contains("発行年月日"),
                M::alias("CreationDate"),
                M::exact("T006"),
            ],
            office_name: vec![
                M::pattern(r"^(管轄)?年金事務所(名|名称)?$"),
                M::contains("事務センター名"),
                M::alias("OfficeName"),
                M::exact("T007"),
            ],
            office_identifier: vec![
                M::contains("事業所整理記号"),
                M::contains("事業所番号"),
                M::contains("事業所記号"),
                M::pattern(r"(?i)^office_?(code|id|number)$"),
            ],
            title_labels: vec![
                M::contains("文書名"),
                M::contains("通知書名"),
                M::contains("表題"),
                M::contains("タイトル"),
                M::pattern(r"(?i)title"),
            ],
            fingerprints: vec![
                TitleFingerprint::new(
                    r"標準報酬.*改定|(?i)kaitei_?tsuchi",
                    "健康保険・厚生年金保険被保険者標準報酬改定通知書",
                ),
                TitleFingerprint::new(
                    r"標準賞与|(?i)shoyo_?kettei",
                    "健康保険・厚生年金保険標準賞与額決定通知書",
                ),
                TitleFingerprint::new(
                    r"資格取得|(?i)shikaku_?shutoku",
                    "健康保険・厚生年金保険資格取得確認および標準報酬決定通知書",
                ),
                TitleFingerprint::new(
                    r"資格喪失|(?i)shikaku_?soshitsu",
                    "健康保険・厚生年金保険資格喪失確認通知書",
                ),
                TitleFingerprint::new(
                    r"標準報酬.*決定|決定通知|(?i)kettei_?tsuchi",
                    "健康保険・厚生年金保険被保険者標準報酬決定通知書",
                ),
            ],
            health_amount: vec![
                M::pattern(r"(健康保険|健保).*標準報酬|標準報酬.*(健康保険|健保)"),
                M::contains("健保月額"),
                M::pattern(r"(?i)^health$|health_?(amount|standard)"),
            ],
            pension_amount: vec![
                M::pattern(r"(厚生年金|厚年).*標準報酬|標準報酬.*(厚生年金|厚年)"),
                M::contains("厚年月額"),
                M::pattern(r"(?i)^pension$|pension_?(amount|standard)"),
            ],
            birth_date: vec![M::contains("生年月日"), M::pattern(r"(?i)birth")],
        }
    }
}

impl SynonymTable {
    pub fn matchers(&self, field: WellKnownField) -> &[Matcher] {
        match field {
            WellKnownField::ArrivalNumber => &self.arrival_number,
            WellKnownField::PostalCode => &self.postal_code,
            WellKnownField::Address => &self.address,
            WellKnownField::CompanyName => &self.company_name,
            WellKnownField::RecipientName => &self.recipient_name,
            WellKnownField::CreationDate => &self.creation_date,
            WellKnownField::OfficeName => &self.office_name,
        }
    }

    /// Compile every pattern once; a bad regex names the field it belongs to.
    pub fn compile(&self) -> Result<CompiledSynonyms, ConfigError> {
        let mut fields = Vec::with_capacity(WellKnownField::ALL.len());
        for field in WellKnownField::ALL {
            fields.push((field, FieldMatchers::compile(field.label(), self.matchers(field))?));
        }

        let mut fingerprints = Vec::with_capacity(self.fingerprints.len());
        for fp in &self.fingerprints {
            let matchers = FieldMatchers::compile("fingerprint", std::slice::from_ref(&fp.matcher))?;
            fingerprints.push((matchers, fp.title.clone()));
        }

        Ok(CompiledSynonyms {
            version: self.version,
            fields,
            office_identifier: FieldMatchers::compile("office_identifier", &self.office_identifier)?,
            title_labels: FieldMatchers::compile("title_labels", &self.title_labels)?,
            fingerprints,
            health_amount: FieldMatchers::compile("health_amount", &self.health_amount)?,
            pension_amount: FieldMatchers::compile("pension_amount", &self.pension_amount)?,
            birth_date: FieldMatchers::compile("birth_date", &self.birth_date)?,
        })
    }
}

#[derive(Debug, Clone)]
enum CompiledMatcher {
    Contains(String),
    Exact(String),
    ExactIgnoreCase(String),
    Pattern(Regex),
}

impl CompiledMatcher {
    fn matches(&self, name: &str) -> bool {
        match self {
            CompiledMatcher::Contains(needle) => name.contains(needle.as_str()),
            CompiledMatcher::Exact(expected) => name == expected,
            CompiledMatcher::ExactIgnoreCase(lowered) => name.to_lowercase() == *lowered,
            CompiledMatcher::Pattern(re) => re.is_match(name),
        }
    }
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Ordered matchers for one field; any hit is a match.
#[derive(Debug, Clone, Default)]
pub struct FieldMatchers(Vec<CompiledMatcher>);

impl FieldMatchers {
    fn compile(field: &str, matchers: &[Matcher]) -> Result<Self, ConfigError> {
        let mut compiled = Vec::with_capacity(matchers.len());
        for matcher in matchers {
            compiled.push(match matcher {
                Matcher::Contains(s) => CompiledMatcher::Contains(s.clone()),
                Matcher::Exact(s) => CompiledMatcher::Exact(s.clone()),
                Matcher::ExactIgnoreCase(s) => CompiledMatcher::ExactIgnoreCase(s.to_lowercase()),
                Matcher::Pattern(p) => {
                    let re = Regex::new(p).map_err(|_| ConfigError::InvalidPattern {
                        field: field.to_string(),
                        pattern: p.clone(),
                    })?;
                    CompiledMatcher::Pattern(re)
                }
            });
        }
        Ok(Self(compiled))
    }

    /// A prefixed name (`N:T003`) also matches through its local part, so
    /// exact aliases and anchored patterns apply to namespaced notices.
    pub fn matches(&self, name: &str) -> bool {
        let local = local_name(name);
        self.0.iter().any(|m| m.matches(name) || (local != name && m.matches(local)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CompiledSynonyms {
    pub version: u32,
    fields: Vec<(WellKnownField, FieldMatchers)>,
    pub office_identifier: FieldMatchers,
    pub title_labels: FieldMatchers,
    fingerprints: Vec<(FieldMatchers, String)>,
    pub health_amount: FieldMatchers,
    pub pension_amount: FieldMatchers,
    pub birth_date: FieldMatchers,
}

static BUILTIN: Lazy<CompiledSynonyms> = Lazy::new(|| {
    SynonymTable::default()
        .compile()
        .expect("built-in synonym table compiles")
});

impl CompiledSynonyms {
    pub fn builtin() -> &'static CompiledSynonyms {
        &BUILTIN
    }

    /// Every well-known field whose matchers accept `name`.
    pub fn matching_fields<'a>(&'a self, name: &'a str) -> impl Iterator<Item = WellKnownField> + 'a {
        self.fields
            .iter()
            .filter(move |(_, matchers)| matchers.matches(name))
            .map(|(field, _)| *field)
    }

    pub fn fingerprint_title(&self, root_name: &str) -> Option<&str> {
        self.fingerprints
            .iter()
            .find(|(matchers, _)| matchers.matches(root_name))
            .map(|(_, title)| title.as_str())
    }
}
