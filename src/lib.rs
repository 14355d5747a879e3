pub mod core {
    pub mod tree;
    pub mod writer;
    pub mod list_detector;
    pub mod flattener;
    pub mod synonyms;
    pub mod semantic;
    pub mod record_builder;
}

pub mod calc {
    pub mod era;
    pub mod premium;
}

pub mod utils {
    pub mod ingest;
    pub mod document_processor;
}

pub mod alternate;
pub mod config;
pub mod error;

pub use crate::core::record_builder::{extract_record, RecordBuilder, TitleStrategy};
pub use crate::core::tree::{DocumentTree, ElementNode, Parser, XmlTreeParser};
pub use crate::error::MalformedXmlError;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One flattened table row. A key that is absent means the cell is absent
/// (consumers render it as `-`); an empty string is a present, empty cell.
pub type Row = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WellKnownField {
    ArrivalNumber,
    PostalCode,
    Address,
    CompanyName,
    RecipientName,
    CreationDate,
    OfficeName,
}

impl WellKnownField {
    pub const ALL: [WellKnownField; 7] = [
        WellKnownField::ArrivalNumber,
        WellKnownField::PostalCode,
        WellKnownField::Address,
        WellKnownField::CompanyName,
        WellKnownField::RecipientName,
        WellKnownField::CreationDate,
        WellKnownField::OfficeName,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WellKnownField::ArrivalNumber => "到達番号",
            WellKnownField::PostalCode => "郵便番号",
            WellKnownField::Address => "所在地",
            WellKnownField::CompanyName => "事業所名称",
            WellKnownField::RecipientName => "宛名",
            WellKnownField::CreationDate => "作成年月日",
            WellKnownField::OfficeName => "年金事務所",
        }
    }
}

/// The fixed set of business fields located by synonym matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WellKnownFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_name: Option<String>,
}

impl WellKnownFields {
    fn slot_mut(&mut self, field: WellKnownField) -> &mut Option<String> {
        match field {
            WellKnownField::ArrivalNumber => &mut self.arrival_number,
            WellKnownField::PostalCode => &mut self.postal_code,
            WellKnownField::Address => &mut self.address,
            WellKnownField::CompanyName => &mut self.company_name,
            WellKnownField::RecipientName => &mut self.recipient_name,
            WellKnownField::CreationDate => &mut self.creation_date,
            WellKnownField::OfficeName => &mut self.office_name,
        }
    }

    pub fn get(&self, field: WellKnownField) -> Option<&str> {
        let slot = match field {
            WellKnownField::ArrivalNumber => &self.arrival_number,
            WellKnownField::PostalCode => &self.postal_code,
            WellKnownField::Address => &self.address,
            WellKnownField::CompanyName => &self.company_name,
            WellKnownField::RecipientName => &self.recipient_name,
            WellKnownField::CreationDate => &self.creation_date,
            WellKnownField::OfficeName => &self.office_name,
        };
        slot.as_deref()
    }

    /// Overwrites whatever an earlier node stored in the slot.
    pub fn set(&mut self, field: WellKnownField, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub name: String,
    #[serde(default)]
    pub is_table: bool,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Section {
    pub fn cell(&self, row: usize, key: &str) -> Option<&str> {
        self.rows.get(row)?.get(key).map(String::as_str)
    }
}

/// Flat projection of one notice document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversalRecord {
    pub title: String,
    #[serde(flatten)]
    pub fields: WellKnownFields,
    #[serde(default)]
    pub office_info: IndexMap<String, String>,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl UniversalRecord {
    pub fn table_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| s.is_table)
    }
}
