//! Record and request types shared by the executor, the refresher and the
//! HTTP layer.

use serde::Serialize;
use std::fmt;
use time::Date;

use crate::utils::{format_date, serialize_date};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("data_inicial ({start}) é posterior a data_final ({end})")]
    InvertedRange { start: String, end: String },

    #[error("pagina deve ser maior ou igual a 1")]
    ZeroPage,

    #[error("limite deve ser maior ou igual a 1")]
    ZeroPageSize,
}

/// Inclusive calendar date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    #[serde(rename = "data_inicial", serialize_with = "serialize_date")]
    start: Date,
    #[serde(rename = "data_final", serialize_with = "serialize_date")]
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, ModelError> {
        if start > end {
            return Err(ModelError::InvertedRange {
                start: format_date(start),
                end: format_date(end),
            });
        }
        Ok(Self { start, end })
    }

    /// The `days` days before `today`, up to and including `today`.
    pub fn trailing(today: Date, days: u32) -> Self {
        let start = today
            .checked_sub(time::Duration::days(i64::from(days)))
            .unwrap_or(Date::MIN);
        Self { start, end: today }
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", format_date(self.start), format_date(self.end))
    }
}

/// One-based page of a row-number window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    #[serde(rename = "pagina")]
    page: u32,
    #[serde(rename = "limite")]
    size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Result<Self, ModelError> {
        if page == 0 {
            return Err(ModelError::ZeroPage);
        }
        if size == 0 {
            return Err(ModelError::ZeroPageSize);
        }
        Ok(Self { page, size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Row numbers strictly above this value belong to the page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }

    /// Last row number (inclusive) that belongs to the page.
    pub fn limit(&self) -> u64 {
        self.offset() + u64::from(self.size)
    }
}

/// Row of the `VW_SOMELIER` sales/cost view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    #[serde(rename = "DESCRICAO")]
    pub description: String,
    #[serde(rename = "CODPROD")]
    pub product_code: i64,
    #[serde(rename = "DATA", serialize_with = "serialize_date")]
    pub date: Date,
    #[serde(rename = "QT")]
    pub quantity: Option<f64>,
    #[serde(rename = "PVENDA")]
    pub sale_price: Option<f64>,
    #[serde(rename = "VLCUSTOFIN")]
    pub fin_cost: Option<f64>,
}

/// Order header from `PCPEDC` with salesperson and market names resolved.
///
/// Columns other than the key, date, bonus and market may be NULL in the ERP.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    #[serde(rename = "NUMPED")]
    pub order_number: i64,
    #[serde(rename = "DATA", serialize_with = "serialize_date")]
    pub order_date: Date,
    #[serde(rename = "VLTOTAL")]
    pub total_value: Option<f64>,
    #[serde(rename = "VLBONIFIC")]
    pub bonus_value: f64,
    #[serde(rename = "NOME")]
    pub salesperson_name: Option<String>,
    #[serde(rename = "CODFILIAL")]
    pub branch_code: Option<String>,
    #[serde(rename = "CODPRACA")]
    pub market_code: String,
    #[serde(rename = "CODCLI")]
    pub customer_code: Option<i64>,
}

impl OrderRecord {
    /// Only orders without a bonus are served.
    pub fn is_qualifying(&self) -> bool {
        self.bonus_value == 0.0
    }
}
