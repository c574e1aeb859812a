//! Records handed over by the CRUD layer. The engine reads them and never
//! writes them back; validation of business invariants (totals adding up,
//! amounts matching quantity * rate) happens upstream.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Partial,
    Overdue,
}

impl InvoiceStatus {
    pub fn label(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Sent => "SENT",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Partial => "PARTIAL",
            InvoiceStatus::Overdue => "OVERDUE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub rate: f64,
    /// quantity * rate, computed and rounded upstream. The engine only
    /// formats this value; it never recomputes it.
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    /// Human-readable number, e.g. "INV-0042".
    pub number: String,
    /// Dates arrive pre-formatted; the engine never touches a clock.
    pub issue_date: String,
    pub due_date: String,
    pub status: InvoiceStatus,
    pub subtotal: f64,
    /// Fraction in 0..=1, not a percentage.
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    #[serde(default)]
    pub notes: Option<String>,
    /// May be empty (header-only table); a missing field is rejected at the
    /// serde boundary, which is the structural-invariant hard error.
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub client: Option<Client>,
    #[serde(default)]
    pub project: Option<Project>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_address: Option<String>,
    #[serde(default)]
    pub company_email: Option<String>,
    #[serde(default)]
    pub company_phone: Option<String>,
    #[serde(default)]
    pub company_website: Option<String>,
    /// Pre-fetched raster bytes (PNG or JPEG); fetching is a collaborator
    /// responsibility.
    #[serde(default)]
    pub logo: Option<Vec<u8>>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub header_text: Option<String>,
    #[serde(default)]
    pub footer_text: Option<String>,
    #[serde(default)]
    pub terms_conditions: Option<String>,
}
