//! Branding resolution. A render never sees an `Option<Template>` past this
//! point: every optional field collapses to a concrete value or a concrete
//! "skip this section" marker here, so composers stay free of fallback
//! plumbing.

use crate::font::FontFamily;
use crate::model::Template;
use crate::types::Color;

pub const DEFAULT_PRIMARY_HEX: &str = "#3B82F6";
pub const DEFAULT_SECONDARY_HEX: &str = "#64748B";
pub const DEFAULT_COMPANY_NAME: &str = "Your Company";

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub family: FontFamily,
    pub company_name: String,
    pub company_address: Option<String>,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub company_website: Option<String>,
    pub logo: Option<Vec<u8>>,
    pub header_text: Option<String>,
    pub footer_text: Option<String>,
    pub terms_conditions: Option<String>,
}

/// `Some("")` and whitespace-only strings count as absent. The spec
/// distinguishes "no value" from "empty string" only to treat both as
/// skippable content.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Theme {
    pub fn resolve(template: Option<&Template>) -> Theme {
        let default_primary = Color::parse_hex(DEFAULT_PRIMARY_HEX)
            .unwrap_or(Color::BLACK);
        let default_secondary = Color::parse_hex(DEFAULT_SECONDARY_HEX)
            .unwrap_or(Color::BLACK);

        let Some(template) = template else {
            // First-class path, not an error: hard-coded brand defaults.
            return Theme {
                primary: default_primary,
                secondary: default_secondary,
                family: FontFamily::Helvetica,
                company_name: DEFAULT_COMPANY_NAME.to_string(),
                company_address: None,
                company_email: None,
                company_phone: None,
                company_website: None,
                logo: None,
                header_text: None,
                footer_text: None,
                terms_conditions: None,
            };
        };

        let primary = match non_blank(&template.primary_color) {
            Some(raw) => Color::from_hex(&raw, default_primary),
            None => default_primary,
        };
        let secondary = match non_blank(&template.secondary_color) {
            Some(raw) => Color::from_hex(&raw, default_secondary),
            None => default_secondary,
        };

        Theme {
            primary,
            secondary,
            family: FontFamily::resolve(template.font_family.as_deref()),
            company_name: non_blank(&template.company_name)
                .unwrap_or_else(|| DEFAULT_COMPANY_NAME.to_string()),
            company_address: non_blank(&template.company_address),
            company_email: non_blank(&template.company_email),
            company_phone: non_blank(&template.company_phone),
            company_website: non_blank(&template.company_website),
            logo: template.logo.clone().filter(|bytes| !bytes.is_empty()),
            header_text: non_blank(&template.header_text),
            footer_text: non_blank(&template.footer_text),
            terms_conditions: non_blank(&template.terms_conditions),
        }
    }
}
