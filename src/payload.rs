//! Spedy `service-invoices` request body.
//!
//! Field order follows the Spedy schema so serialized payloads diff cleanly.
//! Fields we have no data for are sent as explicit `null`, never omitted.

use chrono::{DateTime, Utc};

use crate::data::TransactionRecord;

const COUNTRY: &str = "BRA";
const INVOICE_STATUS: &str = "created";

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    pub integration_id: String,
    pub issued_on: String,
    pub effective_date: String,
    pub receiver: Receiver,
    pub number: String,
    pub status: &'static str,
    pub additional_information: Option<String>,
    pub send_email_to_customer: bool,
    pub description: Option<String>,
    pub batch_number: u32,
    pub rps_number: u32,
    pub rps_series: u32,
    pub cnae_code: Option<String>,
    pub nbs_code: Option<String>,
    pub federal_service_code: Option<String>,
    pub national_taxation_code: Option<String>,
    pub city_service_code: Option<String>,
    pub taxation_type: Option<String>,
    pub cst_pis_cofins: Option<String>,
    pub total: Total,
    pub location: Location,
    pub ibs_cbs: IbsCbs,
    pub national: National,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receiver {
    pub name: String,
    pub federal_tax_number: Option<String>,
    pub state_tax_number: Option<String>,
    pub city_tax_number: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub district: Option<String>,
    pub postal_code: Option<String>,
    pub number: Option<String>,
    pub additional_information: Option<String>,
    pub city: City,
    pub country: &'static str,
}

impl Default for Address {
    fn default() -> Self {
        Address {
            street: None,
            district: None,
            postal_code: None,
            number: None,
            additional_information: None,
            city: City::default(),
            country: COUNTRY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct City {
    pub name: Option<String>,
    pub state: Option<String>,
    pub code: Option<String>,
}

/// Monetary breakdown. Everything but the two amounts is zero: taxes are
/// computed by Spedy from the company's fiscal settings.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Total {
    pub invoice_amount: f64,
    pub net_amount: f64,
    pub iss_base_tax: f64,
    pub ir_rate: f64,
    pub csll_rate: f64,
    pub pis_rate: f64,
    pub cofins_rate: f64,
    pub inss_rate: f64,
    pub iss_rate: f64,
    pub iss_amount: f64,
    pub discount_unconditioned_amount: f64,
    pub discount_conditioned_amount: f64,
    pub ir_amount: f64,
    pub pis_amount: f64,
    pub cofins_amount: f64,
    pub inss_amount: f64,
    pub csll_amount: f64,
    pub others_amount: f64,
    pub deductions_amount: f64,
    pub ir_withheld: bool,
    pub iss_withheld: bool,
    pub cofins_withheld: bool,
    pub inss_withheld: bool,
    pub csll_withheld: bool,
    pub pis_withheld: bool,
    pub ibs_state_rate: f64,
    pub ibs_city_rate: f64,
    pub cbs_rate: f64,
    pub ibs_cbs_base_tax: f64,
    pub ibs_state_amount: f64,
    pub ibs_city_amount: f64,
    pub ibs_amount: f64,
    pub cbs_amount: f64,
}

impl Total {
    fn gross(amount: f64) -> Self {
        Total {
            invoice_amount: amount,
            net_amount: amount,
            ..Default::default()
        }
    }
}

/// Place where the service was rendered.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Location {
    pub code: Option<String>,
    pub name: Option<String>,
    pub state: Option<String>,
}

/// IBS/CBS block introduced by the tax reform.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IbsCbs {
    pub cst: u32,
    pub classification: u32,
    pub operation_indicator_code: Option<String>,
    pub is_personal_use: bool,
}

impl Default for IbsCbs {
    fn default() -> Self {
        IbsCbs {
            cst: 0,
            classification: 0,
            operation_indicator_code: None,
            is_personal_use: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct National {
    pub municipal_benefit: MunicipalBenefit,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct MunicipalBenefit {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub identification: Option<String>,
}

impl InvoicePayload {
    /// Payload for `record`, issued now.
    pub fn from_record(record: &TransactionRecord) -> Self {
        Self::build(record, Utc::now())
    }

    pub fn build(record: &TransactionRecord, issued_at: DateTime<Utc>) -> Self {
        let id = record.id.to_string();
        let issued_on = format_timestamp(issued_at);

        InvoicePayload {
            integration_id: id.clone(),
            issued_on: issued_on.clone(),
            effective_date: issued_on,
            receiver: Receiver {
                name: record.full_name(),
                federal_tax_number: None,
                state_tax_number: None,
                city_tax_number: None,
                email: record.email.clone(),
                phone_number: record.phone.clone(),
                address: Address::default(),
            },
            number: id,
            status: INVOICE_STATUS,
            additional_information: None,
            send_email_to_customer: true,
            description: record.description.clone(),
            batch_number: 0,
            rps_number: 0,
            rps_series: 0,
            cnae_code: None,
            nbs_code: None,
            federal_service_code: None,
            national_taxation_code: None,
            city_service_code: None,
            taxation_type: None,
            cst_pis_cofins: None,
            total: Total::gross(record.amount),
            location: Location::default(),
            ibs_cbs: IbsCbs::default(),
            national: National::default(),
        }
    }
}

/// ISO-8601, second precision, literal `Z`.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
