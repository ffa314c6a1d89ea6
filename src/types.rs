use crate::period::{Period, Periodic};
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

// ---------------------------------------------------------------------------
// Raw CSV rows. Every cell is optional text; cleaning happens in the loader.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RawSalesRow {
    #[serde(rename = "ÅrMånad")]
    pub year_month: Option<String>,
    #[serde(rename = "Antal försäljningsordrar")]
    pub order_count: Option<String>,
    #[serde(rename = "Försäljning")]
    pub sales: Option<String>,
    #[serde(rename = "Rabattvärde")]
    pub discount: Option<String>,
    #[serde(rename = "KampanjKod")]
    pub campaign_code: Option<String>,
    #[serde(rename = "SäljKanal")]
    pub sales_channel: Option<String>,
    #[serde(rename = "Antal anställda")]
    pub employees: Option<String>,
    #[serde(rename = "Avtalsperiod")]
    pub contract_period: Option<String>,
    #[serde(rename = "Bolagsform")]
    pub company_form: Option<String>,
    #[serde(rename = "Kundtyp")]
    pub customer_type: Option<String>,
    #[serde(rename = "SNI")]
    pub sni: Option<String>,
}

impl RawSalesRow {
    pub const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "ÅrMånad",
        "Antal försäljningsordrar",
        "Försäljning",
        "Rabattvärde",
    ];
}

#[derive(Debug, Deserialize)]
pub struct RawNewCustomerRow {
    #[serde(rename = "ÅrMånad")]
    pub year_month: Option<String>,
    #[serde(rename = "Nya kunder")]
    pub new_customers: Option<String>,
    #[serde(rename = "Anskaffad via - Detalj")]
    pub acquired_via: Option<String>,
    #[serde(rename = "KundTyp")]
    pub customer_type: Option<String>,
    #[serde(rename = "Antal anställda")]
    pub employees: Option<String>,
    #[serde(rename = "SNI")]
    pub sni: Option<String>,
    #[serde(rename = "Bolagform")]
    pub company_form: Option<String>,
    #[serde(rename = "Omsättningsintervall")]
    pub turnover_range: Option<String>,
}

impl RawNewCustomerRow {
    pub const REQUIRED_COLUMNS: &'static [&'static str] =
        &["ÅrMånad", "Nya kunder", "Anskaffad via - Detalj"];
}

#[derive(Debug, Deserialize)]
pub struct RawStockRow {
    #[serde(rename = "ÅrMånad")]
    pub year_month: Option<String>,
    #[serde(rename = "Antal kunder")]
    pub customers: Option<String>,
    #[serde(rename = "KundTyp")]
    pub customer_type: Option<String>,
    #[serde(rename = "Antal anställda")]
    pub employees: Option<String>,
    #[serde(rename = "SNI")]
    pub sni: Option<String>,
    #[serde(rename = "Bolagform")]
    pub company_form: Option<String>,
    #[serde(rename = "Omsättningsintervall")]
    pub turnover_range: Option<String>,
}

impl RawStockRow {
    pub const REQUIRED_COLUMNS: &'static [&'static str] = &["ÅrMånad", "Antal kunder"];
}

#[derive(Debug, Deserialize)]
pub struct RawTargetRow {
    #[serde(rename = "Månad")]
    pub month: Option<String>,
    #[serde(rename = "Byrå")]
    pub bureau: Option<String>,
    #[serde(rename = "Winback")]
    pub winback: Option<String>,
    #[serde(rename = "säljare")]
    pub sales_reps: Option<String>,
    #[serde(rename = "fortnox.se")]
    pub web: Option<String>,
    #[serde(rename = "Cling/Boardeaser/Okänt")]
    pub other: Option<String>,
    #[serde(rename = "Totalt")]
    pub total: Option<String>,
}

impl RawTargetRow {
    pub const REQUIRED_COLUMNS: &'static [&'static str] = &["Månad", "Totalt"];
}

// ---------------------------------------------------------------------------
// Dimensions and measures
// ---------------------------------------------------------------------------

/// Categorical columns a breakdown can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dimension {
    CampaignCode,
    SalesChannel,
    Employees,
    ContractPeriod,
    CompanyForm,
    CustomerType,
    Sni,
    AcquisitionChannel,
    TurnoverRange,
}

impl Dimension {
    /// Column header shown in tables.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::CampaignCode => "KampanjKod",
            Dimension::SalesChannel => "SäljKanal",
            Dimension::Employees => "Antal anställda",
            Dimension::ContractPeriod => "Avtalsperiod",
            Dimension::CompanyForm => "Bolagsform",
            Dimension::CustomerType => "Kundtyp",
            Dimension::Sni => "SNI",
            Dimension::AcquisitionChannel => "Anskaffningskanal",
            Dimension::TurnoverRange => "Omsättningsintervall",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Numeric columns that can be summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Measure {
    OrderValue,
    Sales,
    Discount,
    OrderCount,
    NewCustomers,
    Customers,
}

/// A row that can be sliced by period, grouped by dimension and summed.
///
/// `measure` returns 0 for measures the record type does not carry and
/// `dimension` returns `None` when the cell was empty.
pub trait Record: Periodic + Clone {
    fn dimension(&self, dim: Dimension) -> Option<&str>;
    fn measure(&self, measure: Measure) -> f64;
}

// ---------------------------------------------------------------------------
// Acquisition channels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Channel {
    Web,
    SalesRep,
    Winback,
    Bureau,
    Other,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Web,
        Channel::SalesRep,
        Channel::Winback,
        Channel::Bureau,
        Channel::Other,
    ];

    /// Categorise the free-text "acquired via" cell. First match wins.
    pub fn categorize(detail: Option<&str>) -> Channel {
        let detail = match detail.map(str::trim) {
            None | Some("") | Some("-") => return Channel::Other,
            Some(d) => d.to_lowercase(),
        };
        if detail.contains("fortnox.se") || detail.contains("fortnox se") {
            Channel::Web
        } else if detail.contains("fortnox") {
            Channel::SalesRep
        } else if detail.contains("winback") {
            Channel::Winback
        } else if detail.contains("byrå") {
            Channel::Bureau
        } else {
            Channel::Other
        }
    }

    /// Stable identifier used in `data-channel` attributes.
    pub fn id(self) -> &'static str {
        match self {
            Channel::Web => "fortnox.se",
            Channel::SalesRep => "fortnox",
            Channel::Winback => "winback",
            Channel::Bureau => "byrå",
            Channel::Other => "övrigt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::Web => "Fortnox.Se",
            Channel::SalesRep => "Fortnox (Säljare)",
            Channel::Winback => "Winback",
            Channel::Bureau => "Byrå",
            Channel::Other => "Övrigt",
        }
    }
}

/// Channel selector: everything, or a single category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelFilter {
    All,
    Only(Channel),
}

impl ChannelFilter {
    pub fn options() -> Vec<ChannelFilter> {
        std::iter::once(ChannelFilter::All)
            .chain(Channel::ALL.into_iter().map(ChannelFilter::Only))
            .collect()
    }

    pub fn id(self) -> &'static str {
        match self {
            ChannelFilter::All => "alla",
            ChannelFilter::Only(c) => c.id(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChannelFilter::All => "Alla kanaler",
            ChannelFilter::Only(c) => c.label(),
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ChannelFilter::All => "📊",
            ChannelFilter::Only(Channel::Web) => "🌐",
            ChannelFilter::Only(Channel::SalesRep) => "👤",
            ChannelFilter::Only(Channel::Winback) => "🔄",
            ChannelFilter::Only(Channel::Bureau) => "🏢",
            ChannelFilter::Only(Channel::Other) => "📦",
        }
    }

    pub fn accepts(self, channel: Channel) -> bool {
        match self {
            ChannelFilter::All => true,
            ChannelFilter::Only(c) => c == channel,
        }
    }
}

// ---------------------------------------------------------------------------
// Clean records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub period: Period,
    pub order_count: f64,
    pub sales: f64,
    pub discount: f64,
    pub order_value: f64,
    pub discount_pct: f64,
    pub campaign_code: Option<String>,
    pub sales_channel: Option<String>,
    pub employees: Option<String>,
    pub contract_period: Option<String>,
    pub company_form: Option<String>,
    pub customer_type: Option<String>,
    pub sni: Option<String>,
}

impl Periodic for SalesRecord {
    fn period(&self) -> Period {
        self.period
    }
}

impl Record for SalesRecord {
    fn dimension(&self, dim: Dimension) -> Option<&str> {
        let value = match dim {
            Dimension::CampaignCode => &self.campaign_code,
            Dimension::SalesChannel => &self.sales_channel,
            Dimension::Employees => &self.employees,
            Dimension::ContractPeriod => &self.contract_period,
            Dimension::CompanyForm => &self.company_form,
            Dimension::CustomerType => &self.customer_type,
            Dimension::Sni => &self.sni,
            Dimension::AcquisitionChannel | Dimension::TurnoverRange => return None,
        };
        value.as_deref()
    }

    fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::OrderValue => self.order_value,
            Measure::Sales => self.sales,
            Measure::Discount => self.discount,
            Measure::OrderCount => self.order_count,
            Measure::NewCustomers | Measure::Customers => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomerRecord {
    pub period: Period,
    pub new_customers: f64,
    pub channel: Channel,
    pub customer_type: Option<String>,
    pub employees: Option<String>,
    pub sni: Option<String>,
    pub company_form: Option<String>,
    pub turnover_range: Option<String>,
}

impl Periodic for NewCustomerRecord {
    fn period(&self) -> Period {
        self.period
    }
}

impl Record for NewCustomerRecord {
    fn dimension(&self, dim: Dimension) -> Option<&str> {
        match dim {
            Dimension::AcquisitionChannel => Some(self.channel.label()),
            Dimension::CustomerType => self.customer_type.as_deref(),
            Dimension::Employees => self.employees.as_deref(),
            Dimension::Sni => self.sni.as_deref(),
            Dimension::CompanyForm => self.company_form.as_deref(),
            Dimension::TurnoverRange => self.turnover_range.as_deref(),
            _ => None,
        }
    }

    fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::NewCustomers => self.new_customers,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockRecord {
    pub period: Period,
    pub customers: f64,
    pub customer_type: Option<String>,
    pub employees: Option<String>,
    pub sni: Option<String>,
    pub company_form: Option<String>,
    pub turnover_range: Option<String>,
}

impl Periodic for StockRecord {
    fn period(&self) -> Period {
        self.period
    }
}

impl Record for StockRecord {
    fn dimension(&self, dim: Dimension) -> Option<&str> {
        match dim {
            Dimension::CustomerType => self.customer_type.as_deref(),
            Dimension::Employees => self.employees.as_deref(),
            Dimension::Sni => self.sni.as_deref(),
            Dimension::CompanyForm => self.company_form.as_deref(),
            Dimension::TurnoverRange => self.turnover_range.as_deref(),
            _ => None,
        }
    }

    fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Customers => self.customers,
            _ => 0.0,
        }
    }
}

/// New-customer target for one month and channel selection.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTarget {
    pub month: u32,
    pub channel: ChannelFilter,
    pub target: f64,
}

// ---------------------------------------------------------------------------
// Console / JSON report rows
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiComparisonRow {
    #[serde(rename = "KPI")]
    #[tabled(rename = "KPI")]
    pub kpi: String,
    #[serde(rename = "Aktuell")]
    #[tabled(rename = "Aktuell")]
    pub current: String,
    #[serde(rename = "Jämförelse")]
    #[tabled(rename = "Jämförelse")]
    pub comparison: String,
    #[serde(rename = "Förändring")]
    #[tabled(rename = "Förändring")]
    pub change: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DimensionComparisonRow {
    #[serde(rename = "Grupp")]
    #[tabled(rename = "Grupp")]
    pub group: String,
    #[serde(rename = "Ordervärde")]
    #[tabled(rename = "Ordervärde")]
    pub order_value: String,
    #[serde(rename = "OrdervärdeFörändring")]
    #[tabled(rename = "Förändring%")]
    pub order_value_change: String,
    #[serde(rename = "Försäljningsantal")]
    #[tabled(rename = "Försäljningsantal")]
    pub order_count: String,
    #[serde(rename = "FörsäljningsantalFörändring")]
    #[tabled(rename = "Förändring%")]
    pub order_count_change: String,
}
