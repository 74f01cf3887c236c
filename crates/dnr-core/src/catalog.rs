use crate::error::Result;
use crate::rotation;
use chrono::NaiveDate;

/// Concepts taught in the brief, one per day.
pub const TOPICS: [&str; 30] = [
    "Discounted Cash Flow (DCF) Valuation",
    "EBITDA and Enterprise Value",
    "LBO (Leveraged Buyout) Mechanics",
    "M&A Deal Structuring",
    "Capital Structure Optimization",
    "IPO Process and Underwriting",
    "Private Equity Fund Structure (GP/LP)",
    "Pitch Book and CIM Creation",
    "Due Diligence Framework",
    "Comparable Company Analysis (Comps)",
    "Precedent Transaction Analysis",
    "Debt Financing: Term Loans vs Bonds",
    "Working Capital Management",
    "SEBI Regulations for Investment Banks",
    "FEMA and Cross-Border Transactions",
    "Companies Act 2013 Key Provisions",
    "Financial Modeling Best Practices",
    "Equity Research Report Writing",
    "Derivatives: Options and Futures",
    "Credit Rating Methodology",
    "Restructuring and Turnaround",
    "PIPE Transactions",
    "Mezzanine Financing",
    "Fund of Funds Structure",
    "Portfolio Valuation: NAV, IRR, MOIC",
    "SEBI AIF Regulations",
    "RBI Regulations for NBFCs",
    "Venture Capital Term Sheet",
    "Bridge Financing",
    "Convertible Notes",
];

/// Case-study companies, one per day.
pub const COMPANIES: [&str; 14] = [
    "Goldman Sachs",
    "KKR & Co.",
    "Blackstone Group",
    "Morgan Stanley",
    "Sequoia Capital India",
    "ICICI Securities",
    "Kotak Investment Banking",
    "Warburg Pincus India",
    "General Atlantic",
    "TPG Capital",
    "Carlyle Group",
    "Bain Capital",
    "Axis Capital",
    "JM Financial",
];

/// What the brief covers on a given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySelection {
    pub date: NaiveDate,
    pub topic: String,
    pub company: String,
}

impl DailySelection {
    /// Long-form date used in logs and in the prompt, e.g. `Monday, 01 January 2024`.
    pub fn display_date(&self) -> String {
        format_date(self.date)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%A, %d %B %Y").to_string()
}

/// The two rotating lists. Each list rotates independently on its own length.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    pub topics: &'a [&'a str],
    pub companies: &'a [&'a str],
}

impl Catalog<'static> {
    pub fn builtin() -> Self {
        Self {
            topics: &TOPICS,
            companies: &COMPANIES,
        }
    }
}

impl Default for Catalog<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> Catalog<'a> {
    pub fn new(topics: &'a [&'a str], companies: &'a [&'a str]) -> Self {
        Self { topics, companies }
    }

    pub fn topic_for(&self, date: NaiveDate) -> Result<&'a str> {
        rotation::pick(date, self.topics).copied()
    }

    pub fn company_for(&self, date: NaiveDate) -> Result<&'a str> {
        rotation::pick(date, self.companies).copied()
    }

    pub fn select(&self, date: NaiveDate) -> Result<DailySelection> {
        Ok(DailySelection {
            date,
            topic: self.topic_for(date)?.to_string(),
            company: self.company_for(date)?.to_string(),
        })
    }
}
