use super::normalizer::normalize_header;
use csv::StringRecord;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Columns an ad performance export must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    AdName,
    AmountSpent,
    Ctr,
    Cpc,
    LinkClicks,
    Roas,
}

impl Column {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::AdName,
            Self::AmountSpent,
            Self::Ctr,
            Self::Cpc,
            Self::LinkClicks,
            Self::Roas,
        ]
    }

    /// Header as it appears in the ads manager export.
    pub const fn header(self) -> &'static str {
        match self {
            Self::AdName => "Ad name",
            Self::AmountSpent => "Amount spent (USD)",
            Self::Ctr => "CTR (all)",
            Self::Cpc => "CPC (cost per link click) (USD)",
            Self::LinkClicks => "Link clicks",
            Self::Roas => "Purchase ROAS (return on ad spend)",
        }
    }

    /// Field name the row deserializer reads.
    pub(crate) const fn key(self) -> &'static str {
        match self {
            Self::AdName => "ad_name",
            Self::AmountSpent => "amount_spent",
            Self::Ctr => "ctr",
            Self::Cpc => "cpc",
            Self::LinkClicks => "link_clicks",
            Self::Roas => "roas",
        }
    }

    const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::AdName => &["Ad", "Ad Name", "Name"],
            Self::AmountSpent => &["Amount spent", "Spend", "Spend (USD)"],
            Self::Ctr => &["CTR", "CTR (link click-through rate)", "Link CTR"],
            Self::Cpc => &["CPC", "CPC (USD)", "Cost per link click"],
            Self::LinkClicks => &["Clicks", "Link Clicks"],
            Self::Roas => &["ROAS", "Purchase ROAS"],
        }
    }
}

static HEADER_MAP: OnceLock<HashMap<String, Column>> = OnceLock::new();

fn header_map() -> &'static HashMap<String, Column> {
    HEADER_MAP.get_or_init(|| {
        let mut map = HashMap::new();
        for column in Column::ordered() {
            map.insert(normalize_header(column.header()), column);
            for alias in column.aliases() {
                map.insert(normalize_header(alias), column);
            }
        }
        map
    })
}

pub(crate) fn column_for_header(header: &str) -> Option<Column> {
    header_map().get(&normalize_header(header)).copied()
}

/// Rewrites recognised headers to their deserializer keys.
///
/// The first header matching a column claims it; later duplicates keep their original text so
/// they are ignored. Returns the rewritten header row and every column that was not found.
pub(crate) fn resolve_headers(headers: &StringRecord) -> (StringRecord, Vec<Column>) {
    let mut claimed = Vec::new();
    let resolved = headers
        .iter()
        .map(|header| match column_for_header(header) {
            Some(column) if !claimed.contains(&column) => {
                claimed.push(column);
                column.key().to_string()
            }
            _ => header.to_string(),
        })
        .collect::<Vec<_>>();

    let missing = Column::ordered()
        .into_iter()
        .filter(|column| !claimed.contains(column))
        .collect();

    (StringRecord::from(resolved), missing)
}
