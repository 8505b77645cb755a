//! Static lookup tables consulted by the pricing chain.

use std::collections::BTreeMap;

/// Known material names mapped to the symbol that prices them.
///
/// Keys are matched exactly; case is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    entries: BTreeMap<String, String>,
}

impl SymbolTable {
    pub fn get(&self, material: &str) -> Option<&str> {
        self.entries.get(material).map(String::as_str)
    }

    pub fn contains(&self, material: &str) -> bool {
        self.entries.contains_key(material)
    }

    pub fn materials(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<M, S> FromIterator<(M, S)> for SymbolTable
where
    M: Into<String>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (M, S)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(material, symbol)| (material.into(), symbol.into()))
                .collect(),
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        [
            ("Gold", "XAUUSD"),
            ("Silver", "XAGUSD"),
            ("Platinum", "XPTUSD"),
            ("Palladium", "XPDUSD"),
            ("Steel", "NUE"),
            ("Stainless Steel", "STLD"),
            ("Iron", "VALE"),
            ("Copper", "FCX"),
            ("Aluminium", "AA"),
            ("Nickel", "BHP"),
            ("Zinc", "RIO"),
            ("Lithium", "ALB"),
            ("Rare Earth Elements", "MP"),
            ("Plastic", "DOW"),
            ("Polyethylene", "LYB"),
            ("Polypropylene", "LYB"),
            ("PVC", "WLK"),
            ("Glass", "GLW"),
            ("Rubber", "GT"),
            ("Cement", "CX"),
            ("Concrete", "VMC"),
            ("Silicon", "TSM"),
            ("Paint", "SHW"),
            ("Fertilizer", "MOS"),
            ("Industrial Gas", "LIN"),
        ]
        .into_iter()
        .collect()
    }
}

/// Commodities the market data service quotes, keyed by symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommodityCatalog {
    entries: Vec<(String, String)>,
}

impl CommodityCatalog {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// `(symbol, name)` pairs in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(symbol, name)| (symbol.as_str(), name.as_str()))
    }

    /// Finds the entry whose name equals `name`, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<(&str, &str)> {
        self.entries()
            .find(|(_, candidate)| candidate.eq_ignore_ascii_case(name))
    }
}

impl Default for CommodityCatalog {
    fn default() -> Self {
        let entries = [
            ("XAUUSD", "Gold"),
            ("XAGUSD", "Silver"),
            ("XPTUSD", "Platinum"),
            ("XPDUSD", "Palladium"),
            ("WTI", "Crude Oil (WTI)"),
            ("BRENT", "Crude Oil (Brent)"),
            ("NATURAL_GAS", "Natural Gas"),
            ("COPPER", "Copper"),
            ("ALUMINUM", "Aluminum"),
            ("WHEAT", "Wheat"),
            ("CORN", "Corn"),
            ("COTTON", "Cotton"),
            ("SUGAR", "Sugar"),
            ("COFFEE", "Coffee"),
        ];
        Self::new(
            entries
                .into_iter()
                .map(|(symbol, name)| (symbol.to_string(), name.to_string()))
                .collect(),
        )
    }
}

/// Listed companies as `(name, symbol)` pairs, in listing order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompanyDirectory {
    companies: Vec<(String, String)>,
}

impl CompanyDirectory {
    pub fn new(companies: Vec<(String, String)>) -> Self {
        Self { companies }
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn companies(&self) -> impl Iterator<Item = (&str, &str)> {
        self.companies
            .iter()
            .map(|(name, symbol)| (name.as_str(), symbol.as_str()))
    }

    /// Case-insensitive exact name match.
    pub fn find_exact(&self, company: &str) -> Option<(&str, &str)> {
        self.companies()
            .find(|(name, _)| name.eq_ignore_ascii_case(company))
    }

    /// First company whose name contains `company` or is contained in it.
    pub fn find_partial(&self, company: &str) -> Option<(&str, &str)> {
        let needle = company.to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.companies().find(|(name, _)| {
            let name = name.to_lowercase();
            name.contains(&needle) || needle.contains(&name)
        })
    }

    pub fn find_symbol(&self, symbol: &str) -> Option<(&str, &str)> {
        self.companies()
            .find(|(_, candidate)| candidate.eq_ignore_ascii_case(symbol))
    }

    /// Major materials manufacturers, used when no exchange listing is loaded.
    pub fn builtin() -> Self {
        let companies = [
            ("BHP Group", "BHP"),
            ("Rio Tinto", "RIO"),
            ("Vale S.A.", "VALE"),
            ("Freeport-McMoRan", "FCX"),
            ("Newmont Corporation", "NEM"),
            ("Alcoa Corporation", "AA"),
            ("Nucor Corporation", "NUE"),
            ("Steel Dynamics", "STLD"),
            ("DuPont", "DD"),
            ("Dow Inc.", "DOW"),
            ("BASF", "BASFY"),
            ("LyondellBasell", "LYB"),
            ("Ecolab", "ECL"),
            ("Sherwin-Williams", "SHW"),
            ("Intel", "INTC"),
            ("Taiwan Semiconductor", "TSM"),
            ("Advanced Micro Devices", "AMD"),
            ("NVIDIA", "NVDA"),
            ("Qualcomm", "QCOM"),
            ("Micron Technology", "MU"),
            ("Exxon Mobil", "XOM"),
            ("Chevron", "CVX"),
            ("ConocoPhillips", "COP"),
            ("EOG Resources", "EOG"),
            ("Vulcan Materials", "VMC"),
            ("Martin Marietta Materials", "MLM"),
            ("CRH plc", "CRH"),
            ("CEMEX", "CX"),
            ("Albemarle", "ALB"),
            ("Sociedad Quimica y Minera", "SQM"),
            ("FMC Corporation", "FMC"),
            ("Mosaic Company", "MOS"),
            ("Corning", "GLW"),
            ("Owens Corning", "OC"),
            ("Apogee Enterprises", "APOG"),
            ("Eastman Chemical", "EMN"),
            ("Westlake Chemical", "WLK"),
            ("Huntsman Corporation", "HUN"),
            ("Goodyear Tire & Rubber", "GT"),
            ("Lithium Americas", "LAC"),
            ("Piedmont Lithium", "PLL"),
            ("MP Materials", "MP"),
            ("Air Products & Chemicals", "APD"),
            ("Linde plc", "LIN"),
        ];
        Self::new(
            companies
                .into_iter()
                .map(|(name, symbol)| (name.to_string(), symbol.to_string()))
                .collect(),
        )
    }
}
