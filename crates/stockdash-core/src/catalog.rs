//! Industry -> ticker table behind the cascading selector.
//!
//! Stored as TOML, one `[[industry]]` table per grouping, in display order:
//!
//! ```toml
//! [[industry]]
//! name = "Energy"
//! symbols = ["RELIANCE.NS", "NTPC.NS"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CatalogError, Industry, Symbol};

const BUNDLED: &str = include_str!("../catalog/industries.toml");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    industry: Vec<IndustryEntry>,
}

#[derive(Debug, Deserialize)]
struct IndustryEntry {
    name: String,
    #[serde(default)]
    symbols: Vec<String>,
}

/// One industry and its member symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndustryGroup {
    pub name: Industry,
    pub symbols: Vec<Symbol>,
}

/// Validated industry catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    industries: Vec<IndustryGroup>,
}

impl Catalog {
    /// The five-industry NSE table shipped with the crate.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_toml(BUNDLED)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;

        let mut seen = HashSet::new();
        let mut industries = Vec::with_capacity(file.industry.len());
        for entry in file.industry {
            let name = Industry::parse(&entry.name)?;
            if !seen.insert(name.as_str().to_ascii_lowercase()) {
                return Err(CatalogError::DuplicateIndustry {
                    name: name.as_str().to_owned(),
                });
            }

            let symbols = entry
                .symbols
                .iter()
                .map(|symbol| Symbol::parse(symbol))
                .collect::<Result<Vec<_>, _>>()?;
            industries.push(IndustryGroup { name, symbols });
        }

        Ok(Self { industries })
    }

    pub fn industries(&self) -> &[IndustryGroup] {
        &self.industries
    }

    pub fn industry_names(&self) -> impl Iterator<Item = &Industry> {
        self.industries.iter().map(|group| &group.name)
    }

    /// Looks up an industry by name, ignoring ASCII case.
    pub fn find(&self, name: &str) -> Option<&IndustryGroup> {
        let name = name.trim();
        self.industries
            .iter()
            .find(|group| group.name.as_str().eq_ignore_ascii_case(name))
    }

    pub fn symbols(&self, industry: &Industry) -> Option<&[Symbol]> {
        self.find(industry.as_str())
            .map(|group| group.symbols.as_slice())
    }

    /// The catalog's spelling of `symbol` within `industry`, matched ignoring
    /// ASCII case.
    pub fn member(&self, industry: &Industry, symbol: &Symbol) -> Option<&Symbol> {
        self.symbols(industry)?
            .iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(symbol.as_str()))
    }

    pub fn contains(&self, industry: &Industry, symbol: &Symbol) -> bool {
        self.member(industry, symbol).is_some()
    }
}
