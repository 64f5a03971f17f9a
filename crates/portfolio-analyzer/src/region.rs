//! Region Classification
//!
//! Maps token symbols to the monetary region they track. The classifier is
//! an explicit value handed to the engine so tests can use synthetic maps.

use std::collections::BTreeMap;

use crate::model::GLOBAL_REGION;

/// Stock stablecoin table: (symbol, region). The first symbol listed for a
/// region is the swap target suggested for that region.
const STABLECOIN_TABLE: &[(&str, &str)] = &[
    ("USDC", "USA"),
    ("CUSD", "USA"),
    ("USDT", "USA"),
    ("DAI", "USA"),
    ("PYUSD", "USA"),
    ("USDGLO", "USA"),
    ("EURC", "Europe"),
    ("CEUR", "Europe"),
    ("EURS", "Europe"),
    ("EURE", "Europe"),
    ("CREAL", "LatAm"),
    ("BRLA", "LatAm"),
    ("CCOP", "LatAm"),
    ("MXNB", "LatAm"),
    ("CKES", "Africa"),
    ("EXOF", "Africa"),
    ("CGHS", "Africa"),
    ("CNGN", "Africa"),
    ("CZAR", "Africa"),
    ("PUSO", "Asia"),
    ("XSGD", "Asia"),
    ("CJPY", "Asia"),
    ("IDRT", "Asia"),
];

const STABLECOIN_REGIONS: &[&str] = &["USA", "Europe", "LatAm", "Africa", "Asia"];

/// Symbol → region lookup plus the ordered catalog of known regions
#[derive(Clone, Debug, Default)]
pub struct RegionClassifier {
    catalog: Vec<String>,
    regions: BTreeMap<String, String>,
    representatives: BTreeMap<String, String>,
}

impl RegionClassifier {
    /// Empty classifier over the given region catalog (order is preserved)
    pub fn new<I, S>(catalog: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classifier = Self::default();
        for region in catalog {
            let region = region.into();
            if !classifier.catalog.contains(&region) {
                classifier.catalog.push(region);
            }
        }
        classifier
    }

    /// Default table for the supported stablecoins
    pub fn stablecoins() -> Self {
        STABLECOIN_TABLE.iter().fold(
            Self::new(STABLECOIN_REGIONS.iter().copied()),
            |classifier, (symbol, region)| classifier.with_token(*symbol, *region),
        )
    }

    /// Map a symbol to a region. The first token registered for a region
    /// becomes its representative swap target.
    pub fn with_token(mut self, symbol: impl Into<String>, region: impl Into<String>) -> Self {
        let symbol = symbol.into().to_uppercase();
        let region = region.into();

        if !self.catalog.contains(&region) {
            self.catalog.push(region.clone());
        }
        self.representatives
            .entry(region.clone())
            .or_insert_with(|| symbol.clone());
        self.regions.insert(symbol, region);
        self
    }

    /// Override the swap target for a region
    pub fn with_representative(mut self, region: impl Into<String>, symbol: impl Into<String>) -> Self {
        let region = region.into();
        let symbol = symbol.into().to_uppercase();
        self.regions.insert(symbol.clone(), region.clone());
        if !self.catalog.contains(&region) {
            self.catalog.push(region.clone());
        }
        self.representatives.insert(region, symbol);
        self
    }

    /// Region for a symbol, or the `Global` sentinel when unknown
    pub fn classify(&self, symbol: &str) -> &str {
        self.regions
            .get(&symbol.to_uppercase())
            .map_or(GLOBAL_REGION, String::as_str)
    }

    /// Token to swap into when moving value to `region`
    pub fn representative(&self, region: &str) -> Option<&str> {
        self.representatives.get(region).map(String::as_str)
    }

    /// Known regions in catalog order
    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    /// Catalog size, never below 1
    pub fn region_capacity(&self) -> usize {
        self.catalog.len().max(1)
    }
}
