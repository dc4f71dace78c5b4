//! The region catalog: a load-once, read-only table of forecast regions.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::region::provider::{parse_region_id, Provider};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read region catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("region catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid region id: {0:?}")]
    InvalidRegionId(String),
    #[error("duplicate region id: {0}")]
    DuplicateRegion(String),
}

/// One forecast zone issued by one provider.
///
/// Provider and local id are derived from the region id when the region is
/// built, never read from the catalog file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    region_id: String,
    display_name: String,
    source_url: String,
    provider: Provider,
}

impl Region {
    pub fn new(
        region_id: impl Into<String>,
        display_name: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let region_id = region_id.into();
        let (provider, _) = parse_region_id(&region_id)
            .ok_or_else(|| CatalogError::InvalidRegionId(region_id.clone()))?;

        Ok(Self {
            region_id,
            display_name: display_name.into(),
            source_url: source_url.into(),
            provider,
        })
    }

    pub fn region_id(&self) -> &str {
        &self.region_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Everything after the provider prefix and its underscore.
    pub fn local_id(&self) -> &str {
        &self.region_id[self.provider.prefix().len() + 1..]
    }
}

/// Raw catalog record. Geometry (`points`) and any other extra fields are
/// ignored.
#[derive(Debug, Deserialize)]
struct RegionRecord {
    #[serde(rename = "regionId")]
    region_id: String,
    #[serde(rename = "displayName")]
    display_name: String,
    #[serde(rename = "URL", alias = "sourceURL", alias = "url")]
    source_url: String,
}

#[derive(Debug, Default)]
pub struct RegionCatalog {
    regions: Vec<Region>,
    index: HashMap<String, usize>,
}

impl RegionCatalog {
    pub fn from_regions(regions: Vec<Region>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(regions.len());
        for (i, region) in regions.iter().enumerate() {
            if index.insert(region.region_id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateRegion(region.region_id.clone()));
            }
        }
        Ok(Self { regions, index })
    }

    /// Parse a catalog from its JSON sequence of region records.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<RegionRecord> = serde_json::from_str(json)?;
        let regions = records
            .into_iter()
            .map(|r| Region::new(r.region_id, r.display_name, r.source_url))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_regions(regions)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Resolve a region id. Malformed ids, unknown prefixes and ids absent
    /// from the catalog all resolve to `None`.
    pub fn lookup(&self, region_id: &str) -> Option<&Region> {
        parse_region_id(region_id)?;
        self.index.get(region_id).map(|&i| &self.regions[i])
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        {"regionId": "nwac_olympics", "displayName": "Olympics", "URL": "http://example.test/nwac/olympics", "points": [{"lat": "47.8", "lon": "-123.5"}]},
        {"regionId": "caic_1b", "displayName": "Front Range", "sourceURL": "http://example.test/caic/1b"},
        {"regionId": "viac_", "displayName": "Vancouver Island", "url": "http://example.test/viac"}
    ]"#;

    #[test]
    fn test_lookup_resolves_catalog_regions() {
        let catalog = RegionCatalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.len(), 3);

        let region = catalog.lookup("nwac_olympics").unwrap();
        assert_eq!(region.provider(), Provider::Nwac);
        assert_eq!(region.local_id(), "olympics");
        assert_eq!(region.display_name(), "Olympics");
        assert_eq!(region.source_url(), "http://example.test/nwac/olympics");

        assert_eq!(catalog.lookup("caic_1b").unwrap().provider(), Provider::Caic);
        assert_eq!(catalog.lookup("viac_").unwrap().local_id(), "");
    }

    #[test]
    fn test_lookup_not_found() {
        let catalog = RegionCatalog::from_json(CATALOG).unwrap();
        assert!(catalog.lookup("").is_none());
        assert!(catalog.lookup("foo").is_none());
        assert!(catalog.lookup("foo_bar").is_none());
        assert!(catalog.lookup("caic_0123456").is_none());
        // Well-formed but not cataloged
        assert!(catalog.lookup("nwac_mt-hood").is_none());
    }

    #[test]
    fn test_invalid_region_id_is_fatal() {
        let err = RegionCatalog::from_json(
            r#"[{"regionId": "zzz_1", "displayName": "Nowhere", "URL": "http://example.test"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRegionId(id) if id == "zzz_1"));
    }

    #[test]
    fn test_duplicate_region_is_fatal() {
        let err = RegionCatalog::from_json(
            r#"[
                {"regionId": "pc_1", "displayName": "Banff", "URL": "http://example.test/1"},
                {"regionId": "pc_1", "displayName": "Banff again", "URL": "http://example.test/2"}
            ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateRegion(_)));
    }

    #[test]
    fn test_malformed_catalog_is_fatal() {
        assert!(matches!(
            RegionCatalog::from_json("{not json"),
            Err(CatalogError::Json(_))
        ));
    }
}
