//! Per-identifier view across both datasets, for renderers and other collaborators

use serde::Serialize;
use crate::Result;
use crate::chemical::ChemicalRecord;
use crate::exposure::ExposureLimitRecord;
use crate::storage::Store;

#[derive(Debug, Clone, Serialize)]
pub struct CombinedRecord {
    pub identifier: String,
    pub chemical: Option<ChemicalRecord>,
    pub exposure_limit: Option<ExposureLimitRecord>,
    pub has_data: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletenessReport {
    pub identifier: String,
    pub has_chemical: bool,
    pub has_exposure_limit: bool,
    pub completeness_percentage: u8,
    pub recommendations: Vec<String>,
}

/// Look up one CAS number in both stores (first match on each side)
pub async fn lookup(
    chemicals: &Store<ChemicalRecord>,
    limits: &Store<ExposureLimitRecord>,
    identifier: &str,
) -> Result<CombinedRecord> {
    let chemical = chemicals.get_by_identifier(identifier).await?.into_iter().next();
    let exposure_limit = limits.get_by_identifier(identifier).await?.into_iter().next();
    Ok(CombinedRecord {
        identifier: identifier.to_string(),
        has_data: chemical.is_some() || exposure_limit.is_some(),
        chemical,
        exposure_limit,
    })
}

/// How much of the combined view exists for one CAS number
pub async fn completeness(
    chemicals: &Store<ChemicalRecord>,
    limits: &Store<ExposureLimitRecord>,
    identifier: &str,
) -> Result<CompletenessReport> {
    let combined = lookup(chemicals, limits, identifier).await?;
    Ok(CompletenessReport::from(&combined))
}

impl From<&CombinedRecord> for CompletenessReport {
    fn from(combined: &CombinedRecord) -> Self {
        let has_chemical = combined.chemical.is_some();
        let has_exposure_limit = combined.exposure_limit.is_some();
        let present = has_chemical as u8 + has_exposure_limit as u8;

        let mut recommendations = Vec::new();
        if !has_chemical {
            recommendations.push(format!(
                "No safety data sheet for {}; import one to complete hazard and handling data",
                combined.identifier
            ));
        }
        match &combined.exposure_limit {
            None => recommendations.push(format!(
                "No occupational exposure limit for {}; check the regulatory limit tables",
                combined.identifier
            )),
            Some(limit) if !limit.has_limits() => recommendations.push(format!(
                "Exposure-limit entry for {} carries no numeric limit values",
                combined.identifier
            )),
            Some(_) => {}
        }
        if recommendations.is_empty() {
            recommendations.push(format!("Data for {} is complete", combined.identifier));
        }

        Self {
            identifier: combined.identifier.clone(),
            has_chemical,
            has_exposure_limit,
            completeness_percentage: present * 50,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn stores() -> (Store<ChemicalRecord>, Store<ExposureLimitRecord>) {
        let chemicals = Store::open_in_memory();
        let limits = Store::open_in_memory();
        chemicals.insert(&ChemicalRecord::new("苯").with_cas("71-43-2")).await.unwrap();
        chemicals.insert(&ChemicalRecord::new("丙酮").with_cas("67-64-1")).await.unwrap();
        let mut benzene = ExposureLimitRecord::new("苯").with_cas("71-43-2");
        benzene.pc_twa = Some(6.0);
        limits.insert(&benzene).await.unwrap();
        limits.insert(&ExposureLimitRecord::new("甲醛").with_cas("50-00-0")).await.unwrap();
        (chemicals, limits)
    }

    #[tokio::test]
    async fn test_lookup_both_sides() {
        let (chemicals, limits) = stores().await;

        let both = lookup(&chemicals, &limits, "71-43-2").await.unwrap();
        assert!(both.has_data);
        assert!(both.chemical.is_some());
        assert!(both.exposure_limit.is_some());

        let missing = lookup(&chemicals, &limits, "0-00-0").await.unwrap();
        assert!(!missing.has_data);
    }

    #[tokio::test]
    async fn test_completeness_report() {
        let (chemicals, limits) = stores().await;

        let full = completeness(&chemicals, &limits, "71-43-2").await.unwrap();
        assert_eq!(full.completeness_percentage, 100);
        assert_eq!(full.recommendations.len(), 1);
        assert!(full.recommendations[0].contains("complete"));

        let half = completeness(&chemicals, &limits, "67-64-1").await.unwrap();
        assert!(half.has_chemical);
        assert!(!half.has_exposure_limit);
        assert_eq!(half.completeness_percentage, 50);
        assert!(half.recommendations[0].contains("exposure limit"));

        let valueless = completeness(&chemicals, &limits, "50-00-0").await.unwrap();
        assert!(valueless.has_exposure_limit);
        assert_eq!(valueless.completeness_percentage, 50);
        assert!(valueless.recommendations.iter().any(|r| r.contains("no numeric limit values")));

        let none = completeness(&chemicals, &limits, "0-00-0").await.unwrap();
        assert_eq!(none.completeness_percentage, 0);
        assert_eq!(none.recommendations.len(), 2);
    }
}
