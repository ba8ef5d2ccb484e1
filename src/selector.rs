//! Asset selection
//!
//! Picks the single canonical installable asset for Linux out of a release's
//! classified assets.

use crate::classifier::{Architecture, ClassifiedAsset, OsFamily};
use crate::error::{GenError, GenResult};

/// Check if an asset survives the eligibility filter
///
/// Source archives, checksum files and assets built for another OS are
/// dropped. Assets without an OS marker are only kept when they are
/// tarballs, which are tentatively treated as OS-agnostic.
pub fn is_eligible(asset: &ClassifiedAsset) -> bool {
    if asset.is_source_archive || asset.is_checksum_file {
        return false;
    }
    match asset.os_family {
        OsFamily::Target => true,
        OsFamily::Other => false,
        OsFamily::Unknown => asset.package_format.is_tarball(),
    }
}

/// Filter a candidate set down to the eligible assets, preserving order
pub fn eligible_assets(assets: &[ClassifiedAsset]) -> Vec<&ClassifiedAsset> {
    assets.iter().filter(|a| is_eligible(a)).collect()
}

/// Select the best asset for the target
///
/// Only the most preferred priority class is considered. Among several
/// assets of that class an x86-64 build wins; otherwise the first one in
/// release order is returned.
pub fn select_asset(assets: &[ClassifiedAsset]) -> GenResult<&ClassifiedAsset> {
    let eligible = eligible_assets(assets);

    let best_priority = eligible
        .iter()
        .map(|a| a.priority_class)
        .min()
        .ok_or_else(|| GenError::NoEligibleAsset {
            candidates: assets.iter().map(|a| a.asset.name.clone()).collect(),
        })?;

    let top: Vec<&ClassifiedAsset> = eligible
        .into_iter()
        .filter(|a| a.priority_class == best_priority)
        .collect();

    let chosen = match top.as_slice() {
        [only] => *only,
        _ => top
            .iter()
            .find(|a| a.architecture == Architecture::X86_64)
            .or_else(|| top.first())
            .copied()
            .ok_or_else(|| GenError::NoEligibleAsset {
                candidates: assets.iter().map(|a| a.asset.name.clone()).collect(),
            })?,
    };

    tracing::info!(
        target: "tapgen::select",
        asset = %chosen.asset.name,
        format = %chosen.package_format,
        arch = %chosen.architecture,
        contenders = top.len(),
        "Selected release asset"
    );

    Ok(chosen)
}
