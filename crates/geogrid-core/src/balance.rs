//! Network-wide production/consumption balance over all regions.

use serde::Serialize;

use crate::units::Megawatts;
use crate::Region;

/// Aggregate totals across a set of regions at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RegionalBalance {
    pub total_production: Megawatts,
    pub total_consumption: Megawatts,
    pub total_exports: Megawatts,
    pub total_imports: Megawatts,
    /// production - consumption
    pub net_supply_minus_demand: Megawatts,
    /// exports - imports
    pub net_export_minus_import: Megawatts,
    /// net supply minus net export; zero when the declared flows close
    pub excess: Megawatts,
}

/// Sum each region field and derive the net figures. Empty input yields all zeros.
pub fn balance<'a, I>(regions: I) -> RegionalBalance
where
    I: IntoIterator<Item = &'a Region>,
{
    let mut total_production = Megawatts(0.0);
    let mut total_consumption = Megawatts(0.0);
    let mut total_exports = Megawatts(0.0);
    let mut total_imports = Megawatts(0.0);
    for region in regions {
        total_production = total_production + region.production;
        total_consumption = total_consumption + region.consumption;
        total_exports = total_exports + region.exports;
        total_imports = total_imports + region.imports;
    }
    let net_supply_minus_demand = total_production - total_consumption;
    let net_export_minus_import = total_exports - total_imports;
    RegionalBalance {
        total_production,
        total_consumption,
        total_exports,
        total_imports,
        net_supply_minus_demand,
        net_export_minus_import,
        excess: net_supply_minus_demand - net_export_minus_import,
    }
}

impl std::fmt::Display for RegionalBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Export-Import : {} :: {} => {}",
            self.total_exports.value(),
            self.total_imports.value(),
            self.net_export_minus_import.value()
        )?;
        writeln!(
            f,
            "Prod-Cons     : {} :: {} => {}",
            self.total_production.value(),
            self.total_consumption.value(),
            self.net_supply_minus_demand.value()
        )?;
        write!(f, "Excess        : {}", self.excess.value())
    }
}
