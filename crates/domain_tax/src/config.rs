//! Tax engine configuration

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use core_kernel::Rate;
use domain_billing::{Jurisdiction, TaxCategory};

/// Jurisdiction rates and category exemptions
///
/// A jurisdiction with no entry here is *unconfigured*, which is not the
/// same as a configured zero rate: unconfigured invoices surface in their
/// own report bucket instead of being taxed at 0%.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxEngineConfig {
    rates: HashMap<Jurisdiction, Rate>,
    exempt_categories: HashSet<TaxCategory>,
}

impl TaxEngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the rate for a jurisdiction
    pub fn with_rate(mut self, jurisdiction: Jurisdiction, rate: Rate) -> Self {
        self.rates.insert(jurisdiction, rate);
        self
    }

    /// Marks a line item category as tax-exempt
    pub fn with_exempt_category(mut self, category: TaxCategory) -> Self {
        self.exempt_categories.insert(category);
        self
    }

    /// The configured rate for a jurisdiction, if any
    pub fn rate_for(&self, jurisdiction: &Jurisdiction) -> Option<Rate> {
        self.rates.get(jurisdiction).copied()
    }

    /// Returns true if a line item with this category is exempt
    pub fn is_exempt(&self, category: Option<&TaxCategory>) -> bool {
        category.is_some_and(|c| self.exempt_categories.contains(c))
    }
}
