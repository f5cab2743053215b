//! Closed enumerations for the customer lifecycle.
//!
//! The crawler never assigns these; they are supplied by callers at save
//! time (`country`/`category`) or managed through the CRM endpoints
//! (`status`). Wire form is lowercase.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid customer status: {0}")]
    InvalidStatus(String),
    #[error("invalid lead source: {0}")]
    InvalidSource(String),
    #[error("invalid category: {0}")]
    InvalidCategory(String),
}

/// Pipeline stage of a customer. New records always start at `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    New,
    Contacted,
    Interested,
    Negotiating,
    Converted,
    Lost,
}

impl CustomerStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CustomerStatus::New => "new",
            CustomerStatus::Contacted => "contacted",
            CustomerStatus::Interested => "interested",
            CustomerStatus::Negotiating => "negotiating",
            CustomerStatus::Converted => "converted",
            CustomerStatus::Lost => "lost",
        }
    }
}

impl std::str::FromStr for CustomerStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(CustomerStatus::New),
            "contacted" => Ok(CustomerStatus::Contacted),
            "interested" => Ok(CustomerStatus::Interested),
            "negotiating" => Ok(CustomerStatus::Negotiating),
            "converted" => Ok(CustomerStatus::Converted),
            "lost" => Ok(CustomerStatus::Lost),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

/// Where a customer record entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadSource {
    Crawl,
    Excel,
    Manual,
}

impl LeadSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LeadSource::Crawl => "crawl",
            LeadSource::Excel => "excel",
            LeadSource::Manual => "manual",
        }
    }
}

impl std::str::FromStr for LeadSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crawl" => Ok(LeadSource::Crawl),
            "excel" => Ok(LeadSource::Excel),
            "manual" => Ok(LeadSource::Manual),
            other => Err(DomainError::InvalidSource(other.to_string())),
        }
    }
}

/// Business category assigned at save time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Restaurant,
    Cafe,
    Shop,
    Beauty,
    Fitness,
    Medical,
    Education,
    Services,
    Other,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Restaurant => "restaurant",
            Category::Cafe => "cafe",
            Category::Shop => "shop",
            Category::Beauty => "beauty",
            Category::Fitness => "fitness",
            Category::Medical => "medical",
            Category::Education => "education",
            Category::Services => "services",
            Category::Other => "other",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restaurant" => Ok(Category::Restaurant),
            "cafe" => Ok(Category::Cafe),
            "shop" => Ok(Category::Shop),
            "beauty" => Ok(Category::Beauty),
            "fitness" => Ok(Category::Fitness),
            "medical" => Ok(Category::Medical),
            "education" => Ok(Category::Education),
            "services" => Ok(Category::Services),
            "other" => Ok(Category::Other),
            other => Err(DomainError::InvalidCategory(other.to_string())),
        }
    }
}
