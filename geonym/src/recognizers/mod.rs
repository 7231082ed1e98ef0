//! Default collaborators.
//!
//! | Collaborator            | Role                                          |
//! |-------------------------|-----------------------------------------------|
//! | `AddressDetailAnnotator`| claims house numbers and streets              |
//! | `OrganizationAnnotator` | claims organization names                     |
//! | `DefaultTerritoryParser`| designators, lexicon names, adjectives        |
//! | `DefaultCityParser`     | "designator + name" and lexicon city names    |
//! | `DefaultDefiner`        | candidate lists to entities                   |
//! | `DefaultOracle`         | administrative containment                    |

mod annotate;
mod city;
mod definer;
pub(crate) mod items;
mod oracle;
mod territory;

pub use annotate::{AddressDetailAnnotator, OrganizationAnnotator};
pub use city::DefaultCityParser;
pub use definer::DefaultDefiner;
pub use oracle::DefaultOracle;
pub use territory::DefaultTerritoryParser;
