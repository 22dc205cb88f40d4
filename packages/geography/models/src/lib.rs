#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spanish administrative geography tables.
//!
//! Three independent groups of fixed tables live here:
//!
//! - [`postal`]: two-digit code prefix → region name, used by the income
//!   loader.
//! - [`names`]: upstream export labels → canonical community and province
//!   names, plus the single-province community table used to backfill the
//!   province level.
//! - [`display`]: canonical names → the names used by the boundary
//!   polygon files the map joins against.

pub mod display;
pub mod names;
pub mod postal;

use serde::{Deserialize, Serialize};

/// Administrative level of a row or a map layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoLevel {
    /// Autonomous community.
    Community,
    /// Province.
    Province,
    /// Municipality.
    Municipality,
}

impl GeoLevel {
    /// All levels, coarsest first.
    pub const ALL: [Self; 3] = [Self::Community, Self::Province, Self::Municipality];

    /// Spanish column label for this level.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Community => "Comunidad",
            Self::Province => "Provincia",
            Self::Municipality => "Municipio",
        }
    }
}
