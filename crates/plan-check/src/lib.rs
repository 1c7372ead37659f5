//! Floor-plan validation engine for BBL CAD drawings.
//!
//! A drawing (LibreDWG JSON export) and an optional room list are checked against a catalog of
//! layer, geometry, entity, text and room-identifier rules. The result is a list of findings, a
//! 0-100 quality score and a status per room.

pub mod config;
pub mod drawing;
pub mod error;
pub mod projects;
pub mod room_list;
pub mod telemetry;
pub mod validation;
