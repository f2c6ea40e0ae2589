//! gabarito-report — presentation output for score reports.
//!
//! Renders a `ScoreReport` as a self-contained HTML page or as delimited
//! text, without transforming the series itself.

pub mod csv;
pub mod html;
