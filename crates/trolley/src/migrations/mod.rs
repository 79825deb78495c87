//! Schema migrations, ordered by version prefix.

mod m2026_08_10_090000_create_catalog;
mod m2026_08_10_091500_create_shopping;
mod m2026_08_14_114500_create_signals;
