pub mod cli;
pub mod run;
pub mod run_enrich;
pub mod run_export;
pub mod run_harvest;
pub mod run_probe_site;
pub mod show_stats;
