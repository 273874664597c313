//! kenrich: convention-based enrichment of Kubernetes resource fragments.
//!
//! Fragment files such as `web-svc.yaml` or `dc.yaml` only need to carry what
//! cannot be guessed: kind, apiVersion and metadata.name are filled in from the
//! file name and a kind ↔ filename type table.

pub mod cli;
pub mod core;
