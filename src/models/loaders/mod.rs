pub mod json_loader;
pub mod toml_loader;

pub use json_loader::{load_raw_records, load_raw_set, resolve_set_path, write_bank_file};
pub use toml_loader::{load_manifest, parse_manifest};
