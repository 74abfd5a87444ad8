pub mod types;
pub mod yaml;

pub use types::{LocatorRef, Scenario, Step, Strategy};
pub use yaml::{collect_scenario_files, parse_scenario_file, parse_yaml_content};
