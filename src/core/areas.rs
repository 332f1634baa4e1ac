//! The fixed work list: Scotland's 32 council areas.
//!
//! Identity is the name string; the order here defines the order of
//! stage outcomes, report naming and log output for every run.

/// The 32 council areas, in report order.
pub const COUNCIL_AREAS: [&str; 32] = [
    "Aberdeen City",
    "Aberdeenshire",
    "Angus",
    "Argyll and Bute",
    "City of Edinburgh",
    "Clackmannanshire",
    "Dumfries and Galloway",
    "Dundee City",
    "East Ayrshire",
    "East Dunbartonshire",
    "East Lothian",
    "East Renfrewshire",
    "Falkirk",
    "Fife",
    "Glasgow City",
    "Highland",
    "Inverclyde",
    "Midlothian",
    "Moray",
    "Na h-Eileanan Siar",
    "North Ayrshire",
    "North Lanarkshire",
    "Orkney Islands",
    "Perth and Kinross",
    "Renfrewshire",
    "Scottish Borders",
    "Shetland Islands",
    "South Ayrshire",
    "South Lanarkshire",
    "Stirling",
    "West Dunbartonshire",
    "West Lothian",
];

/// Default suffix for rendered documents.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "-profile.pdf";

/// The council areas as owned strings, in report order.
pub fn council_areas() -> Vec<String> {
    COUNCIL_AREAS.iter().map(|a| a.to_string()).collect()
}

/// Derive the filesystem slug for an area name: lower-cased, spaces
/// replaced by hyphens. Collision-free because area names are unique.
pub fn slugify(area: &str) -> String {
    area.to_lowercase().replace(' ', "-")
}

/// Deterministic output document name for an area.
pub fn output_name(area: &str, suffix: &str) -> String {
    format!("{}{}", slugify(area), suffix)
}
