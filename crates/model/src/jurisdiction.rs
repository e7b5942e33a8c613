//! Static jurisdiction data: state → TANF variable, and the county/region table for
//! states whose benefit levels depend on the county.
//!
//! States run TANF under their own program names (ATAP, TEA, TAFDC, Reach Up, ...);
//! the simulator exposes each as a state-prefixed variable.

use serde::Serialize;

/// Bumped whenever a row of [`STATES`] or [`CA_COUNTIES`] changes.
pub const TABLE_VERSION: u32 = 1;

/// Simulator variable used when a state has no dedicated implementation.
pub const GENERIC_TANF_VARIABLE: &str = "tanf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub tanf_variable: &'static str,
    pub requires_county: bool,
}

const fn state(code: &'static str, name: &'static str, tanf_variable: &'static str) -> StateInfo {
    StateInfo {
        code,
        name,
        tanf_variable,
        requires_county: false,
    }
}

pub const STATES: &[StateInfo] = &[
    state("AK", "Alaska", "ak_atap"),
    state("AL", "Alabama", "al_tanf"),
    state("AR", "Arkansas", "ar_tea"),
    state("AZ", "Arizona", "az_tanf"),
    StateInfo {
        code: "CA",
        name: "California",
        tanf_variable: "ca_tanf",
        requires_county: true,
    },
    state("CO", "Colorado", "co_tanf"),
    state("CT", "Connecticut", "ct_tfa"),
    state("DC", "District of Columbia", "dc_tanf"),
    // 2025+ only in the simulator.
    state("DE", "Delaware", "de_tanf"),
    state("FL", "Florida", "fl_tca"),
    state("GA", "Georgia", "ga_tanf"),
    state("HI", "Hawaii", "hi_tanf"),
    state("IA", "Iowa", "ia_fip"),
    state("ID", "Idaho", "id_tafi"),
    state("IL", "Illinois", "il_tanf"),
    state("IN", "Indiana", "in_tanf"),
    state("KS", "Kansas", "ks_tanf"),
    state("KY", "Kentucky", "ky_ktap"),
    state("LA", "Louisiana", "la_fitap"),
    state("MA", "Massachusetts", "ma_tafdc"),
    state("MD", "Maryland", "md_tca"),
    state("ME", "Maine", "me_tanf"),
    state("MI", "Michigan", "mi_fip"),
    // 2025+ only in the simulator.
    state("MN", "Minnesota", "mn_mfip"),
    state("MO", "Missouri", "mo_tanf"),
    state("MS", "Mississippi", "ms_tanf"),
    state("MT", "Montana", "mt_tanf"),
    state("NC", "North Carolina", "nc_tanf"),
    state("ND", "North Dakota", "nd_tanf"),
    state("NE", "Nebraska", "ne_adc"),
    state("NH", "New Hampshire", "nh_fanf"),
    state("NJ", "New Jersey", "nj_wfnj"),
    state("NM", "New Mexico", "nm_works"),
    state("NV", "Nevada", "nv_tanf"),
    state("NY", "New York", "ny_tanf"),
    // 2025+ only in the simulator.
    state("OH", "Ohio", "oh_owf"),
    state("OK", "Oklahoma", "ok_tanf"),
    state("OR", "Oregon", "or_tanf"),
    state("PA", "Pennsylvania", "pa_tanf"),
    state("RI", "Rhode Island", "ri_works"),
    state("SC", "South Carolina", "sc_tanf"),
    state("SD", "South Dakota", "sd_tanf"),
    state("TN", "Tennessee", "tn_ff"),
    state("TX", "Texas", "tx_tanf"),
    state("UT", "Utah", "ut_fep"),
    state("VA", "Virginia", "va_tanf"),
    state("VT", "Vermont", "vt_reach_up"),
    state("WA", "Washington", "wa_tanf"),
    // 2025+ only in the simulator.
    state("WI", "Wisconsin", "wi_works"),
    state("WV", "West Virginia", "wv_works"),
    state("WY", "Wyoming", "wy_power"),
];

pub fn state_info(code: &str) -> Option<&'static StateInfo> {
    STATES.iter().find(|info| info.code == code)
}

pub fn is_supported(code: &str) -> bool {
    state_info(code).is_some()
}

/// Display name for a state code, falling back to the code itself.
pub fn state_name(code: &str) -> &str {
    state_info(code).map(|info| info.name).unwrap_or(code)
}

/// The simulator variable holding the state's TANF amount.
pub fn resolve_variable(code: &str) -> &'static str {
    state_info(code)
        .map(|info| info.tanf_variable)
        .unwrap_or(GENERIC_TANF_VARIABLE)
}

/// County enum name as understood by the simulator, plus its benefit region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct County {
    pub code: &'static str,
    pub name: &'static str,
    pub region: u8,
}

const fn county(code: &'static str, name: &'static str, region: u8) -> County {
    County { code, name, region }
}

pub const CA_REGION_NOTE: &str = "Region 1 = higher cost counties, Region 2 = other counties";

pub const CA_COUNTIES: &[County] = &[
    county("ALAMEDA_COUNTY_CA", "Alameda", 1),
    county("ALPINE_COUNTY_CA", "Alpine", 2),
    county("AMADOR_COUNTY_CA", "Amador", 2),
    county("BUTTE_COUNTY_CA", "Butte", 2),
    county("CALAVERAS_COUNTY_CA", "Calaveras", 2),
    county("COLUSA_COUNTY_CA", "Colusa", 2),
    county("CONTRA_COSTA_COUNTY_CA", "Contra Costa", 1),
    county("DEL_NORTE_COUNTY_CA", "Del Norte", 2),
    county("EL_DORADO_COUNTY_CA", "El Dorado", 2),
    county("FRESNO_COUNTY_CA", "Fresno", 2),
    county("GLENN_COUNTY_CA", "Glenn", 2),
    county("HUMBOLDT_COUNTY_CA", "Humboldt", 2),
    county("IMPERIAL_COUNTY_CA", "Imperial", 2),
    county("INYO_COUNTY_CA", "Inyo", 2),
    county("KERN_COUNTY_CA", "Kern", 2),
    county("KINGS_COUNTY_CA", "Kings", 2),
    county("LAKE_COUNTY_CA", "Lake", 2),
    county("LASSEN_COUNTY_CA", "Lassen", 2),
    county("LOS_ANGELES_COUNTY_CA", "Los Angeles", 1),
    county("MADERA_COUNTY_CA", "Madera", 2),
    county("MARIN_COUNTY_CA", "Marin", 1),
    county("MARIPOSA_COUNTY_CA", "Mariposa", 2),
    county("MENDOCINO_COUNTY_CA", "Mendocino", 2),
    county("MERCED_COUNTY_CA", "Merced", 2),
    county("MODOC_COUNTY_CA", "Modoc", 2),
    county("MONO_COUNTY_CA", "Mono", 2),
    county("MONTEREY_COUNTY_CA", "Monterey", 1),
    county("NAPA_COUNTY_CA", "Napa", 1),
    county("NEVADA_COUNTY_CA", "Nevada", 2),
    county("ORANGE_COUNTY_CA", "Orange", 1),
    county("PLACER_COUNTY_CA", "Placer", 2),
    county("PLUMAS_COUNTY_CA", "Plumas", 2),
    county("RIVERSIDE_COUNTY_CA", "Riverside", 2),
    county("SACRAMENTO_COUNTY_CA", "Sacramento", 2),
    county("SAN_BENITO_COUNTY_CA", "San Benito", 2),
    county("SAN_BERNARDINO_COUNTY_CA", "San Bernardino", 2),
    county("SAN_DIEGO_COUNTY_CA", "San Diego", 1),
    county("SAN_FRANCISCO_COUNTY_CA", "San Francisco", 1),
    county("SAN_JOAQUIN_COUNTY_CA", "San Joaquin", 2),
    county("SAN_LUIS_OBISPO_COUNTY_CA", "San Luis Obispo", 1),
    county("SAN_MATEO_COUNTY_CA", "San Mateo", 1),
    county("SANTA_BARBARA_COUNTY_CA", "Santa Barbara", 1),
    county("SANTA_CLARA_COUNTY_CA", "Santa Clara", 1),
    county("SANTA_CRUZ_COUNTY_CA", "Santa Cruz", 1),
    county("SHASTA_COUNTY_CA", "Shasta", 2),
    county("SIERRA_COUNTY_CA", "Sierra", 2),
    county("SISKIYOU_COUNTY_CA", "Siskiyou", 2),
    county("SOLANO_COUNTY_CA", "Solano", 1),
    county("SONOMA_COUNTY_CA", "Sonoma", 1),
    county("STANISLAUS_COUNTY_CA", "Stanislaus", 2),
    county("SUTTER_COUNTY_CA", "Sutter", 2),
    county("TEHAMA_COUNTY_CA", "Tehama", 2),
    county("TRINITY_COUNTY_CA", "Trinity", 2),
    county("TULARE_COUNTY_CA", "Tulare", 2),
    county("TUOLUMNE_COUNTY_CA", "Tuolumne", 2),
    county("VENTURA_COUNTY_CA", "Ventura", 1),
    county("YOLO_COUNTY_CA", "Yolo", 2),
    county("YUBA_COUNTY_CA", "Yuba", 2),
];

/// County table for a state, if benefit levels there depend on the county.
pub fn counties(code: &str) -> Option<&'static [County]> {
    match code {
        "CA" => Some(CA_COUNTIES),
        _ => None,
    }
}

pub fn region_note(code: &str) -> Option<&'static str> {
    match code {
        "CA" => Some(CA_REGION_NOTE),
        _ => None,
    }
}
