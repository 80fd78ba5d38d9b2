/// Station registry for the Gallatin basin acquisition pipeline.
///
/// Defines the canonical gauge and snow-telemetry stations this pipeline
/// targets, along with their metadata. This is the single source of truth
/// for site identifiers — configuration defaults reference stations from
/// here rather than hardcoding codes elsewhere.

pub use crate::model::{ELEM_AIR_TEMPERATURE, ELEM_WATER_EQUIVALENT, PARAM_DISCHARGE};

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Metadata for a single USGS gauge station.
pub struct GaugeStation {
    /// 8-digit USGS site code (NWIS services).
    pub site_code: &'static str,
    /// Agency-qualified monitoring location id (OGC API services).
    pub location_id: &'static str,
    /// Official USGS site name.
    pub name: &'static str,
    /// Role of the station in the modeled basin.
    pub description: &'static str,
}

/// Metadata for a single SNOTEL station.
pub struct SnotelStation {
    /// AWDB station triplet: `<station>:<state>:<network>`.
    pub triplet: &'static str,
    /// Official NRCS station name.
    pub name: &'static str,
    pub description: &'static str,
    /// Element codes this station is expected to report.
    pub elements: &'static [&'static str],
}

/// USGS gauges tracked by the pipeline. The first entry is the default
/// prediction target.
pub static GAUGE_REGISTRY: &[GaugeStation] = &[GaugeStation {
    site_code: "06043500",
    location_id: "USGS-06043500",
    name: "Gallatin River near Gallatin Gateway, MT",
    description: "Primary streamflow target at the canyon mouth. Daily \
                  records reach back past 1990, which bounds the history \
                  window the pipeline requests.",
}];

/// SNOTEL stations feeding the meteorological side of the merge. The first
/// entry pairs with the default gauge's drainage.
pub static SNOTEL_REGISTRY: &[SnotelStation] = &[SnotelStation {
    triplet: "754:MT:SNTL",
    name: "Shower Falls",
    description: "High-elevation snow course in the upper Gallatin drainage. \
                  Snow water equivalent here leads the spring freshet at the \
                  gauge by weeks.",
    elements: &[ELEM_WATER_EQUIVALENT, ELEM_AIR_TEMPERATURE],
}];

/// Looks up a gauge by site code. Returns `None` if not found.
pub fn find_gauge(site_code: &str) -> Option<&'static GaugeStation> {
    GAUGE_REGISTRY.iter().find(|s| s.site_code == site_code)
}

/// Looks up a SNOTEL station by triplet. Returns `None` if not found.
pub fn find_snotel(triplet: &str) -> Option<&'static SnotelStation> {
    SNOTEL_REGISTRY.iter().find(|s| s.triplet == triplet)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_site_codes_are_valid_usgs_format() {
        // USGS site codes are 8-digit numeric strings. If an entry violates
        // this, the IV API will silently drop that site from its response.
        for station in GAUGE_REGISTRY {
            assert_eq!(
                station.site_code.len(),
                8,
                "site code for '{}' should be 8 digits, got '{}'",
                station.name,
                station.site_code
            );
            assert!(
                station.site_code.chars().all(|c| c.is_ascii_digit()),
                "site code for '{}' should be numeric, got '{}'",
                station.name,
                station.site_code
            );
        }
    }

    #[test]
    fn test_location_ids_are_agency_qualified_site_codes() {
        // The OGC API rejects bare site codes; the id must carry the
        // agency prefix and agree with the NWIS code.
        for station in GAUGE_REGISTRY {
            assert_eq!(
                station.location_id,
                format!("USGS-{}", station.site_code),
                "location id for '{}' must be the agency-qualified site code",
                station.name
            );
        }
    }

    #[test]
    fn test_snotel_triplets_are_valid_awdb_format() {
        for station in SNOTEL_REGISTRY {
            let parts: Vec<&str> = station.triplet.split(':').collect();
            assert_eq!(
                parts.len(),
                3,
                "triplet for '{}' should be station:state:network, got '{}'",
                station.name,
                station.triplet
            );
            assert!(
                parts[0].chars().all(|c| c.is_ascii_digit()),
                "station number in '{}' should be numeric",
                station.triplet
            );
            assert_eq!(parts[1].len(), 2, "state in '{}' should be a 2-letter code", station.triplet);
            assert_eq!(parts[2], "SNTL", "network in '{}' should be SNTL", station.triplet);
        }
    }

    #[test]
    fn test_all_snotel_stations_track_at_least_one_element() {
        for station in SNOTEL_REGISTRY {
            assert!(
                !station.elements.is_empty(),
                "station '{}' must track at least one element",
                station.name
            );
        }
    }

    #[test]
    fn test_find_gauge_returns_correct_entry() {
        let station = find_gauge("06043500").expect("Gallatin gauge should be in registry");
        assert!(station.name.contains("Gallatin"));
        assert!(find_gauge("00000000").is_none());
    }

    #[test]
    fn test_find_snotel_returns_correct_entry() {
        let station = find_snotel("754:MT:SNTL").expect("Shower Falls should be in registry");
        assert_eq!(station.name, "Shower Falls");
        assert!(find_snotel("999:ZZ:SNTL").is_none());
    }
}
