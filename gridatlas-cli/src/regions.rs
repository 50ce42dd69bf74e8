//! Region list loading.
//!
//! The CLI takes the region directory as a JSON document so a world export
//! can be fed straight in:
//!
//! ```json
//! [
//!     { "id": "Welcome Island", "x": 1000, "y": 1000 },
//!     { "id": "Sandbox", "x": 1001, "y": 1000, "online": false }
//! ]
//! ```

use crate::error::CliError;
use gridatlas::coord::GridCoord;
use gridatlas::directory::{RegionId, RegionInfo, StaticRegionDirectory};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One region entry in the input file.
#[derive(Debug, Deserialize)]
struct RegionRecord {
    id: String,
    x: u32,
    y: u32,
    #[serde(default = "default_online")]
    online: bool,
}

fn default_online() -> bool {
    true
}

/// Load a region directory from a JSON region list file.
pub fn load_region_file(path: &Path) -> Result<StaticRegionDirectory, CliError> {
    let data = fs::read_to_string(path)?;
    parse_region_list(&data)
}

fn parse_region_list(data: &str) -> Result<StaticRegionDirectory, CliError> {
    let records: Vec<RegionRecord> = serde_json::from_str(data)?;
    let regions = records
        .into_iter()
        .map(|record| RegionInfo {
            id: RegionId::new(record.id),
            coord: GridCoord {
                x: record.x,
                y: record.y,
            },
            online: record.online,
        })
        .collect();
    Ok(StaticRegionDirectory::new(regions))
}
