use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use bulwark_core::{CellCoord, GridGeometry, TowerKind, TowerView};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const LAYOUT_DOMAIN: &str = "bulwark";
const LAYOUT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const LAYOUT_HEADER: &str = "bulwark:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Towers placed on a field of known dimensions.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TowerLayout {
    /// Number of grid columns the layout was captured on.
    pub(crate) columns: u32,
    /// Number of grid rows the layout was captured on.
    pub(crate) rows: u32,
    /// Towers composing the layout, ordered by cell.
    pub(crate) towers: Vec<LayoutTower>,
}

impl TowerLayout {
    /// Captures every tower of `towers` on a field of `geometry`.
    pub(crate) fn capture(geometry: GridGeometry, towers: &TowerView) -> Self {
        Self {
            columns: geometry.columns(),
            rows: geometry.rows(),
            towers: towers
                .iter()
                .map(|tower| LayoutTower {
                    kind: tower.kind,
                    cell: tower.cell,
                    level: tower.level,
                })
                .collect(),
        }
    }

    /// Encodes the layout into a single-line transfer string.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let payload = Payload {
            towers: self.towers.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{LAYOUT_HEADER}:{}x{}:{encoded}",
            self.columns, self.rows
        ))
    }

    /// Decodes a layout from its transfer string.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != LAYOUT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != LAYOUT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: Payload =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        if let Some(tower) = decoded.towers.iter().find(|tower| tower.level == 0) {
            return Err(LayoutTransferError::ZeroLevel(tower.cell));
        }

        Ok(Self {
            columns,
            rows,
            towers: decoded.towers,
        })
    }

    /// Reports whether the layout was captured on a field of `geometry`.
    pub(crate) fn fits(&self, geometry: GridGeometry) -> bool {
        self.columns == geometry.columns() && self.rows == geometry.rows()
    }
}

/// Tower entry of a layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutTower {
    /// Type of tower to build.
    pub(crate) kind: TowerKind,
    /// Cell the tower occupies.
    pub(crate) cell: CellCoord,
    /// Level the tower is upgraded to after placement.
    #[serde(default = "first_level")]
    pub(crate) level: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Payload {
    towers: Vec<LayoutTower>,
}

fn first_level() -> u32 {
    1
}

/// Errors that can occur while encoding or decoding layout transfer strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout string was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The grid dimensions were missing.
    #[error("layout string is missing the grid dimensions")]
    MissingDimensions,
    /// The payload segment was missing.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The prefix segment named another format.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version segment named an unknown revision.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// A tower entry asked for level zero.
    #[error("tower at {0:?} has level zero")]
    ZeroLevel(CellCoord),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || rows == 0 {
        return Err(invalid());
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_layout() -> TowerLayout {
        TowerLayout {
            columns: 22,
            rows: 11,
            towers: vec![
                LayoutTower {
                    kind: TowerKind::Frost,
                    cell: CellCoord::new(10, 4),
                    level: 1,
                },
                LayoutTower {
                    kind: TowerKind::Cannon,
                    cell: CellCoord::new(12, 6),
                    level: 3,
                },
            ],
        }
    }

    #[test]
    fn encoded_layout_carries_header_and_dimensions() {
        let layout = sample_layout();
        let encoded = layout.encode().expect("layout encodes");
        assert!(encoded.starts_with(&format!("{LAYOUT_HEADER}:22x11:")));
        assert!(!encoded.contains('\n'));

        let decoded = TowerLayout::decode(&encoded).expect("layout decodes");
        assert_eq!(decoded, layout);
        assert!(decoded.fits(GridGeometry::new(22, 11)));
        assert!(!decoded.fits(GridGeometry::new(20, 11)));
    }

    #[test]
    fn missing_level_defaults_to_one() {
        let json = r#"{"towers":[{"kind":"Sniper","cell":{"column":3,"row":2}}]}"#;
        let value = format!("bulwark:v1:22x11:{}", STANDARD_NO_PAD.encode(json));
        let layout = TowerLayout::decode(&value).expect("layout decodes");
        assert_eq!(layout.towers.len(), 1);
        assert_eq!(layout.towers[0].level, 1);
        assert_eq!(layout.towers[0].kind, TowerKind::Sniper);
    }

    #[test]
    fn zero_level_is_rejected() {
        let json = r#"{"towers":[{"kind":"Frost","cell":{"column":3,"row":2},"level":0}]}"#;
        let value = format!("bulwark:v1:22x11:{}", STANDARD_NO_PAD.encode(json));
        assert!(matches!(
            TowerLayout::decode(&value),
            Err(LayoutTransferError::ZeroLevel(cell)) if cell == CellCoord::new(3, 2)
        ));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(matches!(
            TowerLayout::decode("   "),
            Err(LayoutTransferError::EmptyPayload)
        ));
        assert!(matches!(
            TowerLayout::decode("fortress:v1:22x11:e30"),
            Err(LayoutTransferError::InvalidPrefix(prefix)) if prefix == "fortress"
        ));
        assert!(matches!(
            TowerLayout::decode("bulwark:v2:22x11:e30"),
            Err(LayoutTransferError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            TowerLayout::decode("bulwark:v1:22x0:e30"),
            Err(LayoutTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            TowerLayout::decode("bulwark:v1:22x11"),
            Err(LayoutTransferError::MissingPayload)
        ));
        assert!(matches!(
            TowerLayout::decode("bulwark:v1:22x11:!!!"),
            Err(LayoutTransferError::InvalidEncoding(_))
        ));
    }
}
