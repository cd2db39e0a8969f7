//! Spatial cache keys

use std::fmt;

use crate::domain::discovery::validate_coordinates;
use crate::domain::DomainError;

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Longest supported geohash (cells of a few centimetres)
pub const MAX_GEOHASH_PRECISION: usize = 12;

/// Default precision: 7 characters, cells of roughly 153 m x 153 m
pub const DEFAULT_GEOHASH_PRECISION: usize = 7;

/// Geohash of a coordinate pair, used as the cache bucket for nearby lookups.
///
/// Every point inside a cell maps to the same key, so a cached result is
/// computed for whichever point first missed in that cell. Each extra
/// character shrinks the cell roughly 32 times: results become more precise
/// and the hit rate drops accordingly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpatialKey(String);

impl SpatialKey {
    /// Encodes `(latitude, longitude)` with `precision` base-32 characters
    pub fn encode(latitude: f64, longitude: f64, precision: usize) -> Result<Self, DomainError> {
        validate_precision(precision)?;

        validate_coordinates(latitude, longitude)?;

        let mut lat_range = (-90.0_f64, 90.0_f64);
        let mut lon_range = (-180.0_f64, 180.0_f64);
        let mut hash = String::with_capacity(precision);
        let mut even_bit = true;
        let mut bit = 0;
        let mut index = 0usize;

        while hash.len() < precision {
            let (range, value) = if even_bit {
                (&mut lon_range, longitude)
            } else {
                (&mut lat_range, latitude)
            };

            let mid = (range.0 + range.1) / 2.0;

            if value >= mid {
                index = (index << 1) | 1;
                range.0 = mid;
            } else {
                index <<= 1;
                range.1 = mid;
            }

            even_bit = !even_bit;
            bit += 1;

            if bit == 5 {
                hash.push(BASE32[index] as char);
                bit = 0;
                index = 0;
            }
        }

        Ok(Self(hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full cache key under the given namespace
    pub fn namespaced(&self, namespace: &str) -> String {
        if namespace.is_empty() {
            self.0.clone()
        } else {
            format!("{}:{}", namespace, self.0)
        }
    }
}

impl fmt::Display for SpatialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Checks that a configured precision can be encoded
pub fn validate_precision(precision: usize) -> Result<(), DomainError> {
    if precision == 0 || precision > MAX_GEOHASH_PRECISION {
        return Err(DomainError::configuration(format!(
            "Geohash precision must be between 1 and {}, got {}",
            MAX_GEOHASH_PRECISION, precision
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_hashes() {
        let key = SpatialKey::encode(57.64911, 10.40744, 11).unwrap();
        assert_eq!(key.as_str(), "u4pruydqqvj");

        let key = SpatialKey::encode(42.6, -5.6, 5).unwrap();
        assert_eq!(key.as_str(), "ezs42");
    }

    #[test]
    fn test_encode_respects_precision() {
        let key = SpatialKey::encode(12.9716, 77.5946, DEFAULT_GEOHASH_PRECISION).unwrap();
        assert_eq!(key.as_str().len(), 7);
    }

    #[test]
    fn test_nearby_points_share_a_cell() {
        let a = SpatialKey::encode(28.4900591, 77.536386, 7).unwrap();
        let b = SpatialKey::encode(28.4900600, 77.536390, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_distant_points_use_different_cells() {
        let a = SpatialKey::encode(28.4900591, 77.536386, 7).unwrap();
        let b = SpatialKey::encode(28.5100591, 77.536386, 7).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_coarser_key_is_prefix_of_finer_key() {
        let coarse = SpatialKey::encode(12.9716, 77.5946, 5).unwrap();
        let fine = SpatialKey::encode(12.9716, 77.5946, 9).unwrap();
        assert!(fine.as_str().starts_with(coarse.as_str()));
    }

    #[test]
    fn test_invalid_precision() {
        assert!(SpatialKey::encode(0.0, 0.0, 0).is_err());
        assert!(SpatialKey::encode(0.0, 0.0, 13).is_err());
    }

    #[test]
    fn test_out_of_range_coordinates() {
        assert!(SpatialKey::encode(91.0, 0.0, 7).is_err());
        assert!(SpatialKey::encode(0.0, -181.0, 7).is_err());
    }

    #[test]
    fn test_namespaced() {
        let key = SpatialKey::encode(42.6, -5.6, 5).unwrap();
        assert_eq!(key.namespaced("restaurants"), "restaurants:ezs42");
        assert_eq!(key.namespaced(""), "ezs42");
    }
}
