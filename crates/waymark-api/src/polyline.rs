// Encoded polyline decoding
//
// Directions responses ship the route geometry in Google's encoded
// polyline format: zig-zag signed deltas, 5-bit chunks offset by 63,
// 1e5 precision, latitude before longitude.

use crate::error::Error;
use crate::models::LatLng;

const PRECISION: f64 = 1e5;

/// Decode an encoded polyline into coordinates.
pub fn decode(encoded: &str) -> Result<Vec<LatLng>, Error> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        lat += next_delta(bytes, &mut index)?;
        lng += next_delta(bytes, &mut index)?;
        points.push(LatLng::new(to_degrees(lat), to_degrees(lng)));
    }

    Ok(points)
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn to_degrees(value: i64) -> f64 {
    value as f64 / PRECISION
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, Error> {
    let mut shift = 0u32;
    let mut result: i64 = 0;

    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(Error::Polyline { index: *index });
        };
        // Valid chunks are 63..=126; more than 7 chunks overflows 32 bits.
        if !(63..=126).contains(&byte) || shift > 30 {
            return Err(Error::Polyline { index: *index });
        }
        *index += 1;

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
