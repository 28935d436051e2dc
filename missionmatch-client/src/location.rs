use providers::NominatimClient;

/// Parses `"lat,lon"` into coordinates, rejecting out-of-range values
pub fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
    let (lat, lon) = input.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)).then_some((lat, lon))
}

/// Reverse geocodes to "City, State". Any failure, including missing or
/// unparseable coordinates, yields an empty string.
pub async fn detect_location(geocoder: &NominatimClient, coordinates: Option<&str>) -> String {
    let Some(raw) = coordinates else {
        return String::new();
    };
    let Some((lat, lon)) = parse_coordinates(raw) else {
        tracing::warn!("Ignoring invalid coordinates {:?}", raw);
        return String::new();
    };
    geocoder.describe_location(lat, lon).await
}
