use anyhow::{bail, Result};
use estatekit_core::area::{convert_to_square_feet, AreaUnit};
use estatekit_core::pricing::{calculate_psf, Price};

pub fn convert(value: &str, unit: &str) -> String {
    let sqft = convert_to_square_feet(value, unit);
    format!("{} {} = {:.2} sq ft", value.trim(), AreaUnit::parse(unit).label(), sqft)
}

pub fn psf(price: f64, max: Option<f64>, area: f64, unit: &str) -> Result<String> {
    let price = match max {
        Some(max) => Price::range(price, max),
        None => Price::Single(price),
    };
    let area_sqft = convert_to_square_feet(area, unit);
    match calculate_psf(&price, area_sqft) {
        Some(psf) => Ok(format!("{} per sq ft", psf)),
        None => bail!("price and area must both be positive"),
    }
}
