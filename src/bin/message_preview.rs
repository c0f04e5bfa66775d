//! Prints every rain message template rendered for a sample forecast hour.
//! Offline: no forecast fetch, no store, no delivery.

use rain_alert::forecast::ForecastHour;
use rain_alert::notify::message::{fill_template, RAIN_TEMPLATES};

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let location = std::env::args().nth(1).unwrap_or_else(|| "Zaragoza".to_string());
    let hour = ForecastHour {
        time: "2025-07-10 14:00".to_string(),
        precipitation_mm: 1.25,
        chance_of_rain: 87,
        will_it_rain: true,
    };

    for (i, template) in RAIN_TEMPLATES.iter().enumerate() {
        println!("--- template {i} ---");
        println!("{}\n", fill_template(template, &location, &hour));
    }
    tracing::info!(templates = RAIN_TEMPLATES.len(), "message preview done");
}
