//! Rain message rendering. Pure given the RNG, so callers pick the randomness
//! (thread RNG in production, a seeded `StdRng` in tests).

use rand::Rng;

use crate::forecast::ForecastHour;

/// Placeholders: `{location}`, `{time}`, `{precip}` (mm, 2 decimals), `{chance}` (%).
pub const RAIN_TEMPLATES: [&str; 10] = [
    "ALERT! LIQUID SKY ATTACK IMMINENT!\nRain detected in {location} at {time}!\nPrecipitation: {precip}mm\nChance of wetness: {chance}%\nDeploy umbrellas or perish gloriously!",
    "OH NO! THE SKY IS LEAKING AGAIN!\nIn {location}, at {time}, the sky shall unleash {precip}mm of watery doom!\n{chance}% chance of H2-OMG!",
    "RAAAAAIN! GLORIOUS RAIN!\nTime: {time}\nLocation: {location}\n{precip}mm of beautiful, inconvenient precipitation!\nChance: {chance}%\nRejoice or run, your call!",
    "BETTER POLISH YOUR UMBRELLA, CHAMP!\nHeads up in {location} at {time}: {precip}mm of sky sweat incoming!\nRain chance: {chance}%\nWaterproof your dignity!",
    "THIS IS NOT A DRILL! IT'S JUST RAIN!\nForecast for {location} at {time}:\n{precip}mm of sky juice!\nProbability: {chance}%\nCry harder, clouds!",
    "\u{2601}\u{fe0f}\u{2716}\u{fe0f} DRY MODE: OFF \u{2716}\u{fe0f}\u{2601}\u{fe0f}\nSystem override: {location} at {time} is entering soak cycle.\nRainfall: {precip}mm\nPrecipitation probability: {chance}%\nRun for cover, squishy human!",
    "MOISTURE INBOUND, SOLDIER!\nBattlefield: {location}\nTime: {time}\nA damp {precip}mm approaches with a {chance}% chance!\nTactical ponchos recommended.",
    "UPLOADING... DRENCH PROTOCOL \u{1f4a6}\n{location} at {time} is about to get slippery!\n{precip}mm of rain\n{chance}% chance\nInitiating boots-to-slosh conversion...",
    "ERROR 404: DRYNESS NOT FOUND.\nLocation: {location}\nTime: {time}\nMoisture level: {precip}mm\nProbability of getting soggy: {chance}%\nRecommend: activating anti-damp systems.",
    "WEATHER SYSTEM WARNING: INCOMING WETNESS.\nTarget: {location}\nETA: {time}\nFluid quantity: {precip}mm\nSplash zone probability: {chance}%\nConclusion: regret is waterproof.",
];

pub fn fill_template(template: &str, location: &str, hour: &ForecastHour) -> String {
    template
        .replace("{location}", location)
        .replace("{time}", &hour.time)
        .replace("{precip}", &format!("{:.2}", hour.precipitation_mm))
        .replace("{chance}", &hour.chance_of_rain.to_string())
}

pub fn render_rain_message<R: Rng>(rng: &mut R, location: &str, hour: &ForecastHour) -> String {
    let idx = rng.random_range(0..RAIN_TEMPLATES.len());
    fill_template(RAIN_TEMPLATES[idx], location, hour)
}
