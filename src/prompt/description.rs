use super::common::RESPONSE_FORMAT;
use super::template::Fields;

const CITY_BODY: &str = r#"
Provide a comprehensive description for city {city}.
Use data from Google Search tools to ensure accuracy, including relevant pincode details or other trending information where applicable.
The description should cover:
**{city} City Description**
**Introduction**
- Brief introduction to the city, including its location, significance, and key characteristics.
**History**
- Historical background, including key events or developments that shaped the city.
**Economy**
- Economic overview, highlighting major industries, business hubs, and economic challenges.
**Demography**
- Demographic details, including population, gender ratio, literacy rate, and notable demographic trends.
**Infrastructure**
- Highways: Major highways and roads ensuring connectivity.
- Metro Routes: Key metro lines and stations for urban connectivity.
- Rail Routes: Major railway stations and their connectivity.
- Airport: Details of the nearest airport and its accessibility.
**Top 20 Builders in {city}**
- List the top 20 real estate builders operating in the city.
**Top 10 Schools in {city}**
- List the top 10 schools in the city.
**Top 10 Hospitals in {city}**
- List the top 10 hospitals in the city.
**Top 10 Malls in {city}**
- List the top 10 shopping malls in the city.
"#;

const MICROMARKET_BODY: &str = r#"
Provide a comprehensive description for micro market {micromarket} in city {city}.{localities_clause}
Use data from Google Search tools to ensure accuracy, including relevant pincode details or other trending information where applicable.
The description should cover:
**{micromarket} Micro Market Description**
- Provide a ~200-word description covering:
  - Unique selling points (connectivity, amenities, property rates, lifestyle).
  - Location within the city (relative to major roads, metro stations, or landmarks).
**Top 10 Real Estate Projects in {micromarket}**
- List the top 10 real estate projects in {micromarket}, each with their unique selling points (connectivity, amenities, property rates, lifestyle).
"#;

pub fn city_template() -> String {
    [CITY_BODY, RESPONSE_FORMAT].concat()
}

pub fn micromarket_template() -> String {
    [MICROMARKET_BODY, RESPONSE_FORMAT].concat()
}

/// Trims each locality and drops blanks, keeping order.
pub fn normalize_localities<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn city_fields(city: &str) -> Fields {
    Fields::new().with("city", city.trim())
}

/// Fields for the micro-market template.
///
/// `localities` is the comma-joined list and `localities_clause` a leading-space
/// sentence naming them; both are empty strings when there are no localities.
pub fn micromarket_fields<S: AsRef<str>>(city: &str, micromarket: &str, localities: &[S]) -> Fields {
    let localities = normalize_localities(localities);
    let joined = localities.join(", ");
    let clause = if localities.is_empty() {
        String::new()
    } else {
        format!(" Give particular attention to these localities: {}.", joined)
    };

    Fields::new()
        .with("city", city.trim())
        .with("micromarket", micromarket.trim())
        .with("localities", joined)
        .with("localities_clause", clause)
}
