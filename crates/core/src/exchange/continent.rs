pub const UNKNOWN_CONTINENT: &str = "Unknown";

const COUNTRY_CONTINENTS: &[(&str, &str)] = &[
    // Europe
    ("United Kingdom", "Europe"),
    ("Ireland", "Europe"),
    ("France", "Europe"),
    ("Germany", "Europe"),
    ("Netherlands", "Europe"),
    ("Belgium", "Europe"),
    ("Luxembourg", "Europe"),
    ("Switzerland", "Europe"),
    ("Austria", "Europe"),
    ("Italy", "Europe"),
    ("Spain", "Europe"),
    ("Portugal", "Europe"),
    ("Denmark", "Europe"),
    ("Sweden", "Europe"),
    ("Norway", "Europe"),
    ("Finland", "Europe"),
    ("Iceland", "Europe"),
    ("Poland", "Europe"),
    ("Czech Republic", "Europe"),
    ("Hungary", "Europe"),
    ("Greece", "Europe"),
    ("Jersey", "Europe"),
    ("Guernsey", "Europe"),
    ("Isle of Man", "Europe"),
    // Asia
    ("Japan", "Asia"),
    ("China", "Asia"),
    ("Hong Kong", "Asia"),
    ("Taiwan", "Asia"),
    ("South Korea", "Asia"),
    ("Korea", "Asia"),
    ("India", "Asia"),
    ("Singapore", "Asia"),
    ("Malaysia", "Asia"),
    ("Indonesia", "Asia"),
    ("Thailand", "Asia"),
    ("Philippines", "Asia"),
    ("Vietnam", "Asia"),
    ("Pakistan", "Asia"),
    ("Israel", "Asia"),
    ("Saudi Arabia", "Asia"),
    ("United Arab Emirates", "Asia"),
    ("Qatar", "Asia"),
    ("Kuwait", "Asia"),
    ("Turkey", "Asia"),
    // Oceania
    ("Australia", "Oceania"),
    ("New Zealand", "Oceania"),
    // North America
    ("United States", "North America"),
    ("Canada", "North America"),
    ("Mexico", "North America"),
    ("Bermuda", "North America"),
    // South America
    ("Brazil", "South America"),
    ("Argentina", "South America"),
    ("Chile", "South America"),
    ("Colombia", "South America"),
    ("Peru", "South America"),
    // Africa
    ("South Africa", "Africa"),
    ("Egypt", "Africa"),
    ("Nigeria", "Africa"),
    ("Morocco", "Africa"),
    ("Kenya", "Africa"),
];

pub fn continent_for(country: &str) -> &'static str {
    let country = country.trim();
    COUNTRY_CONTINENTS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(country))
        .map(|(_, continent)| *continent)
        .unwrap_or(UNKNOWN_CONTINENT)
}
