use assert2::{check, let_assert};
use ride_relevance::{RankingConfig, RankingEngine};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
[weights]
distance = 0.4
price = 0.2
time = 0.2
reputation = 0.1
popularity = 0.1

[resolver]
acceptance_threshold = 0.7
max_alternatives = 5

[time]
half_life_hours = 1.5

[suggestions]
min_results = 4
max_radius_km = 120.0
"#,
    );
    let config = RankingConfig::load(file.path()).unwrap();
    check!(config.weights.distance == 0.4);
    check!(config.resolver.acceptance_threshold == 0.7);
    check!(config.resolver.max_alternatives == 5);
    check!(config.resolver.overlap_weight == 0.7);
    check!(config.time.half_life_hours == 1.5);
    check!(config.time.max_gap_hours == 24.0);
    check!(config.suggestions.min_results == 4);
    check!(RankingEngine::new(config).is_ok());
}

#[test]
fn test_empty_file_gives_defaults() {
    let file = write_config("");
    let config = RankingConfig::load(file.path()).unwrap();
    check!(config == RankingConfig::default());
}

#[test]
fn test_load_rejects_bad_weight_sum() {
    let file = write_config("[weights]\ndistance = 0.9\n");
    let_assert!(Err(err) = RankingConfig::load(file.path()));
    let chain = format!("{err:#}");
    check!(chain.contains("Rejected config file"));
    check!(chain.contains("must sum to 1.0"));
}

#[test]
fn test_load_reports_parse_errors_with_path() {
    let file = write_config("[weights\ndistance = ");
    let_assert!(Err(err) = RankingConfig::load(file.path()));
    check!(format!("{err:#}").contains(&file.path().display().to_string()));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let_assert!(Err(err) = RankingConfig::load(&dir.path().join("absent.toml")));
    check!(err.to_string().contains("Failed to read config"));
}

#[test]
fn test_default_path_is_under_app_dir() {
    if let Some(path) = RankingConfig::default_path() {
        check!(path.ends_with("ride-relevance/config.toml"));
    }
}
