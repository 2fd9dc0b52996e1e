use std::path::Path;

use anyhow::{Context, Result, bail};
use rater::logic_data::{LogicData, build_table};
use rater::progression::{Outcome, Simulator};
use rater::seed::SeedItem;
use rater::settings::RaterSettings;
use rater_game::{Item, RequirementTable};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ScenariosList {
    scenarios: Vec<Scenario>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scenario {
    name: String,
    items: Vec<SeedItem>,
    #[serde(default)]
    starting_items: Vec<String>,
    goal: String,
    rating: Option<u64>,
    #[serde(default)]
    fail: bool,
    // Locations in the order they should be collected.
    order: Option<Vec<String>>,
    granted: Option<Vec<String>>,
    remaining_locations: Option<Vec<String>>,
}

fn test_scenario(
    table: &RequirementTable,
    settings: &RaterSettings,
    scenario: &Scenario,
) -> Result<()> {
    let items: Vec<Item> = scenario
        .items
        .iter()
        .map(|x| x.to_item())
        .collect::<Result<_>>()?;
    let simulator = Simulator::new(table, settings);
    let progression = simulator.rate(&items, &scenario.starting_items, &scenario.goal)?;
    let log = &progression.log;

    match (scenario.fail, progression.outcome) {
        (true, Outcome::Unreachable) => {}
        (true, Outcome::Rated(cost)) => {
            bail!("{}: expected failure, got rating {cost}", scenario.name)
        }
        (false, Outcome::Unreachable) => {
            bail!("{}: goal {} not reached", scenario.name, scenario.goal)
        }
        (false, Outcome::Rated(cost)) => {
            if let Some(expected) = scenario.rating {
                if cost != expected {
                    bail!(
                        "{}: expected rating {expected}, got {cost}",
                        scenario.name
                    );
                }
            }
        }
    }

    if let Some(order) = &scenario.order {
        let actual: Vec<&String> = log.steps.iter().map(|s| &s.location).collect();
        if actual.iter().map(|x| x.as_str()).ne(order.iter().map(|x| x.as_str())) {
            bail!(
                "{}: expected collection order {:?}, got {:?}",
                scenario.name,
                order,
                actual
            );
        }
    }
    if let Some(granted) = &scenario.granted {
        let actual: Vec<Option<&String>> = log.steps.iter().map(|s| s.granted.as_ref()).collect();
        let expected: Vec<Option<&String>> = granted.iter().map(Some).collect();
        if actual != expected {
            bail!(
                "{}: expected granted {:?}, got {:?}",
                scenario.name,
                expected,
                actual
            );
        }
    }
    if let Some(remaining) = &scenario.remaining_locations {
        if &log.remaining_locations != remaining {
            bail!(
                "{}: expected remaining locations {:?}, got {:?}",
                scenario.name,
                remaining,
                log.remaining_locations
            );
        }
    }
    Ok(())
}

#[test]
fn test_progression_scenarios() -> Result<()> {
    let scenarios_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/scenarios");
    for entry in std::fs::read_dir(&scenarios_dir)? {
        let entry = entry?;
        println!("{}", entry.file_name().to_string_lossy());

        let settings_path = entry.path().join("settings.json");
        let settings = if settings_path.exists() {
            RaterSettings::load(&settings_path)?
        } else {
            RaterSettings::default()
        };
        let logic = LogicData::load(&entry.path().join("logic.json"))?;
        let table = build_table(&logic.definitions, &[], &settings)?;

        let scenarios_path = entry.path().join("scenarios.json");
        let scenarios_str = std::fs::read_to_string(scenarios_path.clone())
            .context(format!("loading {}", scenarios_path.display()))?;
        let scenarios_list: ScenariosList = serde_json::from_str(&scenarios_str)
            .context(format!("parsing {}", scenarios_path.display()))?;
        for scenario in &scenarios_list.scenarios {
            println!("Scenario: {}", scenario.name);
            test_scenario(&table, &settings, scenario)?;
        }
    }
    Ok(())
}

#[test]
fn test_hollow_knight_settings_with_supplementary_logic() -> Result<()> {
    let settings = RaterSettings::hollow_knight()?;
    let supplementary = rater::logic_data::supplementary_definitions()?;
    let table = build_table(&[], &supplementary, &settings)?;

    // The supplementary logic alone reaches nothing without the bulk data.
    let simulator = Simulator::new(&table, &settings);
    let progression = simulator.rate(&[], &["King's_Pass".to_string()], "Radiance")?;
    assert_eq!(progression.outcome, Outcome::Unreachable);
    assert!(progression.log.steps.is_empty());
    Ok(())
}
