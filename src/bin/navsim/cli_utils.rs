use sightline::game_logic::errors::{NavError, NavResult};
use std::path::Path;

/// A proximity visit scripted for a given tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledGoal {
    pub waypoint: String,
    pub tick: u32,
}

/// Parse "NAME@TICK,NAME@TICK,..." into visits ordered by tick
pub fn parse_goal_schedule(input: &str) -> NavResult<Vec<ScheduledGoal>> {
    let mut schedule = Vec::new();
    for entry in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((name, tick)) = entry.rsplit_once('@') else {
            return Err(NavError::InvalidLayout {
                reason: format!("Invalid goal '{entry}'. Expected NAME@TICK"),
            });
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(NavError::InvalidLayout {
                reason: format!("Goal '{entry}' has no waypoint name"),
            });
        }
        let tick = tick.trim().parse::<u32>().map_err(|_| NavError::InvalidLayout {
            reason: format!("Invalid tick value: '{tick}'"),
        })?;
        schedule.push(ScheduledGoal {
            waypoint: name.to_string(),
            tick,
        });
    }

    // Stable: visits on the same tick keep their written order
    schedule.sort_by_key(|goal| goal.tick);
    Ok(schedule)
}

/// Clamp the simulated tick count to a sane range
pub fn validate_ticks(ticks: u32) -> u32 {
    const MAX_TICKS: u32 = 100_000;
    if !(1..=MAX_TICKS).contains(&ticks) {
        println!("Warning: Tick count {ticks} is out of range [1, {MAX_TICKS}], clamping to valid range");
        ticks.clamp(1, MAX_TICKS)
    } else {
        ticks
    }
}

/// Generated layouts must be `.toml` or `.bin` files
pub fn validate_output_path(path: &Path) -> NavResult<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") | Some("bin") => Ok(()),
        _ => Err(NavError::InvalidLayout {
            reason: format!(
                "Output path must end in .toml or .bin, got: {}",
                path.display()
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_goal_schedule() {
        let schedule = parse_goal_schedule("east@10, north@2,west@10").unwrap();
        assert_eq!(
            schedule,
            vec![
                ScheduledGoal {
                    waypoint: "north".to_string(),
                    tick: 2
                },
                ScheduledGoal {
                    waypoint: "east".to_string(),
                    tick: 10
                },
                ScheduledGoal {
                    waypoint: "west".to_string(),
                    tick: 10
                },
            ]
        );

        assert!(parse_goal_schedule("").unwrap().is_empty());
        assert!(parse_goal_schedule("east").is_err());
        assert!(parse_goal_schedule("east@soon").is_err());
        assert!(parse_goal_schedule("@4").is_err());
    }

    #[test]
    fn test_validate_ticks() {
        assert_eq!(validate_ticks(0), 1);
        assert_eq!(validate_ticks(250), 250);
        assert_eq!(validate_ticks(1_000_000), 100_000);
    }

    #[test]
    fn test_validate_output_path() {
        assert!(validate_output_path(Path::new("layouts/room.toml")).is_ok());
        assert!(validate_output_path(Path::new("room.bin")).is_ok());
        assert!(validate_output_path(Path::new("room.json")).is_err());
        assert!(validate_output_path(Path::new("room")).is_err());
    }
}
